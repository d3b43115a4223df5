use std::fs;
use std::path::Path;

/// Start address of the compiled-in payload
pub const DEFAULT_START_ADDRESS: u16 = 32;

/// Compiled-in test pattern, written when no image is given.
pub const DEFAULT_PAYLOAD: [u8; 4] = [0x55, 0xaa, 0x55, 0xaa];

/// Bytes to write to consecutive addresses, starting at `start`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Payload {
	pub start: u16,
	pub bytes: Vec<u8>,
}

impl Default for Payload {
	fn default() -> Self {
		Payload {
			start: DEFAULT_START_ADDRESS,
			bytes: DEFAULT_PAYLOAD.to_vec(),
		}
	}
}

impl Payload {
	/// Raw binary image
	pub fn from_file(path: &Path, start: u16) -> crate::AResult<Self> {
		let bytes = with_context!(("couldn't read image {}", path.display()),
			Ok(fs::read(path)?)
		)?;
		if bytes.is_empty() {
			warn!("image {} is empty", path.display());
		}
		Ok(Payload {
			start,
			bytes,
		})
	}

	/// Last address written, `None` for an empty payload.
	///
	/// Not range checked; may lie beyond the chip (or even 16 bits).
	pub fn end(&self) -> Option<u64> {
		if self.bytes.is_empty() {
			None
		} else {
			Some(self.start as u64 + self.bytes.len() as u64 - 1)
		}
	}
}

/// `0x`-prefixed hexadecimal or decimal address
pub fn parse_address(s: &str) -> crate::AResult<u16> {
	let s = s.trim();
	with_context!(("invalid address {:?}", s), {
		if s.starts_with("0x") || s.starts_with("0X") {
			Ok(u16::from_str_radix(&s[2..], 16)?)
		} else {
			Ok(s.parse::<u16>()?)
		}
	})
}

#[cfg(test)]
mod test {
	use std::fs;

	use super::*;

	#[test]
	fn default_payload() {
		let p = Payload::default();
		assert_eq!(32, p.start);
		assert_eq!(vec![0x55, 0xaa, 0x55, 0xaa], p.bytes);
		assert_eq!(Some(35), p.end());
	}

	#[test]
	fn end_past_16_bits() {
		let p = Payload { start: 0xffff, bytes: vec![0; 0x1_0002] };
		assert_eq!(Some(0x2_0000), p.end());
	}

	#[test]
	fn empty_payload_has_no_end() {
		let p = Payload { start: 0x100, bytes: Vec::new() };
		assert_eq!(None, p.end());
	}

	#[test]
	fn parse_addresses() {
		assert_eq!(32, parse_address("32").unwrap());
		assert_eq!(32, parse_address("0x20").unwrap());
		assert_eq!(0x1fff, parse_address(" 0X1FFF ").unwrap());
		assert_eq!(0xffff, parse_address("0xffff").unwrap());
		assert!(parse_address("0x10000").is_err());
		assert!(parse_address("-1").is_err());
		assert!(parse_address("0x").is_err());
		assert!(parse_address("").is_err());
	}

	#[test]
	fn image_file() {
		let path = std::env::temp_dir().join(format!("eeprom-shift-programmer-image-{}.bin", std::process::id()));
		fs::write(&path, &[1u8, 2, 3]).unwrap();
		let p = Payload::from_file(&path, 0x10).unwrap();
		fs::remove_file(&path).unwrap();
		assert_eq!(Payload { start: 0x10, bytes: vec![1, 2, 3] }, p);

		assert!(Payload::from_file(&path, 0).is_err());
	}
}
