//! Parallel EEPROMs with the JEDEC byte-wide pinout; an active-low /WE
//! pulse commits the presented address and data.

use std::fmt;
use std::str;
use std::time::Duration;

use crate::error::ProgrammerError;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Chip {
	At28c16,
	At28c64b,
	At28c256,
}

impl Default for Chip {
	fn default() -> Self {
		Chip::At28c64b
	}
}

impl Chip {
	pub const ALL: [Chip; 3] = [Chip::At28c16, Chip::At28c64b, Chip::At28c256];

	pub fn name(self) -> &'static str {
		match self {
			Chip::At28c16 => "AT28C16",
			Chip::At28c64b => "AT28C64B",
			Chip::At28c256 => "AT28C256",
		}
	}

	/// Number of addressable bytes
	pub fn size(self) -> u32 {
		match self {
			Chip::At28c16 => 0x800,
			Chip::At28c64b => 0x2000,
			Chip::At28c256 => 0x8000,
		}
	}

	/// Number of address pins actually wired to the shift registers
	pub fn address_width(self) -> u32 {
		self.size().trailing_zeros()
	}

	// tWP
	pub fn write_pulse_min(self) -> Duration {
		Duration::from_nanos(100)
	}

	// tWC; the chip ignores /WE until the internal write finished
	pub fn write_cycle_max(self) -> Duration {
		match self {
			Chip::At28c16 => Duration::from_millis(1),
			Chip::At28c64b => Duration::from_millis(10),
			Chip::At28c256 => Duration::from_millis(10),
		}
	}

	pub fn check_address(self, address: u32) -> Result<(), ProgrammerError> {
		if address >= self.size() {
			return Err(ProgrammerError::invalid_address(address, self));
		}
		Ok(())
	}

	/// Check `len` consecutive bytes starting at `start` all fit.
	pub fn check_range(self, start: u32, len: usize) -> Result<(), ProgrammerError> {
		if len == 0 {
			return Ok(());
		}
		self.check_address(start)?;
		let last = start as u64 + (len as u64 - 1);
		if last >= self.size() as u64 {
			let last = if last > u32::max_value() as u64 { u32::max_value() } else { last as u32 };
			return Err(ProgrammerError::invalid_address(last, self));
		}
		Ok(())
	}
}

impl fmt::Display for Chip {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl str::FromStr for Chip {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		for chip in Chip::ALL.iter() {
			if chip.name().eq_ignore_ascii_case(s) {
				return Ok(*chip);
			}
		}
		match s.to_ascii_lowercase().as_str() {
			"28c16" => Ok(Chip::At28c16),
			"28c64" | "28c64b" | "at28c64" => Ok(Chip::At28c64b),
			"28c256" => Ok(Chip::At28c256),
			_ => bail!("Unknown chip {:?} (supported: AT28C16, AT28C64B, AT28C256)", s),
		}
	}
}
