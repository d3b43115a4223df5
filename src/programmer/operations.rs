use crate::chip::Chip;
use crate::error::ProgrammerError;

use super::{
	Hardware,
	Level,
	Line,
	LowLevel,
	Timing,
};

/// Blind byte writer for a parallel EEPROM behind a 74HC595 address chain.
///
/// Every write runs as a fixed sequence: shift the address into the chain
/// and latch it, let the bus settle, drive the data lines, pulse /WE. No
/// status is ever read back from the chip.
pub struct Programmer<H: Hardware> {
	hardware: H,
	chip: Chip,
	timing: Timing,
}

impl<H: Hardware> Programmer<H> {
	pub fn new(hardware: H, chip: Chip, timing: Timing) -> Result<Self, ProgrammerError> {
		timing.check(chip)?;
		Ok(Programmer {
			hardware,
			chip,
			timing,
		})
	}

	pub fn hardware(&mut self) -> &mut H {
		&mut self.hardware
	}

	pub fn into_hardware(self) -> H {
		self.hardware
	}

	/// Bring all lines into their idle state; /WE gets released first.
	pub fn init(&mut self) {
		self.hardware.set_line(Line::WriteEnable, Level::High);
		for line in Line::ALL.iter() {
			self.hardware.set_line(*line, line.idle_level());
		}
	}

	/// Drop every line low except /WE, which must stay inactive.
	///
	/// The shift registers keep presenting the last latched address.
	pub fn park(&mut self) {
		self.init();
	}

	pub fn shift_out_byte(&mut self, value: u8) {
		self.hardware.shift_out_byte(value, &self.timing);
	}

	/// Shift the high byte, then the low byte; each gets latched on its own.
	///
	/// Between both latches the bus shows the new high byte in the low
	/// half; the chip only samples the address while /WE is active.
	pub fn set_address(&mut self, address: u16) {
		self.shift_out_byte((address >> 8) as u8);
		self.shift_out_byte(address as u8);
	}

	pub fn drive_data(&mut self, data: u8) {
		let mut data = data;
		for bit in 0..8 {
			self.hardware.set_line(Line::Io(bit), Level::from(0 != (data & 1)));
			data >>= 1;
		}
	}

	// address, settle, data, /WE; order matters as the chip takes both
	// address and data from the bus when /WE rises again.
	fn write_byte_unchecked(&mut self, address: u16, data: u8) {
		trace!("write 0x{:02x} @0x{:04x}", data, address);
		self.set_address(address);
		self.hardware.delay(self.timing.address_settle);
		self.drive_data(data);
		self.hardware.pulse_write_enable(&self.timing);
	}

	pub fn write_byte(&mut self, address: u16, data: u8) -> Result<(), ProgrammerError> {
		self.chip.check_address(address as u32)?;
		self.write_byte_unchecked(address, data);
		Ok(())
	}

	/// Write `bytes` to `start`, `start + 1`, ... in that order.
	///
	/// The whole range is checked before the first line is touched.
	pub fn write_array(&mut self, start: u16, bytes: &[u8]) -> Result<(), ProgrammerError> {
		self.chip.check_range(start as u32, bytes.len())?;
		match self.timing.batch_duration(bytes.len()) {
			Some(d) => debug!("writing {} bytes to 0x{:04x} (~{:?})", bytes.len(), start, d),
			None => debug!("writing {} bytes to 0x{:04x}", bytes.len(), start),
		}
		for (offset, data) in bytes.iter().enumerate() {
			// range check above guarantees this fits
			self.write_byte_unchecked(start + offset as u16, *data);
		}
		Ok(())
	}
}
