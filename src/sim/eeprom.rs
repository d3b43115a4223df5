use std::time::Duration;

use crate::chip::Chip;
use crate::error::ProgrammerError;

/// Byte-wide EEPROM as seen through /WE.
///
/// A write starts on the falling /WE edge and gets committed on the rising
/// edge with whatever address and data are on the bus then. The chip is
/// busy for its write cycle time afterwards and ignores /WE pulses during
/// that time.
#[derive(Clone, Debug)]
pub struct SimulatedEeprom {
	chip: Chip,
	memory: Vec<u8>,
	commits: Vec<(u16, u8)>,
	violations: Vec<ProgrammerError>,
	write_started: Option<Duration>,
	busy_until: Option<Duration>,
}

impl SimulatedEeprom {
	pub fn new(chip: Chip) -> Self {
		SimulatedEeprom {
			chip,
			memory: vec![0xff; chip.size() as usize],
			commits: Vec::new(),
			violations: Vec::new(),
			write_started: None,
			busy_until: None,
		}
	}

	pub fn chip(&self) -> Chip {
		self.chip
	}

	pub fn memory(&self) -> &[u8] {
		&self.memory
	}

	/// Successful writes, in order
	pub fn commits(&self) -> &[(u16, u8)] {
		&self.commits
	}

	pub fn violations(&self) -> &[ProgrammerError] {
		&self.violations
	}

	pub fn is_writing(&self) -> bool {
		self.write_started.is_some()
	}

	pub fn violation(&mut self, violation: ProgrammerError) {
		warn!("simulated {}: {}", self.chip, violation);
		self.violations.push(violation);
	}

	// falling /WE
	pub fn write_enable_fall(&mut self, now: Duration) {
		if let Some(busy_until) = self.busy_until {
			if now < busy_until {
				let required = self.chip.write_cycle_max();
				self.violation(ProgrammerError::TimingViolation {
					what: "gap between byte writes",
					actual: required - (busy_until - now),
					required,
				});
				return;
			}
		}
		self.write_started = Some(now);
	}

	// rising /WE; address are the latched shift register outputs
	pub fn write_enable_rise(&mut self, now: Duration, address: u16, data: u8) {
		let started = match self.write_started.take() {
			None => return, // ignored falling edge
			Some(started) => started,
		};
		let width = now - started;
		if width < self.chip.write_pulse_min() {
			self.violation(ProgrammerError::TimingViolation {
				what: "write enable pulse",
				actual: width,
				required: self.chip.write_pulse_min(),
			});
			return;
		}

		// excess address bits aren't wired
		let address = address & (self.chip.size() - 1) as u16;
		self.memory[address as usize] = data;
		self.commits.push((address, data));
		self.busy_until = Some(now + self.chip.write_cycle_max());
	}
}

#[cfg(test)]
mod test {
	use std::time::Duration;

	use super::SimulatedEeprom;
	use crate::chip::Chip;

	fn us(v: u64) -> Duration {
		Duration::from_micros(v)
	}

	#[test]
	fn commits_on_rising_edge() {
		let mut ee = SimulatedEeprom::new(Chip::At28c16);
		assert!(ee.memory().iter().all(|b| *b == 0xff));
		ee.write_enable_fall(us(0));
		assert!(ee.commits().is_empty());
		ee.write_enable_rise(us(1), 0x07ff, 0x12);
		assert_eq!(&[(0x07ff, 0x12)], ee.commits());
		assert_eq!(0x12, ee.memory()[0x7ff]);
	}

	#[test]
	fn unwired_address_bits_wrap() {
		let mut ee = SimulatedEeprom::new(Chip::At28c16);
		ee.write_enable_fall(us(0));
		ee.write_enable_rise(us(1), 0xf801, 0x34);
		assert_eq!(&[(0x0001, 0x34)], ee.commits());
	}

	#[test]
	fn busy_chip_ignores_write() {
		let mut ee = SimulatedEeprom::new(Chip::At28c16);
		ee.write_enable_fall(us(0));
		ee.write_enable_rise(us(1), 0x0000, 0x01);
		// write cycle of the AT28C16 is 1ms
		ee.write_enable_fall(us(500));
		ee.write_enable_rise(us(501), 0x0001, 0x02);
		assert_eq!(1, ee.commits().len());
		assert_eq!(1, ee.violations().len());

		ee.write_enable_fall(us(1001));
		ee.write_enable_rise(us(1002), 0x0001, 0x02);
		assert_eq!(2, ee.commits().len());
		assert_eq!(1, ee.violations().len());
	}

	#[test]
	fn short_pulse_is_rejected() {
		let mut ee = SimulatedEeprom::new(Chip::At28c64b);
		ee.write_enable_fall(us(10));
		ee.write_enable_rise(us(10), 0x0000, 0x00);
		assert!(ee.commits().is_empty());
		assert_eq!(1, ee.violations().len());
		assert_eq!(0xff, ee.memory()[0]);
	}
}
