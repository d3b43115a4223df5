/// In-memory board: the programmer lines wired to two 74HC595 and a
/// parallel EEPROM, running on a virtual clock.
///
/// Delays only advance the clock, so whole images "write" instantly while
/// the timing of every edge is still checked against the chip.

mod eeprom;
mod shift_register;
mod trace;

use std::time::Duration;

use crate::chip::Chip;
use crate::error::ProgrammerError;
use crate::programmer::{
	Hardware,
	LINE_COUNT,
	Level,
	Line,
};

pub use self::eeprom::SimulatedEeprom;
pub use self::shift_register::ShiftRegisterChain;
pub use self::trace::{
	Event,
	Trace,
};

fn idle_levels() -> [Level; LINE_COUNT] {
	let mut levels = [Level::Low; LINE_COUNT];
	for line in Line::ALL.iter() {
		levels[line.index()] = line.idle_level();
	}
	levels
}

pub struct SimulatedBoard {
	now: Duration,
	levels: [Level; LINE_COUNT],
	trace: Trace,
	chain: ShiftRegisterChain,
	eeprom: SimulatedEeprom,
}

impl SimulatedBoard {
	/// Lines start out idle, shift registers cleared, EEPROM erased (0xff).
	pub fn new(chip: Chip) -> Self {
		let levels = idle_levels();
		SimulatedBoard {
			now: Duration::from_secs(0),
			levels,
			trace: Trace::new(levels),
			chain: ShiftRegisterChain::default(),
			eeprom: SimulatedEeprom::new(chip),
		}
	}

	pub fn now(&self) -> Duration {
		self.now
	}

	pub fn level(&self, line: Line) -> Level {
		self.levels[line.index()]
	}

	pub fn trace(&self) -> &Trace {
		&self.trace
	}

	/// Forget recorded events; the current levels become the new start.
	pub fn clear_trace(&mut self) {
		self.trace = Trace::new(self.levels);
	}

	pub fn latched_address(&self) -> u16 {
		self.chain.output()
	}

	pub fn data_bus(&self) -> u8 {
		let mut data = 0u8;
		for bit in 0..8 {
			if self.level(Line::Io(bit)).is_high() {
				data |= 1 << bit;
			}
		}
		data
	}

	pub fn memory(&self) -> &[u8] {
		self.eeprom.memory()
	}

	pub fn commits(&self) -> &[(u16, u8)] {
		self.eeprom.commits()
	}

	pub fn violations(&self) -> &[ProgrammerError] {
		self.eeprom.violations()
	}

	fn bus_changed_while_writing(&mut self, what: &'static str) {
		if self.eeprom.is_writing() {
			self.eeprom.violation(ProgrammerError::TimingViolation {
				what,
				actual: Duration::from_secs(0),
				required: self.eeprom.chip().write_pulse_min(),
			});
		}
	}

	fn edge(&mut self, line: Line, level: Level) {
		match (line, level) {
			(Line::ShiftClock, Level::High) => {
				let bit = self.level(Line::ShiftData).is_high();
				self.chain.clock(bit);
			},
			(Line::ShiftLatch, Level::High) => {
				self.chain.latch();
				self.bus_changed_while_writing("address hold while /WE is active");
			},
			(Line::WriteEnable, Level::Low) => {
				self.eeprom.write_enable_fall(self.now);
			},
			(Line::WriteEnable, Level::High) => {
				let (now, address, data) = (self.now, self.chain.output(), self.data_bus());
				self.eeprom.write_enable_rise(now, address, data);
			},
			(Line::Io(_), _) => {
				self.bus_changed_while_writing("data hold while /WE is active");
			},
			_ => (),
		}
	}
}

impl Hardware for SimulatedBoard {
	fn set_line(&mut self, line: Line, level: Level) {
		self.trace.push(Event {
			at: self.now,
			line,
			level,
		});
		let previous = self.levels[line.index()];
		self.levels[line.index()] = level;
		if previous != level {
			self.edge(line, level);
		}
	}

	fn read_line(&mut self, line: Line) -> Level {
		self.level(line)
	}

	fn delay(&mut self, duration: Duration) {
		self.now += duration;
	}
}

#[cfg(test)]
mod test {
	use std::time::Duration;

	use super::SimulatedBoard;
	use crate::chip::Chip;
	use crate::error::ProgrammerError;
	use crate::programmer::{
		Hardware,
		Level,
		Line,
		LowLevel,
		Programmer,
		Timing,
	};

	#[test]
	fn starts_idle() {
		let board = SimulatedBoard::new(Chip::At28c64b);
		for line in Line::ALL.iter() {
			assert_eq!(line.idle_level(), board.level(*line));
		}
		assert_eq!(0, board.latched_address());
		assert_eq!(0, board.data_bus());
		assert!(board.trace().is_empty());
	}

	#[test]
	fn half_updated_address_between_latches() {
		let timing = Timing::REFERENCE;
		let mut board = SimulatedBoard::new(Chip::At28c256);
		board.shift_out_byte(0x12, &timing);
		assert_eq!(0x0012, board.latched_address());
		board.shift_out_byte(0x34, &timing);
		assert_eq!(0x1234, board.latched_address());
	}

	#[test]
	fn data_change_during_write_is_flagged() {
		let mut board = SimulatedBoard::new(Chip::At28c64b);
		board.set_line(Line::WriteEnable, Level::Low);
		board.delay(Duration::from_micros(1));
		board.set_line(Line::Io(0), Level::High);
		board.delay(Duration::from_micros(1));
		board.set_line(Line::WriteEnable, Level::High);

		assert_eq!(1, board.violations().len());
		match &board.violations()[0] {
			ProgrammerError::TimingViolation { what, .. } => assert_eq!(&"data hold while /WE is active", what),
			e => panic!("unexpected violation {:?}", e),
		}
		// the chip still commits what is on the bus at the rising edge
		assert_eq!(&[(0x0000, 0x01)], board.commits());
	}

	#[test]
	fn address_latch_during_write_is_flagged() {
		let mut board = SimulatedBoard::new(Chip::At28c64b);
		board.set_line(Line::WriteEnable, Level::Low);
		board.delay(Duration::from_micros(1));
		board.shift_out_byte(0x12, &Timing::REFERENCE);
		board.set_line(Line::WriteEnable, Level::High);

		assert_eq!(1, board.violations().len());
		match &board.violations()[0] {
			ProgrammerError::TimingViolation { what, .. } => assert_eq!(&"address hold while /WE is active", what),
			e => panic!("unexpected violation {:?}", e),
		}
		assert_eq!(&[(0x0012, 0x00)], board.commits());
	}

	#[test]
	fn reference_batch_lands_in_memory() {
		let mut p = Programmer::new(SimulatedBoard::new(Chip::At28c64b), Chip::At28c64b, Timing::REFERENCE).unwrap();
		p.init();
		let image: Vec<u8> = (0..64u32).map(|i| (i * 7) as u8).collect();
		p.write_array(0x1fc0, &image).unwrap();
		p.park();

		let board = p.into_hardware();
		assert!(board.violations().is_empty(), "{:?}", board.violations());
		assert_eq!(&image[..], &board.memory()[0x1fc0..]);
		assert_eq!(64, board.commits().len());
		assert_eq!(Timing::REFERENCE.batch_duration(64), Some(board.now()));
	}
}
