use std::convert::TryFrom;
use std::fmt;
use std::ops::Not;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

use crate::chip::Chip;
use crate::error::ProgrammerError;

/// Sleep until (at least) `duration` has passed on the monotonic clock.
///
/// `thread::sleep` may wake up early on some platforms; we keep a fixed
/// deadline and sleep again for whatever is left.
pub fn reliable_sleep(duration: Duration) {
	let deadline = Instant::now() + duration;
	loop {
		let now = Instant::now();
		if now >= deadline {
			return;
		}
		thread::sleep(deadline - now);
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Level {
	Low,
	High,
}

impl From<bool> for Level {
	fn from(v: bool) -> Self {
		match v {
			false => Level::Low,
			true => Level::High,
		}
	}
}

impl Not for Level {
	type Output = Level;

	fn not(self) -> Self::Output {
		match self {
			Level::Low => Level::High,
			Level::High => Level::Low,
		}
	}
}

impl Level {
	pub fn is_high(self) -> bool {
		self == Level::High
	}
}

/// Output lines of the programmer.
///
/// `ShiftData`, `ShiftClock` and `ShiftLatch` feed the two cascaded
/// 74HC595 forming the address bus; `Io(0)` .. `Io(7)` are the EEPROM
/// data bus; `WriteEnable` is the active-low /WE of the EEPROM.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Line {
	ShiftData,
	ShiftClock,
	ShiftLatch,
	WriteEnable,
	/// Data bus bit; only 0..=7 exist, see `Line::data` for a checked
	/// constructor. Other values panic wherever the line gets used.
	Io(u8),
}

pub const LINE_COUNT: usize = 12;

impl Line {
	pub const ALL: [Line; LINE_COUNT] = [
		Line::ShiftData,
		Line::ShiftClock,
		Line::ShiftLatch,
		Line::WriteEnable,
		Line::Io(0), Line::Io(1), Line::Io(2), Line::Io(3),
		Line::Io(4), Line::Io(5), Line::Io(6), Line::Io(7),
	];

	/// Data bus line for `bit`, `None` for bits outside 0..=7
	pub fn data(bit: u8) -> Option<Line> {
		if bit < 8 {
			Some(Line::Io(bit))
		} else {
			None
		}
	}

	/// Level the line rests at while no operation is in progress.
	pub fn idle_level(self) -> Level {
		match self {
			Line::WriteEnable => Level::High,
			_ => Level::Low,
		}
	}

	/// Dense index into `Line::ALL`
	pub fn index(self) -> usize {
		match self {
			Line::ShiftData => 0,
			Line::ShiftClock => 1,
			Line::ShiftLatch => 2,
			Line::WriteEnable => 3,
			Line::Io(bit) => {
				assert!(bit < 8, "data bus only has 8 lines");
				4 + bit as usize
			}
		}
	}
}

impl fmt::Display for Line {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Line::ShiftData => write!(f, "SER"),
			Line::ShiftClock => write!(f, "SRCLK"),
			Line::ShiftLatch => write!(f, "RCLK"),
			Line::WriteEnable => write!(f, "/WE"),
			Line::Io(bit) => write!(f, "IO{}", bit),
		}
	}
}

/// Hold times of the bit-banged protocol.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Timing {
	pub clock_hold: Duration,
	pub latch_hold: Duration,
	pub address_settle: Duration,
	pub write_enable_hold: Duration,
}

impl Default for Timing {
	fn default() -> Self {
		Timing::REFERENCE
	}
}

impl Timing {
	pub const REFERENCE: Timing = Timing {
		clock_hold: Duration::from_micros(500),
		latch_hold: Duration::from_micros(500),
		address_settle: Duration::from_micros(500),
		write_enable_hold: Duration::from_micros(800),
	};

	/// Time needed to shift one byte and latch it (both pulses symmetric)
	///
	/// `None` if the holds are too long to add up in a `Duration`; the same
	/// goes for the other durations below.
	pub fn shift_out_duration(&self) -> Option<Duration> {
		self.clock_hold.checked_mul(2 * 8)?.checked_add(self.latch_hold.checked_mul(2)?)
	}

	/// Blocking time of a full byte write
	pub fn byte_duration(&self) -> Option<Duration> {
		self.shift_out_duration()?.checked_mul(2)?
			.checked_add(self.address_settle)?
			.checked_add(self.write_enable_hold.checked_mul(3)?)
	}

	/// Blocking time of `count` byte writes
	pub fn batch_duration(&self, count: usize) -> Option<Duration> {
		self.byte_duration()?.checked_mul(u32::try_from(count).ok()?)
	}

	/// Time between the commit edge of one write and the falling /WE of the
	/// next write.
	pub fn write_cycle_gap(&self) -> Option<Duration> {
		// post-hold, next address, settle, pre-hold
		self.shift_out_duration()?.checked_mul(2)?
			.checked_add(self.address_settle)?
			.checked_add(self.write_enable_hold.checked_mul(2)?)
	}

	pub fn check(&self, chip: Chip) -> Result<(), ProgrammerError> {
		if self.write_enable_hold < chip.write_pulse_min() {
			return Err(ProgrammerError::TimingViolation {
				what: "write enable pulse",
				actual: self.write_enable_hold,
				required: chip.write_pulse_min(),
			});
		}
		// a gap too long to represent is long enough
		if let Some(gap) = self.write_cycle_gap() {
			if gap < chip.write_cycle_max() {
				return Err(ProgrammerError::TimingViolation {
					what: "gap between byte writes",
					actual: gap,
					required: chip.write_cycle_max(),
				});
			}
		}
		Ok(())
	}
}

/// Access to the physical lines.
///
/// Pin access is assumed to always succeed.
pub trait Hardware {
	fn set_line(&mut self, line: Line, level: Level);
	fn read_line(&mut self, line: Line) -> Level;

	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, H: ?Sized + Hardware> Hardware for &'a mut H {
	fn set_line(&mut self, line: Line, level: Level) {
		H::set_line(*self, line, level)
	}

	fn read_line(&mut self, line: Line) -> Level {
		H::read_line(*self, line)
	}

	fn delay(&mut self, duration: Duration) {
		H::delay(*self, duration)
	}
}
