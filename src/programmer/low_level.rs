use std::time::Duration;

use super::{
	Hardware,
	Level,
	Line,
	Timing,
};

pub trait LowLevel: Hardware {
	// drive `line` to `active`, hold, release and hold again so the next
	// transition can't follow too closely
	fn pulse(&mut self, line: Line, active: Level, hold: Duration) {
		self.set_line(line, active);
		self.delay(hold);
		self.set_line(line, !active);
		self.delay(hold);
	}

	// SRCLK: shift register samples SER on the rising edge
	fn pulse_clock(&mut self, timing: &Timing) {
		self.pulse(Line::ShiftClock, Level::High, timing.clock_hold);
	}

	// RCLK: copy the shift register to the parallel outputs on the rising edge
	fn pulse_latch(&mut self, timing: &Timing) {
		self.pulse(Line::ShiftLatch, Level::High, timing.latch_hold);
	}

	// /WE is active low; address and data must already be stable.
	//
	// idle before the falling edge (setup), hold low, then idle again after
	// the rising edge which commits the byte.
	fn pulse_write_enable(&mut self, timing: &Timing) {
		self.delay(timing.write_enable_hold);
		self.pulse(Line::WriteEnable, Level::Low, timing.write_enable_hold);
	}

	// send 8 bits, starting with the highest bit, then latch them
	fn shift_out_byte(&mut self, value: u8, timing: &Timing) {
		let mut value = value;
		for _ in 0..8 {
			self.set_line(Line::ShiftData, Level::from(0 != (value & 0x80)));
			self.pulse_clock(timing);
			value <<= 1;
		}
		self.pulse_latch(timing);
	}
}

impl<H: Hardware + ?Sized> LowLevel for H {
}

#[cfg(test)]
mod test {
	use std::time::Duration;

	use crate::chip::Chip;
	use crate::programmer::{
		Level,
		Line,
		LowLevel,
		Timing,
	};
	use crate::sim::SimulatedBoard;

	#[test]
	fn symmetric_pulse() {
		let mut board = SimulatedBoard::new(Chip::At28c64b);
		board.pulse(Line::ShiftClock, Level::High, Duration::from_micros(7));

		let trace = board.trace();
		assert_eq!(2, trace.len());
		assert_eq!(Duration::from_micros(14), board.now());
		assert_eq!(vec![Duration::from_micros(0)], trace.edges(Line::ShiftClock, Level::High));
		assert_eq!(vec![Duration::from_micros(7)], trace.edges(Line::ShiftClock, Level::Low));
	}

	#[test]
	fn write_enable_pulse_has_setup_and_hold() {
		let timing = Timing::REFERENCE;
		let mut board = SimulatedBoard::new(Chip::At28c64b);
		board.pulse_write_enable(&timing);

		let trace = board.trace();
		assert_eq!(vec![Duration::from_micros(800)], trace.edges(Line::WriteEnable, Level::Low));
		assert_eq!(vec![Duration::from_micros(1600)], trace.edges(Line::WriteEnable, Level::High));
		assert_eq!(Duration::from_micros(2400), board.now());
		assert_eq!(Level::High, board.level(Line::WriteEnable));
	}

	#[test]
	fn shift_out_sends_msb_first() {
		let timing = Timing::REFERENCE;
		for value in 0..=255u8 {
			let mut board = SimulatedBoard::new(Chip::At28c64b);
			board.shift_out_byte(value, &timing);

			let trace = board.trace();
			let rising = trace.edges(Line::ShiftClock, Level::High);
			let falling = trace.edges(Line::ShiftClock, Level::Low);
			assert_eq!(8, rising.len());
			assert_eq!(8, falling.len());

			let mut sampled = 0u8;
			for (up, down) in rising.iter().zip(falling.iter()) {
				// SER must not glitch during the high phase
				assert_eq!(trace.level_at(Line::ShiftData, *up), trace.level_at(Line::ShiftData, *down));
				let middle = (*up + *down) / 2;
				sampled = (sampled << 1) | trace.level_at(Line::ShiftData, middle).is_high() as u8;
			}
			assert_eq!(value, sampled);

			let latches = trace.edges(Line::ShiftLatch, Level::High);
			assert_eq!(1, latches.len());
			assert!(latches[0] > *falling.last().unwrap(), "latch must follow the last clock");
			assert_eq!(value as u16, board.latched_address());
		}
	}
}
