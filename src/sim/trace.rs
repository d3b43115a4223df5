use std::time::Duration;

use crate::programmer::{
	LINE_COUNT,
	Level,
	Line,
};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Event {
	pub at: Duration,
	pub line: Line,
	pub level: Level,
}

/// Every `set_line` call in order, including the ones not changing the level.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Trace {
	initial: [Level; LINE_COUNT],
	events: Vec<Event>,
}

impl Trace {
	pub fn new(initial: [Level; LINE_COUNT]) -> Self {
		Trace {
			initial,
			events: Vec::new(),
		}
	}

	pub(super) fn push(&mut self, event: Event) {
		self.events.push(event);
	}

	pub fn events(&self) -> &[Event] {
		&self.events
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Level of `line` at time `at`; for events at exactly `at` the last one wins.
	pub fn level_at(&self, line: Line, at: Duration) -> Level {
		self.events.iter()
			.filter(|e| e.line == line && e.at <= at)
			.last()
			.map(|e| e.level)
			.unwrap_or(self.initial[line.index()])
	}

	/// Times at which `line` changed to `level`
	pub fn edges(&self, line: Line, level: Level) -> Vec<Duration> {
		let mut current = self.initial[line.index()];
		let mut result = Vec::new();
		for e in self.events.iter().filter(|e| e.line == line) {
			if e.level != current {
				current = e.level;
				if current == level {
					result.push(e.at);
				}
			}
		}
		result
	}
}

#[cfg(test)]
mod test {
	use std::time::Duration;

	use super::{
		Event,
		Trace,
	};
	use crate::programmer::{
		LINE_COUNT,
		Level,
		Line,
	};

	fn us(v: u64) -> Duration {
		Duration::from_micros(v)
	}

	#[test]
	fn edges_skip_repeated_levels() {
		let mut trace = Trace::new([Level::Low; LINE_COUNT]);
		for &(at, level) in [(1, Level::Low), (2, Level::High), (3, Level::High), (4, Level::Low), (5, Level::High)].iter() {
			trace.push(Event { at: us(at), line: Line::ShiftClock, level });
		}
		trace.push(Event { at: us(6), line: Line::ShiftData, level: Level::High });

		assert_eq!(vec![us(2), us(5)], trace.edges(Line::ShiftClock, Level::High));
		assert_eq!(vec![us(4)], trace.edges(Line::ShiftClock, Level::Low));
		assert_eq!(vec![us(6)], trace.edges(Line::ShiftData, Level::High));
		assert!(trace.edges(Line::WriteEnable, Level::Low).is_empty());
	}

	#[test]
	fn level_at_uses_initial_and_last_event() {
		let mut initial = [Level::Low; LINE_COUNT];
		initial[Line::WriteEnable.index()] = Level::High;
		let mut trace = Trace::new(initial);
		trace.push(Event { at: us(10), line: Line::WriteEnable, level: Level::Low });
		trace.push(Event { at: us(10), line: Line::WriteEnable, level: Level::High });
		trace.push(Event { at: us(20), line: Line::WriteEnable, level: Level::Low });

		assert_eq!(Level::High, trace.level_at(Line::WriteEnable, us(0)));
		assert_eq!(Level::High, trace.level_at(Line::WriteEnable, us(10)));
		assert_eq!(Level::High, trace.level_at(Line::WriteEnable, us(19)));
		assert_eq!(Level::Low, trace.level_at(Line::WriteEnable, us(20)));
		assert_eq!(Level::Low, trace.level_at(Line::Io(3), us(20)));
	}
}
