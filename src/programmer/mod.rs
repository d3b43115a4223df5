/// Bit-banged write protocol for AT28C style parallel EEPROMs.
///
/// Address: two daisy-chained 74HC595 (SER, SRCLK, RCLK), shifted MSB
/// first, high byte first. Each byte gets latched right after shifting.
///
/// Data: 8 discrete lines IO0..IO7, bit 0 on IO0.
///
/// Write: active-low /WE pulse; the chip commits on the rising edge. There
/// is no feedback line, all waits are fixed delays.

mod hardware;
mod low_level;
mod operations;

pub use self::hardware::{
	Hardware,
	LINE_COUNT,
	Level,
	Line,
	Timing,
	reliable_sleep,
};

pub use self::low_level::LowLevel;

pub use self::operations::{
	Programmer,
};
