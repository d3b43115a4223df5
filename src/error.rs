use std::time::Duration;

use crate::chip::Chip;

/// Protocol level failures.
///
/// The pin primitives themselves can't fail; these cover requests that
/// would silently corrupt the chip if they were executed.
#[derive(Clone, PartialEq, Eq, Debug, Fail)]
pub enum ProgrammerError {
	/// Address not decoded by the target chip; rejected before any line is driven.
	#[fail(display = "address 0x{:05x} outside of {} (size 0x{:05x})", address, chip, size)]
	InvalidAddress {
		address: u32,
		chip: Chip,
		size: u32,
	},

	/// A hold or gap shorter than the chip needs.
	#[fail(display = "{} too short: {:?} (need at least {:?})", what, actual, required)]
	TimingViolation {
		what: &'static str,
		actual: Duration,
		required: Duration,
	},
}

impl ProgrammerError {
	pub fn invalid_address(address: u32, chip: Chip) -> Self {
		ProgrammerError::InvalidAddress {
			address,
			chip,
			size: chip.size(),
		}
	}
}
