#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod chip;
pub mod error;
pub mod gpio;
pub mod payload;
pub mod programmer;
pub mod realtime;
pub mod sim;

use crate::chip::Chip;
use crate::payload::Payload;
use crate::programmer::{
	Hardware,
	Programmer,
	Timing,
	reliable_sleep,
};

use std::time::Duration;

/// Time the chip needs after power-up before it accepts writes
pub const POWER_UP_DELAY: Duration = Duration::from_secs(1);

/// Full run on `hardware`: idle lines, power-up wait, write `payload`,
/// park the lines again.
///
/// The lines get parked even if the payload got rejected.
pub fn program<H: Hardware>(hardware: H, chip: Chip, timing: Timing, payload: &Payload, power_up: bool) -> AResult<H> {
	let mut programmer = Programmer::new(hardware, chip, timing)?;
	let estimate = match timing.batch_duration(payload.bytes.len()) {
		Some(d) => d,
		None => bail!("writing {} bytes with these holds would take longer than representable", payload.bytes.len()),
	};
	programmer.init();
	if power_up {
		reliable_sleep(POWER_UP_DELAY);
	}

	info!(
		"writing {} bytes to {} at 0x{:04x} (~{:?})",
		payload.bytes.len(), chip, payload.start, estimate,
	);
	let res = programmer.write_array(payload.start, &payload.bytes);
	programmer.park();
	res?;

	Ok(programmer.into_hardware())
}
