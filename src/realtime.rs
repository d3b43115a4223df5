use std::io;

use libc::{
	MCL_CURRENT,
	MCL_FUTURE,
	SCHED_FIFO,
	mlockall,
	sched_get_priority_min,
	sched_param,
	sched_setscheduler,
};

/// Keep the scheduler from stretching the hold times too much.
///
/// Locks all pages (no page faults inside a pulse) and moves the process
/// into the FIFO real-time class. Delays can still only get longer, never
/// shorter, so this is about throughput, not correctness.
pub fn enter_realtime() -> crate::AResult<()> {
	with_context!("lock memory", {
		if 0 != unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) } {
			return Err(io::Error::last_os_error().into());
		}
		Ok(())
	})?;

	with_context!("switch to SCHED_FIFO", {
		let param = sched_param {
			sched_priority: unsafe { sched_get_priority_min(SCHED_FIFO) },
		};
		if 0 != unsafe { sched_setscheduler(0, SCHED_FIFO, &param) } {
			return Err(io::Error::last_os_error().into());
		}
		Ok(())
	})?;

	info!("running with SCHED_FIFO, memory locked");
	Ok(())
}
