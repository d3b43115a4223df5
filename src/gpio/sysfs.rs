use std::fs;
use std::io::{
	self,
	Write,
};
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};
use std::thread;
use std::time::Duration;

use crate::programmer::{
	Hardware,
	LINE_COUNT,
	Level,
	Line,
};

use super::PinMap;

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

// udev needs a moment to fix permissions of freshly exported lines
const EXPORT_SETTLE: Duration = Duration::from_millis(100);

struct GpioLine {
	gpio: u32,
	value: fs::File,
}

/// Programmer lines bound to the legacy sysfs GPIO interface.
pub struct SysfsGpio {
	root: PathBuf,
	lines: Vec<GpioLine>, // indexed by `Line::index`
	exported: Vec<u32>,
}

fn write_file(path: &Path, content: &str) -> crate::AResult<()> {
	// sysfs attributes need the whole value in one write
	with_context!(("write {:?} to {}", content, path.display()), {
		fs::OpenOptions::new().write(true).open(path)?.write_all(content.as_bytes())?;
		Ok(())
	})
}

impl SysfsGpio {
	/// Export (if necessary) and configure all lines as outputs.
	///
	/// The initial level is part of the direction write, so /WE never
	/// glitches low while the line becomes an output.
	pub fn open(root: &Path, pins: &PinMap) -> crate::AResult<Self> {
		let mut gpio = SysfsGpio {
			root: root.to_path_buf(),
			lines: Vec::with_capacity(LINE_COUNT),
			exported: Vec::new(),
		};

		// Line::ALL is in index order
		for line in Line::ALL.iter() {
			let number = pins.gpio(*line);
			gpio.export(number)?;

			let direction = match line.idle_level() {
				Level::High => "high",
				Level::Low => "low",
			};
			write_file(&gpio.line_file(number, "direction"), direction)?;

			let value_path = gpio.line_file(number, "value");
			let value = with_context!(("open {} for {}", value_path.display(), line),
				Ok(fs::OpenOptions::new().read(true).write(true).open(&value_path)?)
			)?;
			debug!("{} on GPIO {}", line, number);
			gpio.lines.push(GpioLine {
				gpio: number,
				value,
			});
		}

		Ok(gpio)
	}

	fn line_file(&self, gpio: u32, name: &str) -> PathBuf {
		self.root.join(format!("gpio{}", gpio)).join(name)
	}

	fn export(&mut self, gpio: u32) -> crate::AResult<()> {
		if self.root.join(format!("gpio{}", gpio)).exists() {
			return Ok(());
		}
		write_file(&self.root.join("export"), &gpio.to_string())?;
		self.exported.push(gpio);
		thread::sleep(EXPORT_SETTLE);
		Ok(())
	}

	fn unexport(&self, gpio: u32) -> crate::AResult<()> {
		write_file(&self.root.join("unexport"), &gpio.to_string())
	}
}

impl Drop for SysfsGpio {
	fn drop(&mut self) {
		// close the value files before the line directories go away
		self.lines.clear();
		for gpio in self.exported.drain(..).collect::<Vec<_>>() {
			if let Err(e) = self.unexport(gpio) {
				error!("GPIO {}: Failed to unexport temporarily exported line: {}", gpio, e);
			}
		}
	}
}

impl Hardware for SysfsGpio {
	fn set_line(&mut self, line: Line, level: Level) {
		let l = &self.lines[line.index()];
		let value: &[u8] = if level.is_high() { b"1" } else { b"0" };
		let res = l.value.write_at(value, 0).and_then(|n| {
			if n != 1 {
				Err(io::Error::new(io::ErrorKind::Other, "short write"))
			} else {
				Ok(())
			}
		});
		if let Err(e) = res {
			panic!("GPIO {} ({}): setting value failed: {}", l.gpio, line, e);
		}
	}

	fn read_line(&mut self, line: Line) -> Level {
		let l = &self.lines[line.index()];
		let mut buf = [0u8; 1];
		match l.value.read_at(&mut buf, 0) {
			Ok(1) => Level::from(buf[0] == b'1'),
			Ok(_) => panic!("GPIO {} ({}): empty value", l.gpio, line),
			Err(e) => panic!("GPIO {} ({}): reading value failed: {}", l.gpio, line, e),
		}
	}
}
