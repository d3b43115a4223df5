use std::fmt;
use std::str;

use crate::programmer::Line;

/// GPIO numbers (kernel numbering) wired to the programmer lines.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PinMap {
	pub shift_data: u32,
	pub shift_clock: u32,
	pub shift_latch: u32,
	pub write_enable: u32,
	pub io: [u32; 8],
}

impl Default for PinMap {
	// Raspberry Pi header, BCM numbering
	fn default() -> Self {
		PinMap {
			shift_data: 17,
			shift_clock: 27,
			shift_latch: 22,
			write_enable: 4,
			io: [5, 6, 13, 19, 26, 16, 20, 21],
		}
	}
}

impl PinMap {
	pub fn gpio(&self, line: Line) -> u32 {
		match line {
			Line::ShiftData => self.shift_data,
			Line::ShiftClock => self.shift_clock,
			Line::ShiftLatch => self.shift_latch,
			Line::WriteEnable => self.write_enable,
			Line::Io(bit) => self.io[bit as usize],
		}
	}

	fn gpio_mut(&mut self, line: Line) -> &mut u32 {
		match line {
			Line::ShiftData => &mut self.shift_data,
			Line::ShiftClock => &mut self.shift_clock,
			Line::ShiftLatch => &mut self.shift_latch,
			Line::WriteEnable => &mut self.write_enable,
			Line::Io(bit) => &mut self.io[bit as usize],
		}
	}

	fn check_unique(&self) -> crate::AResult<()> {
		for (i, a) in Line::ALL.iter().enumerate() {
			for b in Line::ALL[i + 1..].iter() {
				ensure!(self.gpio(*a) != self.gpio(*b), "{} and {} both mapped to GPIO {}", a, b, self.gpio(*a));
			}
		}
		Ok(())
	}
}

fn parse_line_name(name: &str) -> crate::AResult<Line> {
	let lower = name.to_ascii_lowercase();
	Ok(match lower.as_str() {
		"ser" | "data" => Line::ShiftData,
		"srclk" | "clock" => Line::ShiftClock,
		"rclk" | "latch" => Line::ShiftLatch,
		"we" | "/we" => Line::WriteEnable,
		_ => {
			ensure!(lower.len() == 3 && lower.starts_with("io"), "Unknown line name {:?}", name);
			let bit = with_context!(("invalid data line {:?}", name),
				Ok(lower[2..].parse::<u8>()?)
			)?;
			match Line::data(bit) {
				Some(line) => line,
				None => bail!("invalid data line {:?} (only IO0..IO7)", name),
			}
		}
	})
}

impl str::FromStr for PinMap {
	type Err = ::failure::Error;

	/// Overrides for the default map: `we=4,ser=17,io0=5,...`
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut map = PinMap::default();
		for assignment in s.split(',').map(str::trim).filter(|a| !a.is_empty()) {
			let mut parts = assignment.splitn(2, '=');
			let name = parts.next().unwrap_or("");
			let number = parts.next().ok_or_else(|| format_err!("Missing '=' in pin assignment {:?}", assignment))?;
			let line = parse_line_name(name.trim())?;
			let gpio = with_context!(("invalid GPIO number for {}: {:?}", line, number),
				Ok(number.trim().parse::<u32>()?)
			)?;
			*map.gpio_mut(line) = gpio;
		}
		map.check_unique()?;
		Ok(map)
	}
}

impl fmt::Display for PinMap {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut first = true;
		for line in Line::ALL.iter() {
			if !first {
				write!(f, ",")?;
			}
			first = false;
			write!(f, "{}={}", line.to_string().trim_start_matches('/').to_ascii_lowercase(), self.gpio(*line))?;
		}
		Ok(())
	}
}
