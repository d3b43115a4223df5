/// Two cascaded 74HC595: the overflow of the first register feeds the
/// second one, so after 16 clocks the first bit shifted in is the MSB.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ShiftRegisterChain {
	shift: u16,
	output: u16,
}

impl ShiftRegisterChain {
	// rising SRCLK
	pub fn clock(&mut self, bit: bool) {
		self.shift = (self.shift << 1) | (bit as u16);
	}

	// rising RCLK
	pub fn latch(&mut self) {
		self.output = self.shift;
	}

	pub fn output(&self) -> u16 {
		self.output
	}
}

#[cfg(test)]
mod test {
	use super::ShiftRegisterChain;

	#[test]
	fn first_bit_ends_up_on_top() {
		let mut chain = ShiftRegisterChain::default();
		chain.clock(true);
		for _ in 0..15 {
			chain.clock(false);
		}
		assert_eq!(0, chain.output());
		chain.latch();
		assert_eq!(0x8000, chain.output());
	}

	#[test]
	fn overflow_drops_out() {
		let mut chain = ShiftRegisterChain::default();
		for _ in 0..16 {
			chain.clock(true);
		}
		chain.clock(false);
		chain.latch();
		assert_eq!(0xfffe, chain.output());
	}
}
