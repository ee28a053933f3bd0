//! Arm-once, consume, detach.
//!
//! Stands in for a self-removing event listener: the handler stays attached,
//! but only the first event after [`OneShot::arm`] gets through.

/// A slot that accepts exactly one value per arming.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OneShot {
	armed: bool,
}

impl OneShot {
	/// Re-arms the slot, forgetting any earlier firing.
	pub fn arm(&mut self) {
		self.armed = true;
	}

	/// Consumes the arming. Returns `true` only for the first call after `arm`.
	pub fn fire(&mut self) -> bool {
		if !self.armed {
			return false;
		}
		self.armed = false;
		true
	}

	/// Detaches without firing.
	pub fn disarm(&mut self) {
		self.armed = false;
	}

	/// Whether the next [`OneShot::fire`] gets through.
	pub fn is_armed(&self) -> bool {
		self.armed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fires_once_per_arming() {
		let mut shot = OneShot::default();
		assert!(!shot.fire());

		shot.arm();
		assert!(shot.is_armed());
		assert!(shot.fire());
		assert!(!shot.fire());
		assert!(!shot.is_armed());

		shot.arm();
		assert!(shot.fire());
	}

	#[test]
	fn disarm_detaches_without_firing() {
		let mut shot = OneShot::default();
		shot.arm();
		shot.disarm();
		assert!(!shot.is_armed());
		assert!(!shot.fire());
	}
}
