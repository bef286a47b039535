//! Deterministic hashers for ordering tests.

use std::hash::{BuildHasher, Hasher};

/// Hashes integers to themselves so key-hash order equals numeric order.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityState;

#[derive(Default)]
pub struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
	fn finish(&self) -> u64 {
		self.0
	}

	fn write(&mut self, bytes: &[u8]) {
		for &b in bytes {
			self.0 = self.0.wrapping_shl(8) | u64::from(b);
		}
	}

	fn write_u32(&mut self, n: u32) {
		self.0 = u64::from(n);
	}

	fn write_u64(&mut self, n: u64) {
		self.0 = n;
	}

	fn write_i32(&mut self, n: i32) {
		self.0 = n as u64;
	}

	fn write_usize(&mut self, n: usize) {
		self.0 = n as u64;
	}
}

impl BuildHasher for IdentityState {
	type Hasher = IdentityHasher;

	fn build_hasher(&self) -> IdentityHasher {
		IdentityHasher::default()
	}
}

/// Hashes everything to zero, forcing every key into one collision run.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollidingState;

pub struct CollidingHasher;

impl Hasher for CollidingHasher {
	fn finish(&self) -> u64 {
		0
	}

	fn write(&mut self, _bytes: &[u8]) {}
}

impl BuildHasher for CollidingState {
	type Hasher = CollidingHasher;

	fn build_hasher(&self) -> CollidingHasher {
		CollidingHasher
	}
}
