//! Seedable mixing functions and the class hash allocator.

use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;

use crate::class::ClassId;

/// Odd multiplier of the mixer.
const MUL: u64 = 0x8ADA_E89C_3379_54D5;

/// Alternating-bit constant folded into the low input word.
const ALT: u64 = 0xAAAA_AAAA_AAAA_AAAA;

/// Salt used by [`HashAllocator::default`].
const DEFAULT_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
const fn fullmul(lhs: u64, rhs: u64) -> (u64, u64) {
  let product: u128 = (lhs as u128) * (rhs as u128);
  ((product >> 64) as u64, product as u64)
}

/// Mixes two 64-bit words into a pseudo-random 64-bit pattern.
///
/// Built from two widening multiplies and a data-dependent rotation. Nearby
/// inputs produce unrelated outputs, which is what both slot selection and
/// seed generation rely on.
///
/// ```
/// use sstab::hashing::mix;
///
/// assert_eq!(mix(1, 2), mix(1, 2));
/// assert_ne!(mix(1, 2), mix(2, 1));
/// ```
#[inline]
pub const fn mix(x: u64, y: u64) -> u64 {
  let h0: u64 = x ^ y;
  let l0: u64 = x ^ ALT;

  let (u0, v0): (u64, u64) = fullmul(l0, MUL);
  let q0: u64 = h0.wrapping_mul(MUL);
  let l1: u64 = q0 ^ u0;

  let (u1, v1): (u64, u64) = fullmul(l1, MUL);
  let p1: u64 = v0 ^ MUL;
  let q1: u64 = p1.rotate_right((l1 & 0x3F) as u32);
  let l2: u64 = q1 ^ u1;

  v1 ^ l2
}

/// The 32-bit analog of [`mix`], folding the wide result in half.
#[inline]
pub const fn mix32(x: u32, y: u32) -> u32 {
  let wide: u64 = mix(x as u64, y as u64);
  (wide ^ (wide >> 32)) as u32
}

// -----------------------------------------------------------------------------
// Seed Source
// -----------------------------------------------------------------------------

/// A source of fresh pseudo-random seeds.
///
/// The table search draws one value per attempt. Implementations must be
/// deterministic for a given starting state so that table construction can
/// be replayed in tests.
pub trait SeedSource {
  /// Returns the next pseudo-random value.
  fn next_seed(&mut self) -> u64;
}

impl<S> SeedSource for &mut S
where
  S: SeedSource + ?Sized,
{
  #[inline]
  fn next_seed(&mut self) -> u64 {
    (**self).next_seed()
  }
}

// -----------------------------------------------------------------------------
// Hash Allocator
// -----------------------------------------------------------------------------

/// Allocates class identities, class hash codes, and table seeds.
///
/// Replaces a hidden process-wide counter with explicit state threaded
/// through class definition. Every value is a monotonic counter run through
/// [`mix`] with the allocator's salt, so hash codes are decorrelated from
/// definition order while remaining fully reproducible from the salt.
///
/// ```
/// use sstab::HashAllocator;
///
/// let mut a: HashAllocator = HashAllocator::new(7);
/// let mut b: HashAllocator = HashAllocator::new(7);
///
/// assert_eq!(a.next_hash_code(), b.next_hash_code());
/// ```
#[derive(Clone)]
pub struct HashAllocator {
  salt: u64,
  counter: u64,
  serial: u64,
}

impl HashAllocator {
  /// Creates an allocator whose sequence is determined by `salt`.
  #[inline]
  pub const fn new(salt: u64) -> Self {
    Self {
      salt,
      counter: 0,
      serial: 0,
    }
  }

  /// Returns the salt this allocator was created with.
  #[inline]
  pub const fn salt(&self) -> u64 {
    self.salt
  }

  /// Advances the counter and returns the next mixed 64-bit value.
  #[inline]
  pub const fn next_seed(&mut self) -> u64 {
    self.counter = self.counter.wrapping_add(1);
    mix(self.counter, self.salt)
  }

  /// Returns a fresh 32-bit class hash code.
  #[inline]
  pub const fn next_hash_code(&mut self) -> u32 {
    let value: u64 = self.next_seed();
    (value ^ (value >> 32)) as u32
  }

  /// Returns a fresh class identity.
  ///
  /// Identities are sequential and never reused by the same allocator.
  #[inline]
  pub const fn next_id(&mut self) -> ClassId {
    self.serial += 1;
    ClassId::from_bits(self.serial)
  }
}

impl Default for HashAllocator {
  #[inline]
  fn default() -> Self {
    Self::new(DEFAULT_SALT)
  }
}

impl Debug for HashAllocator {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("HashAllocator")
      .field("salt", &format_args!("{:#018x}", self.salt))
      .field("counter", &self.counter)
      .field("serial", &self.serial)
      .finish()
  }
}

impl SeedSource for HashAllocator {
  #[inline]
  fn next_seed(&mut self) -> u64 {
    Self::next_seed(self)
  }
}
