//! Slot index functions.
//!
//! Maps a class hash code onto a slot of a table described by a [`Seed`]. The
//! strategy is chosen by [`Params::SIZING`].

use crate::hash::mix;
use crate::params::Params;
use crate::params::Sizing;
use crate::seed::Seed;

/// Returns the natural slot of `hash` in the table described by `seed`.
///
/// The result is always in `0..seed.size()`. The same `(hash, seed)` pair
/// always yields the same slot, which is what lets lookups and verification
/// recompute positions chosen at build time.
///
/// # Panics
///
/// Debug builds panic if `seed` describes an empty table; callers must
/// special-case the tail-only representation.
///
/// ```
/// use sstab::{DefaultParams, Seed};
/// use sstab::hashing::slot_index;
///
/// let seed: Seed<DefaultParams> = Seed::compose(0x1234_5678_0000_0000, 16);
///
/// assert!(slot_index(0xCAFE, seed) < 16);
/// ```
#[inline]
pub fn slot_index<P>(hash: u32, seed: Seed<P>) -> usize
where
  P: Params + ?Sized,
{
  let size: usize = seed.size();

  debug_assert!(size > 0, "slot_index requires a non-empty table");

  let mixed: u64 = mix(seed.into_bits(), u64::from(hash));

  let index: usize = match P::SIZING {
    Sizing::PowerOfTwo => {
      debug_assert!(size.is_power_of_two(), "power-of-two sizing with size {size}");
      (mixed as usize) & (size - 1)
    }
    Sizing::Modulo => (mixed % size as u64) as usize,
    Sizing::Reflect => reflect(mixed as usize & seed.mask(), size),
  };

  debug_assert!(index < size);
  index
}

/// Folds `value < round_up_pow2(size)` back into `0..size`.
#[inline]
const fn reflect(value: usize, size: usize) -> usize {
  if value >= size { value - size } else { value }
}
