//! Seed codec.
//!
//! A [`Seed`] packs everything needed to recompute a table's slot function
//! into a single scalar: the table size, the size rounded up to a power of
//! two (minus one), and the random salt. See [`ParamsExt`] for the layout.
//!
//! [`ParamsExt`]: crate::params::ParamsExt

use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result;
use core::hash::Hash;
use core::hash::Hasher;
use core::marker::PhantomData;

use crate::params::Params;
use crate::params::ParamsExt;

/// A table seed.
///
/// Immutable once composed. A seed with size `0` describes an absent slot
/// zone; [`Seed::EMPTY`] is the canonical such seed.
///
/// ```
/// use sstab::{DefaultParams, Seed};
///
/// let seed: Seed<DefaultParams> = Seed::compose(0xDEAD_BEEF_0000_0000, 24);
///
/// assert_eq!(seed.size(), 24);
/// assert_eq!(seed.mask(), 31);
/// ```
#[repr(transparent)]
pub struct Seed<P>
where
  P: ?Sized,
{
  bits: u64,
  marker: PhantomData<fn(P)>,
}

impl<P> Seed<P>
where
  P: Params + ?Sized,
{
  /// The seed of an absent slot zone.
  pub const EMPTY: Self = Self::from_bits(0);

  /// Packs `salt` and `size` into a seed.
  ///
  /// Only the high bits of `salt` selected by [`ParamsExt::SALT_MASK`] are
  /// kept; the low bits are replaced by the size fields.
  ///
  /// # Panics
  ///
  /// Panics if `size` exceeds [`Params::MAX_TABLE_SIZE`].
  #[track_caller]
  #[inline]
  pub const fn compose(salt: u64, size: usize) -> Self {
    assert!(
      size <= P::MAX_TABLE_SIZE.as_usize(),
      "invalid seed: table size exceeds `MAX_TABLE_SIZE`",
    );

    let mask: u64 = if size == 0 {
      0
    } else {
      (size.next_power_of_two() - 1) as u64
    };

    let bits: u64 = (salt & P::SALT_MASK) | (mask << P::SIZE_SHIFT) | size as u64;
    let seed: Self = Self::from_bits(bits);

    debug_assert!(seed.size() == size);
    debug_assert!(seed.mask() as u64 == mask);

    seed
  }

  /// Returns the table size encoded in the seed.
  #[inline]
  pub const fn size(self) -> usize {
    (self.bits & P::SIZE_MASK) as usize
  }

  /// Returns `round_up_pow2(size) - 1`, or `0` for an empty seed.
  #[inline]
  pub const fn mask(self) -> usize {
    ((self.bits >> P::SIZE_SHIFT) & P::SIZE_MASK) as usize
  }

  /// Returns the salt bits of the seed.
  #[inline]
  pub const fn salt(self) -> u64 {
    self.bits & P::SALT_MASK
  }

  /// Returns `true` if the seed describes an absent slot zone.
  #[inline]
  pub const fn is_empty(self) -> bool {
    self.size() == 0
  }
}

impl<P> Seed<P>
where
  P: ?Sized,
{
  /// Creates a seed from its raw bit representation.
  ///
  /// The bits are not validated; a seed produced this way is only meaningful
  /// if it came from [`into_bits`] under the same [`Params`].
  ///
  /// [`into_bits`]: Self::into_bits
  #[inline]
  pub const fn from_bits(bits: u64) -> Self {
    Self {
      bits,
      marker: PhantomData,
    }
  }

  /// Returns the raw bit representation of this seed.
  #[inline]
  pub const fn into_bits(self) -> u64 {
    self.bits
  }
}

impl<P> Clone for Seed<P>
where
  P: ?Sized,
{
  #[inline]
  fn clone(&self) -> Self {
    *self
  }
}

impl<P> Copy for Seed<P> where P: ?Sized {}

impl<P> PartialEq for Seed<P>
where
  P: ?Sized,
{
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    self.bits == other.bits
  }
}

impl<P> Eq for Seed<P> where P: ?Sized {}

impl<P> Hash for Seed<P>
where
  P: ?Sized,
{
  #[inline]
  fn hash<H>(&self, state: &mut H)
  where
    H: Hasher,
  {
    self.bits.hash(state);
  }
}

impl<P> Debug for Seed<P>
where
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("Seed")
      .field("size", &self.size())
      .field("mask", &self.mask())
      .field("salt", &format_args!("{:#018x}", self.salt()))
      .finish()
  }
}

impl<P> Display for Seed<P>
where
  P: ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "{:#018x}", self.bits)
  }
}
