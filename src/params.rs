use core::any;
use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::marker::PhantomData;
use core::num::NonZeroUsize;

// -----------------------------------------------------------------------------
// Sizing Strategy
// -----------------------------------------------------------------------------

/// Strategy used to map a mixed hash onto a slot of a table.
///
/// The strategy also drives the size ladder walked by the table search:
/// [`Sizing::PowerOfTwo`] doubles the table on every step, the other two
/// strategies grow it by [`Params::CHUNK_SIZE`] slots.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Sizing {
  /// `hash & (size - 1)`; table sizes are always powers of two.
  PowerOfTwo,
  /// `hash % size`; table sizes are arbitrary.
  Modulo,
  /// `hash & (round_up_pow2(size) - 1)`, with values at or beyond `size`
  /// folded back into the table by subtracting `size`.
  Reflect,
}

impl Sizing {
  /// Returns `true` if this strategy only produces power-of-two tables.
  #[inline]
  pub const fn is_power_of_two_only(self) -> bool {
    matches!(self, Self::PowerOfTwo)
  }
}

// -----------------------------------------------------------------------------
// Configurable Params
// -----------------------------------------------------------------------------

/// Configuration parameters for secondary supertype tables.
///
/// Every class built with the same `Params` type shares one configuration, so
/// these knobs are process-wide in practice. The simplest customization is
/// [`ConstParams`], which only changes the maximum table size:
///
/// ```no_run
/// use sstab::{Class, ConstParams};
///
/// type SmallClass = Class<ConstParams<16>>;
/// ```
///
/// # Implementing `Params`
///
/// For anything else, implement the trait directly and override the
/// constants you care about:
///
/// ```no_run
/// use sstab::{Capacity, Params};
/// use sstab::config::Sizing;
///
/// struct Chunked;
///
/// impl Params for Chunked {
///   const SIZING: Sizing = Sizing::Modulo;
///   const MAX_TABLE_SIZE: Capacity = Capacity::new(128);
///   const CHUNK_SIZE: usize = 12;
/// }
/// ```
pub trait Params {
  /// Slot index strategy.
  const SIZING: Sizing = Sizing::PowerOfTwo;

  /// The largest slot zone a table may use.
  ///
  /// Rounded up to the nearest power of two and clamped to
  /// <code>[Capacity::MIN]..=[Capacity::MAX]</code>.
  const MAX_TABLE_SIZE: Capacity = Capacity::DEF;

  /// Candidate count below which no slot zone is built at all.
  const MIN_TABLE_SIZE: usize = 4;

  /// Growth step used by [`Sizing::Modulo`] and [`Sizing::Reflect`].
  const CHUNK_SIZE: usize = 8;

  /// Number of seeds tried for every table size.
  ///
  /// A value of `0` disables the slot zones; every table is a plain list.
  const MAX_ATTEMPTS: usize = 16;

  /// Number of seeds tried across all table sizes.
  const MAX_TOTAL_ATTEMPTS: usize = 256;

  /// Whether the search may grow the table after exhausting a size.
  const ALLOW_RESIZING: bool = true;

  /// Whether a second-level table is built for large tails.
  const SECOND_LEVEL: bool = true;

  /// Tail length below which no second-level table is attempted.
  const SECOND_LEVEL_MIN: usize = 4;

  /// Depth of the primary supers array.
  const PRIMARY_SUPER_LIMIT: usize = 8;

  /// Whether every table lookup is checked against a linear scan.
  const VERIFY_LOOKUPS: bool = false;
}

// -----------------------------------------------------------------------------
// Configurable Params - Extensions
// -----------------------------------------------------------------------------

/// Derived parameters computed from [`Params`].
///
/// Automatically implemented for all [`Params`] types. The constants describe
/// the bit layout of a [`Seed`]:
///
/// ```text
///  63                      2*SIZE_SHIFT         SIZE_SHIFT             0
/// +-------------------------+---------------------+---------------------+
/// |          salt           |   round_up_pow2 - 1 |      table size     |
/// +-------------------------+---------------------+---------------------+
/// ```
///
/// # Example
///
/// ```no_run
/// use sstab::ConstParams;
/// use sstab::config::ParamsExt;
///
/// println!("{:#?}", <ConstParams<64> as ParamsExt>::debug());
/// ```
///
/// [`Seed`]: crate::seed::Seed
pub trait ParamsExt: Params + Sealed {
  /// Width of each of the two low seed fields.
  const SIZE_SHIFT: u32 = Self::MAX_TABLE_SIZE.log2() + 1;
  /// Mask extracting one low seed field.
  const SIZE_MASK: u64 = (1_u64 << Self::SIZE_SHIFT) - 1;
  /// Mask selecting the salt bits of a seed.
  const SALT_MASK: u64 = !((1_u64 << (2 * Self::SIZE_SHIFT)) - 1);

  /// Asserts that the configuration is usable.
  #[track_caller]
  fn validate() {
    assert!(
      Self::PRIMARY_SUPER_LIMIT > 0,
      "invalid params: `PRIMARY_SUPER_LIMIT` must be non-zero",
    );

    assert!(
      Self::SIZING.is_power_of_two_only() || Self::CHUNK_SIZE > 0,
      "invalid params: `CHUNK_SIZE` must be non-zero",
    );

    assert!(
      Self::MAX_TOTAL_ATTEMPTS >= Self::MAX_ATTEMPTS,
      "invalid params: `MAX_TOTAL_ATTEMPTS` must cover `MAX_ATTEMPTS`",
    );
  }

  #[inline]
  fn debug() -> DebugParams<Self> {
    DebugParams {
      marker: PhantomData,
    }
  }
}

// -----------------------------------------------------------------------------
// Debug Params
// -----------------------------------------------------------------------------

/// A helper type for displaying [`Params`] configuration.
///
/// Returned by [`ParamsExt::debug`]; implements [`Debug`] to show all derived
/// configuration values.
#[derive(Clone, Copy)]
pub struct DebugParams<P>
where
  P: ?Sized,
{
  marker: PhantomData<fn(P)>,
}

impl<P> Debug for DebugParams<P>
where
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct(any::type_name::<P>())
      .field("SIZING", &P::SIZING)
      .field("MAX_TABLE_SIZE", &P::MAX_TABLE_SIZE)
      .field("MIN_TABLE_SIZE", &P::MIN_TABLE_SIZE)
      .field("CHUNK_SIZE", &P::CHUNK_SIZE)
      .field("MAX_ATTEMPTS", &P::MAX_ATTEMPTS)
      .field("MAX_TOTAL_ATTEMPTS", &P::MAX_TOTAL_ATTEMPTS)
      .field("ALLOW_RESIZING", &P::ALLOW_RESIZING)
      .field("SECOND_LEVEL", &P::SECOND_LEVEL)
      .field("SECOND_LEVEL_MIN", &P::SECOND_LEVEL_MIN)
      .field("PRIMARY_SUPER_LIMIT", &P::PRIMARY_SUPER_LIMIT)
      .field("VERIFY_LOOKUPS", &P::VERIFY_LOOKUPS)
      .field("SIZE_SHIFT", &P::SIZE_SHIFT)
      .field("SIZE_MASK", &format_args!("{:#x}", P::SIZE_MASK))
      .field("SALT_MASK", &format_args!("{:#x}", P::SALT_MASK))
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Default Params
// -----------------------------------------------------------------------------

/// The default table configuration.
///
/// Power-of-two tables of up to [`Capacity::DEF`] slots, sixteen seeds per
/// size, and a second-level table for tails of four or more classes.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct DefaultParams;

impl Debug for DefaultParams {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Debug::fmt(&<Self as ParamsExt>::debug(), f)
  }
}

impl Params for DefaultParams {}

// -----------------------------------------------------------------------------
// Const-Generic Params
// -----------------------------------------------------------------------------

/// A [`Params`] implementation with a compile-time maximum table size.
///
/// `N` is rounded up to the nearest power of two and clamped to
/// <code>[Capacity::MIN]..=[Capacity::MAX]</code>. All other knobs keep their
/// defaults.
///
/// ```no_run
/// use sstab::{Capacity, ConstParams, Params};
///
/// assert_eq!(<ConstParams<100> as Params>::MAX_TABLE_SIZE, Capacity::new(128));
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub struct ConstParams<const N: usize>;

impl<const N: usize> Params for ConstParams<N> {
  const MAX_TABLE_SIZE: Capacity = Capacity::new(N);
}

// -----------------------------------------------------------------------------
// Linear Params
// -----------------------------------------------------------------------------

/// A [`Params`] implementation with the slot zones disabled.
///
/// Every secondary supers table is a plain list searched linearly. Useful as
/// a baseline and for callers that never expect many interfaces.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub struct LinearParams;

impl Params for LinearParams {
  const MAX_ATTEMPTS: usize = 0;
  const SECOND_LEVEL: bool = false;
}

// -----------------------------------------------------------------------------
// Auto-implement Derive
// -----------------------------------------------------------------------------

mod private {
  pub trait Sealed {}
}

use private::Sealed;

impl<P> Sealed for P where P: Params + ?Sized {}
impl<P> ParamsExt for P where P: Params + ?Sized {}

// -----------------------------------------------------------------------------
// Capacity
// -----------------------------------------------------------------------------

/// A validated maximum table size.
///
/// Represents a power-of-two value in the range <code>[MIN]..=[MAX]</code>.
/// Used by [`Params::MAX_TABLE_SIZE`].
///
/// ```no_run
/// use sstab::Capacity;
///
/// // Exact power of two
/// assert_eq!(Capacity::new(64).as_usize(), 64);
///
/// // Rounded up
/// assert_eq!(Capacity::new(100).as_usize(), 128);
///
/// // Clamped
/// assert_eq!(Capacity::new(0), Capacity::MIN);
/// assert_eq!(Capacity::new(usize::MAX), Capacity::MAX);
/// ```
///
/// [MIN]: Self::MIN
/// [MAX]: Self::MAX
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Capacity(NonZeroUsize);

impl Capacity {
  /// The minimum supported capacity (2¹ slots).
  pub const MIN: Self = Self::from_log2(1);

  /// The maximum supported capacity (2¹⁵ slots).
  ///
  /// Two seed fields of `log2(MAX) + 1` bits leave 32 bits of salt.
  pub const MAX: Self = Self::from_log2(15);

  /// The default capacity (2⁷ slots).
  pub const DEF: Self = Self::from_log2(7);

  /// Creates a new [`Capacity`] from an arbitrary value.
  ///
  /// Rounds up to the nearest power of two and clamps to
  /// <code>[MIN]..=[MAX]</code>.
  ///
  /// [MIN]: Self::MIN
  /// [MAX]: Self::MAX
  #[inline]
  pub const fn new(value: usize) -> Self {
    let Some(capacity) = value.checked_next_power_of_two() else {
      return Self::MAX;
    };

    if capacity < Self::MIN.as_usize() {
      Self::MIN
    } else if capacity > Self::MAX.as_usize() {
      Self::MAX
    } else {
      Self::from_log2(capacity.trailing_zeros())
    }
  }

  const fn from_log2(bits: u32) -> Self {
    match NonZeroUsize::new(1 << bits) {
      Some(value) => Self(value),
      None => panic!("invalid capacity"),
    }
  }

  /// Returns the capacity as a [`usize`].
  #[inline]
  pub const fn as_usize(self) -> usize {
    self.0.get()
  }

  /// Returns the capacity as a [`NonZeroUsize`].
  #[inline]
  pub const fn as_nonzero(self) -> NonZeroUsize {
    self.0
  }

  /// Returns the base-2 logarithm of the capacity.
  #[inline]
  pub const fn log2(self) -> u32 {
    self.0.trailing_zeros()
  }
}

impl Debug for Capacity {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "{:?} (1 << {:?})", self.as_nonzero(), self.log2())
  }
}

impl Default for Capacity {
  #[inline]
  fn default() -> Self {
    Self::DEF
  }
}

impl From<Capacity> for NonZeroUsize {
  #[inline]
  fn from(other: Capacity) -> Self {
    other.as_nonzero()
  }
}

impl From<Capacity> for usize {
  #[inline]
  fn from(other: Capacity) -> Self {
    other.as_usize()
  }
}
