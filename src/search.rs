//! Randomized table search.
//!
//! Tries many seeds per table size and keeps the best packing. The search is
//! bounded purely by attempt counters and the size ladder, never by time.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use std::time::Instant;

use crate::hash::SeedSource;
use crate::pack::Packing;
use crate::pack::SlotKey;
use crate::pack::pack;
use crate::pack::pack_bounded;
use crate::params::Params;
use crate::seed::Seed;

// -----------------------------------------------------------------------------
// Score
// -----------------------------------------------------------------------------

/// The quality of a packing; lower is better.
///
/// Compared lexicographically by:
///
/// 1. tail length: every tail element costs a linear scan on a hit;
/// 2. conflicted slots: a negative lookup landing on one must scan the tail;
/// 3. vacant slots: wasted space.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Score {
  tail: usize,
  conflicts: usize,
  vacant: usize,
}

impl Score {
  #[inline]
  pub(crate) const fn new(tail: usize, conflicts: usize, vacant: usize) -> Self {
    Self {
      tail,
      conflicts,
      vacant,
    }
  }

  /// Returns the number of tail elements.
  #[inline]
  pub const fn tail(self) -> usize {
    self.tail
  }

  /// Returns the number of conflicted slots.
  #[inline]
  pub const fn conflicts(self) -> usize {
    self.conflicts
  }

  /// Returns the number of vacant slots.
  #[inline]
  pub const fn vacant(self) -> usize {
    self.vacant
  }
}

impl Ord for Score {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .tail
      .cmp(&other.tail)
      .then(self.conflicts.cmp(&other.conflicts))
      .then(self.vacant.cmp(&other.vacant))
  }
}

impl PartialOrd for Score {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Debug for Score {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(
      f,
      "tail={} conflicts={} vacant={}",
      self.tail, self.conflicts, self.vacant,
    )
  }
}

// -----------------------------------------------------------------------------
// Size Ladder
// -----------------------------------------------------------------------------

/// Returns the first table size tried for `count` elements.
///
/// A result of `0` means the elements are kept as a plain list.
pub fn initial_size<P>(count: usize) -> usize
where
  P: Params + ?Sized,
{
  if P::MAX_ATTEMPTS == 0 || count < P::MIN_TABLE_SIZE || count == 0 {
    return 0;
  }

  let size: usize = if P::SIZING.is_power_of_two_only() {
    count.next_power_of_two()
  } else {
    count.div_ceil(P::CHUNK_SIZE) * P::CHUNK_SIZE
  };

  size.min(P::MAX_TABLE_SIZE.as_usize())
}

/// Returns the size tried after `size` has been exhausted, if any.
///
/// Growth stops at [`Params::MAX_TABLE_SIZE`] and once the table holds at
/// least twice as many slots as elements; beyond that point a larger table
/// mostly adds vacant slots.
pub fn next_size<P>(size: usize, count: usize) -> Option<usize>
where
  P: Params + ?Sized,
{
  let limit: usize = P::MAX_TABLE_SIZE.as_usize();

  if !P::ALLOW_RESIZING || size == 0 || size >= limit || size >= count.saturating_mul(2) {
    return None;
  }

  let next: usize = if P::SIZING.is_power_of_two_only() {
    size * 2
  } else {
    size + P::CHUNK_SIZE
  };

  Some(next.min(limit))
}

// -----------------------------------------------------------------------------
// Search
// -----------------------------------------------------------------------------

/// Finds a good packing of `groups` by trying seeds drawn from `seeds`.
///
/// Terminates on a perfect packing, when the size ladder is exhausted, or
/// after [`Params::MAX_TOTAL_ATTEMPTS`] seeds, whichever comes first. The
/// worst case is a size-`0` packing with every element in the tail, which is
/// always valid.
pub fn search<E, P, S>(groups: &[&[E]], seeds: &mut S) -> Packing<E, P>
where
  E: SlotKey,
  P: Params + ?Sized,
  S: SeedSource + ?Sized,
{
  let started: Instant = Instant::now();
  let count: usize = groups.iter().map(|group| group.len()).sum();
  let mut best: Packing<E, P> = pack(Seed::EMPTY, groups);
  let mut size: usize = initial_size::<P>(count);
  let mut total: usize = 0;

  if size == 0 {
    return best;
  }

  'sizes: loop {
    for _ in 0..P::MAX_ATTEMPTS {
      if total == P::MAX_TOTAL_ATTEMPTS {
        break 'sizes;
      }

      total += 1;

      let seed: Seed<P> = Seed::compose(seeds.next_seed(), size);

      let Some(packing) = pack_bounded(seed, groups, best.tail().len()) else {
        continue;
      };

      let full: bool = packing.is_full();

      if packing.score() < best.score() {
        tracing::trace!(
          attempt = total,
          size,
          %seed,
          score = ?packing.score(),
          "improved secondary supers packing"
        );

        best = packing;
      }

      if best.is_perfect() {
        break 'sizes;
      }

      // A full table already holds as many elements as this size allows.
      if full {
        break;
      }
    }

    match next_size::<P>(size, count) {
      Some(next) => size = next,
      None => break,
    }
  }

  tracing::debug!(
    count,
    attempts = total,
    size = best.size(),
    score = ?best.score(),
    elapsed = ?started.elapsed(),
    "secondary supers search finished"
  );

  best
}
