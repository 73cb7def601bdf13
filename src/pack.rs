//! Table packer.
//!
//! Places elements at their natural slots on a first-come-first-served basis.
//! An element whose slot is already taken goes to the tail; residents are
//! never evicted.

use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;

use crate::index::slot_index;
use crate::params::Params;
use crate::search::Score;
use crate::seed::Seed;

/// An element that can be placed in a table.
///
/// Elements within one packing must be distinct.
pub trait SlotKey: Copy + PartialEq {
  /// Returns the hash code the slot index is computed from.
  fn hash_code(&self) -> u32;
}

impl SlotKey for u32 {
  #[inline]
  fn hash_code(&self) -> u32 {
    *self
  }
}

// -----------------------------------------------------------------------------
// Slot
// -----------------------------------------------------------------------------

/// One slot of a trial table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot<E> {
  resident: Option<E>,
  displaced: u32,
}

impl<E> Slot<E>
where
  E: SlotKey,
{
  const VACANT: Self = Self {
    resident: None,
    displaced: 0,
  };

  /// Returns the element stored in this slot, if any.
  #[inline]
  pub const fn resident(&self) -> Option<E> {
    self.resident
  }

  /// Returns how many tail elements have this slot as their natural slot.
  #[inline]
  pub const fn displaced(&self) -> u32 {
    self.displaced
  }
}

// -----------------------------------------------------------------------------
// Packing
// -----------------------------------------------------------------------------

/// The outcome of packing a sequence of elements with one seed.
pub struct Packing<E, P>
where
  P: ?Sized,
{
  seed: Seed<P>,
  slots: Vec<Slot<E>>,
  tail: Vec<E>,
  residents: usize,
  conflicts: usize,
}

impl<E, P> Packing<E, P>
where
  E: SlotKey,
  P: Params + ?Sized,
{
  fn new(seed: Seed<P>, capacity: usize) -> Self {
    Self {
      seed,
      slots: vec![Slot::VACANT; seed.size()],
      tail: Vec::with_capacity(capacity),
      residents: 0,
      conflicts: 0,
    }
  }

  /// Places `element` at its natural slot, or appends it to the tail.
  fn place(&mut self, element: E) {
    if self.slots.is_empty() {
      self.tail.push(element);
      return;
    }

    let index: usize = slot_index(element.hash_code(), self.seed);
    let slot: &mut Slot<E> = &mut self.slots[index];

    match slot.resident {
      None => {
        slot.resident = Some(element);
        self.residents += 1;
      }
      Some(resident) => {
        debug_assert!(resident != element, "duplicate element in packing");

        if slot.displaced == 0 {
          self.conflicts += 1;
        }

        slot.displaced += 1;
        self.tail.push(element);
      }
    }
  }

  /// Returns the seed used for this packing.
  #[inline]
  pub const fn seed(&self) -> Seed<P> {
    self.seed
  }

  /// Returns the number of slots.
  #[inline]
  pub fn size(&self) -> usize {
    self.slots.len()
  }

  /// Returns the slot array.
  #[inline]
  pub fn slots(&self) -> &[Slot<E>] {
    &self.slots
  }

  /// Returns the overflow elements in insertion order.
  #[inline]
  pub fn tail(&self) -> &[E] {
    &self.tail
  }

  /// Returns the number of occupied slots.
  #[inline]
  pub const fn residents(&self) -> usize {
    self.residents
  }

  /// Returns the number of slots that are the natural slot of a tail element.
  #[inline]
  pub const fn conflicts(&self) -> usize {
    self.conflicts
  }

  /// Returns the number of vacant slots.
  #[inline]
  pub fn vacant(&self) -> usize {
    self.slots.len() - self.residents
  }

  /// Returns `true` if nothing overflowed to the tail.
  #[inline]
  pub fn is_perfect(&self) -> bool {
    self.tail.is_empty()
  }

  /// Returns `true` if every slot is occupied.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.residents == self.slots.len()
  }

  /// Returns the quality score of this packing.
  #[inline]
  pub fn score(&self) -> Score {
    Score::new(self.tail.len(), self.conflicts, self.vacant())
  }

  /// Returns the total number of packed elements.
  #[inline]
  pub fn len(&self) -> usize {
    self.residents + self.tail.len()
  }

  /// Returns `true` if no element was packed.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Decomposes the packing into its seed, slots, and tail.
  #[inline]
  pub fn into_parts(self) -> (Seed<P>, Vec<Slot<E>>, Vec<E>) {
    (self.seed, self.slots, self.tail)
  }
}

impl<E, P> Debug for Packing<E, P>
where
  E: SlotKey + Debug,
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Packing")
      .field("seed", &self.seed)
      .field("slots", &self.slots)
      .field("tail", &self.tail)
      .field("residents", &self.residents)
      .field("conflicts", &self.conflicts)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Packer
// -----------------------------------------------------------------------------

/// Packs `groups` in order against a single table described by `seed`.
///
/// Earlier groups get priority placement: every element of the first group
/// is placed before any element of the second is considered. The outcome is
/// fully determined by the seed and the element order.
///
/// ```
/// use sstab::{DefaultParams, Seed};
/// use sstab::hashing::pack;
///
/// let seed: Seed<DefaultParams> = Seed::compose(0x5EED_0000_0000_0000, 8);
/// let keys: [u32; 5] = [1, 2, 3, 4, 5];
///
/// let packing = pack(seed, &[&keys[..2], &keys[2..]]);
///
/// assert_eq!(packing.residents() + packing.tail().len(), keys.len());
/// ```
pub fn pack<E, P>(seed: Seed<P>, groups: &[&[E]]) -> Packing<E, P>
where
  E: SlotKey,
  P: Params + ?Sized,
{
  let total: usize = groups.iter().map(|group| group.len()).sum();
  let mut packing: Packing<E, P> = Packing::new(seed, total);

  for group in groups {
    for element in *group {
      packing.place(*element);
    }
  }

  packing
}

/// Like [`pack`], but gives up once the tail grows beyond `limit` elements.
///
/// Used by the search to abandon seeds that can no longer beat the best
/// packing found so far.
pub fn pack_bounded<E, P>(seed: Seed<P>, groups: &[&[E]], limit: usize) -> Option<Packing<E, P>>
where
  E: SlotKey,
  P: Params + ?Sized,
{
  let total: usize = groups.iter().map(|group| group.len()).sum();
  let mut packing: Packing<E, P> = Packing::new(seed, total.min(limit + 1));

  for group in groups {
    for element in *group {
      packing.place(*element);

      if packing.tail.len() > limit {
        return None;
      }
    }
  }

  Some(packing)
}
