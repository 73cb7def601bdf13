//! Secondary supers table.
//!
//! A table is one flat array split into three zones:
//!
//! ```text
//! [ primary slots | secondary slots | tail ]
//!   seed1.size()    seed2.size()      unordered
//! ```
//!
//! Every primary slot carries a [`Conflict`] tag recording where elements
//! that lost that slot ended up. A lookup probes its natural primary slot and
//! only consults the secondary zone or the tail when the tag says an element
//! might be there, which keeps negative lookups short.

use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::ptr;

use bitflags::bitflags;

use crate::class::Class;
use crate::class::ClassRef;
use crate::index::slot_index;
use crate::params::DefaultParams;
use crate::params::Params;
use crate::seed::Seed;

// -----------------------------------------------------------------------------
// Conflict Tag
// -----------------------------------------------------------------------------

bitflags! {
  /// Conflict bits attached to a table slot.
  #[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
  pub struct Conflict: u8 {
    /// An element whose natural slot is this one lives in the secondary zone.
    const SECONDARY = 0b01;
    /// An element whose natural slot is this one lives in the tail.
    const TAIL = 0b10;
  }
}

// -----------------------------------------------------------------------------
// Entry
// -----------------------------------------------------------------------------

/// One cell of the table storage.
pub struct Entry<P = DefaultParams>
where
  P: Params + ?Sized,
{
  class: Option<ClassRef<P>>,
  tag: Conflict,
}

impl<P> Entry<P>
where
  P: Params + ?Sized,
{
  #[inline]
  pub(crate) const fn new(class: Option<ClassRef<P>>) -> Self {
    Self {
      class,
      tag: Conflict::empty(),
    }
  }

  #[inline]
  pub(crate) fn mark(&mut self, tag: Conflict) {
    self.tag |= tag;
  }

  /// Returns the class stored in this cell, if any.
  #[inline]
  pub fn class(&self) -> Option<&ClassRef<P>> {
    self.class.as_ref()
  }

  /// Returns the conflict tag of this cell.
  #[inline]
  pub const fn tag(&self) -> Conflict {
    self.tag
  }

  /// Returns `true` if this cell holds `class`.
  #[inline]
  pub fn holds(&self, class: &Class<P>) -> bool {
    self
      .class
      .as_deref()
      .is_some_and(|resident| ptr::eq(resident, class))
  }
}

impl<P> Debug for Entry<P>
where
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.class.as_deref() {
      Some(class) => write!(f, "{}({:?})", class.name(), self.tag),
      None => write!(f, "<empty>({:?})", self.tag),
    }
  }
}

// -----------------------------------------------------------------------------
// Secondary Supers
// -----------------------------------------------------------------------------

/// The finished, immutable lookup structure of one class.
///
/// Built once by [`Class::initialize_secondary_supers`] and never modified
/// afterwards. When the primary seed is empty the table degenerates to a plain
/// list held entirely in the tail.
pub struct SecondarySupers<P = DefaultParams>
where
  P: Params + ?Sized,
{
  primary: Seed<P>,
  secondary: Seed<P>,
  storage: Box<[Entry<P>]>,
}

impl<P> SecondarySupers<P>
where
  P: Params + ?Sized,
{
  #[inline]
  pub(crate) fn from_parts(primary: Seed<P>, secondary: Seed<P>, storage: Box<[Entry<P>]>) -> Self {
    debug_assert!(primary.size() + secondary.size() <= storage.len());
    debug_assert!(!primary.is_empty() || secondary.is_empty());

    Self {
      primary,
      secondary,
      storage,
    }
  }

  /// Returns the seed of the primary zone.
  #[inline]
  pub const fn primary_seed(&self) -> Seed<P> {
    self.primary
  }

  /// Returns the seed of the secondary zone.
  ///
  /// Empty unless a second level was built.
  #[inline]
  pub const fn secondary_seed(&self) -> Seed<P> {
    self.secondary
  }

  /// Returns the primary slot zone.
  #[inline]
  pub fn primary_zone(&self) -> &[Entry<P>] {
    &self.storage[..self.primary.size()]
  }

  /// Returns the secondary slot zone.
  #[inline]
  pub fn secondary_zone(&self) -> &[Entry<P>] {
    &self.storage[self.primary.size()..self.tail_offset()]
  }

  /// Returns the tail zone.
  #[inline]
  pub fn tail_zone(&self) -> &[Entry<P>] {
    &self.storage[self.tail_offset()..]
  }

  /// Returns the whole storage array.
  #[inline]
  pub fn storage(&self) -> &[Entry<P>] {
    &self.storage
  }

  /// Returns the number of stored classes.
  pub fn len(&self) -> usize {
    self.iter().count()
  }

  /// Returns `true` if no class is stored.
  pub fn is_empty(&self) -> bool {
    self.iter().next().is_none()
  }

  /// Returns an iterator over the stored classes in storage order.
  pub fn iter(&self) -> impl Iterator<Item = &ClassRef<P>> {
    self.storage.iter().filter_map(Entry::class)
  }

  /// Returns `true` if `class` is stored in this table.
  ///
  /// Probes the natural primary slot of `class` first. The secondary zone
  /// and the tail are only visited when the slot tag allows `class` to be
  /// there.
  #[inline]
  pub fn contains(&self, class: &Class<P>) -> bool {
    let size: usize = self.primary.size();

    if size == 0 {
      return self.contains_tail(class);
    }

    let hash: u32 = class.hash_code();
    let entry: &Entry<P> = &self.storage[slot_index(hash, self.primary)];

    if entry.class.is_none() {
      return false;
    }

    if entry.holds(class) {
      return true;
    }

    let tag: Conflict = entry.tag;

    if tag.is_empty() {
      return false;
    }

    if self.secondary.is_empty() {
      return tag.contains(Conflict::TAIL) && self.contains_tail(class);
    }

    let other: &Entry<P> = &self.storage[size + slot_index(hash, self.secondary)];

    if other.class.is_none() {
      return false;
    }

    if other.holds(class) {
      return true;
    }

    // A tail element lost both of its natural slots.
    tag.contains(Conflict::TAIL) && other.tag.contains(Conflict::TAIL) && self.contains_tail(class)
  }

  /// Returns `true` if `class` is stored anywhere in this table.
  ///
  /// Scans every cell; used to cross-check [`contains`].
  ///
  /// [`contains`]: Self::contains
  pub fn contains_linear(&self, class: &Class<P>) -> bool {
    self.storage.iter().any(|entry| entry.holds(class))
  }

  #[inline]
  fn contains_tail(&self, class: &Class<P>) -> bool {
    self.tail_zone().iter().any(|entry| entry.holds(class))
  }

  #[inline]
  fn tail_offset(&self) -> usize {
    self.primary.size() + self.secondary.size()
  }
}

impl<P> Debug for SecondarySupers<P>
where
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("SecondarySupers")
      .field("primary", &self.primary)
      .field("secondary", &self.secondary)
      .field("storage", &self.storage)
      .finish()
  }
}
