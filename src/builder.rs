//! Secondary supers table construction.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::class::Class;
use crate::class::ClassId;
use crate::class::ClassRef;
use crate::error::BuildError;
use crate::hash::SeedSource;
use crate::index::slot_index;
use crate::pack::Packing;
use crate::pack::Slot;
use crate::pack::SlotKey;
use crate::params::Params;
use crate::params::ParamsExt;
use crate::search::search;
use crate::seed::Seed;
use crate::table::Conflict;
use crate::table::Entry;
use crate::table::SecondarySupers;

/// A class as seen by the packer: its position in the candidate list and its
/// hash code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Candidate {
  index: usize,
  hash: u32,
}

impl SlotKey for Candidate {
  #[inline]
  fn hash_code(&self) -> u32 {
    self.hash
  }
}

/// The classes a table must hold, split into two priority groups.
pub(crate) struct Candidates<P>
where
  P: Params + ?Sized,
{
  classes: Vec<ClassRef<P>>,
  split: usize,
}

impl<P> Candidates<P>
where
  P: Params + ?Sized,
{
  /// Superclasses that overflowed the primary supers array.
  #[inline]
  pub(crate) fn primaries(&self) -> &[ClassRef<P>] {
    &self.classes[..self.split]
  }

  /// Every transitive interface.
  #[inline]
  pub(crate) fn secondaries(&self) -> &[ClassRef<P>] {
    &self.classes[self.split..]
  }

  #[inline]
  pub(crate) fn all(&self) -> &[ClassRef<P>] {
    &self.classes
  }
}

/// Collects the secondary supertypes of `class`.
///
/// Overflowed superclasses come first, nearest first, and skip anything
/// already listed as an interface.
pub(crate) fn secondary_candidates<P>(class: &Class<P>) -> Result<Candidates<P>, BuildError>
where
  P: Params + ?Sized,
{
  let interfaces: &[ClassRef<P>] = class.transitive_interfaces();

  let mut seen: FxHashSet<ClassId> = FxHashSet::default();
  let mut primaries: Vec<&ClassRef<P>> = Vec::new();

  seen.try_reserve(interfaces.len())?;
  seen.extend(interfaces.iter().map(|interface| interface.id()));

  for parent in class.overflow_supers() {
    if seen.insert(parent.id()) {
      primaries.try_reserve(1)?;
      primaries.push(parent);
    }
  }

  let mut classes: Vec<ClassRef<P>> = Vec::new();

  classes.try_reserve_exact(primaries.len() + interfaces.len())?;
  classes.extend(primaries.into_iter().cloned());
  classes.extend(interfaces.iter().cloned());

  Ok(Candidates {
    split: classes.len() - interfaces.len(),
    classes,
  })
}

/// Builds the secondary supers table of `class`.
///
/// Searches for a primary zone over all candidates, then, when enough
/// elements overflow and [`Params::SECOND_LEVEL`] is set, searches again for
/// a secondary zone over the overflow. Whatever remains becomes the tail.
pub(crate) fn build<P, S>(class: &Class<P>, seeds: &mut S) -> Result<SecondarySupers<P>, BuildError>
where
  P: Params + ?Sized,
  S: SeedSource + ?Sized,
{
  P::validate();

  let candidates: Candidates<P> = secondary_candidates(class)?;
  let mut keys: Vec<Candidate> = Vec::new();

  keys.try_reserve_exact(candidates.all().len())?;
  keys.extend(
    candidates
      .all()
      .iter()
      .enumerate()
      .map(|(index, class)| Candidate {
        index,
        hash: class.hash_code(),
      }),
  );

  let (primaries, secondaries): (&[Candidate], &[Candidate]) =
    keys.split_at(candidates.primaries().len());

  let first: Packing<Candidate, P> = search(&[primaries, secondaries], &mut *seeds);
  let (primary, primary_slots, overflow): (Seed<P>, Vec<Slot<Candidate>>, Vec<Candidate>) =
    first.into_parts();

  let (secondary, secondary_slots, tail): (Seed<P>, Vec<Slot<Candidate>>, Vec<Candidate>) =
    if P::SECOND_LEVEL && !primary.is_empty() && overflow.len() >= P::SECOND_LEVEL_MIN {
      let second: Packing<Candidate, P> = search(&[overflow.as_slice()], &mut *seeds);
      second.into_parts()
    } else {
      (Seed::EMPTY, Vec::new(), overflow)
    };

  tracing::trace!(
    class = %class.name(),
    candidates = keys.len(),
    primary = primary.size(),
    secondary = secondary.size(),
    tail = tail.len(),
    "packed secondary supers"
  );

  let layout: Layout<'_, P> = Layout {
    classes: candidates.all(),
    primary,
    secondary,
  };

  layout.materialize(&primary_slots, &secondary_slots, &tail)
}

// -----------------------------------------------------------------------------
// Materialization
// -----------------------------------------------------------------------------

struct Layout<'a, P>
where
  P: Params + ?Sized,
{
  classes: &'a [ClassRef<P>],
  primary: Seed<P>,
  secondary: Seed<P>,
}

impl<P> Layout<'_, P>
where
  P: Params + ?Sized,
{
  fn materialize(
    &self,
    primary_slots: &[Slot<Candidate>],
    secondary_slots: &[Slot<Candidate>],
    tail: &[Candidate],
  ) -> Result<SecondarySupers<P>, BuildError> {
    let offset: usize = self.primary.size();
    let length: usize = offset + self.secondary.size() + tail.len();

    let mut storage: Vec<Entry<P>> = Vec::new();

    storage.try_reserve_exact(length)?;

    for slot in primary_slots.iter().chain(secondary_slots) {
      storage.push(Entry::new(slot.resident().map(|key| self.resolve(key))));
    }

    for key in tail {
      storage.push(Entry::new(Some(self.resolve(*key))));
    }

    debug_assert_eq!(storage.len(), length);

    if !self.primary.is_empty() {
      for key in secondary_slots.iter().filter_map(Slot::resident) {
        storage[slot_index(key.hash, self.primary)].mark(Conflict::SECONDARY);
      }

      for key in tail {
        storage[slot_index(key.hash, self.primary)].mark(Conflict::TAIL);

        if !self.secondary.is_empty() {
          storage[offset + slot_index(key.hash, self.secondary)].mark(Conflict::TAIL);
        }
      }
    }

    Ok(SecondarySupers::from_parts(
      self.primary,
      self.secondary,
      storage.into_boxed_slice(),
    ))
  }

  #[inline]
  fn resolve(&self, key: Candidate) -> ClassRef<P> {
    Arc::clone(&self.classes[key.index])
  }
}
