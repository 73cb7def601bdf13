//! Table verification and diagnostic dumps.

use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::fmt::Write;

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::builder;
use crate::builder::Candidates;
use crate::class::Class;
use crate::error::BuildError;
use crate::index::slot_index;
use crate::params::Params;
use crate::seed::Seed;
use crate::table::Conflict;
use crate::table::Entry;
use crate::table::SecondarySupers;

// -----------------------------------------------------------------------------
// Report
// -----------------------------------------------------------------------------

/// Defect counts found by verifying a table.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub struct Report {
  /// Slot residents whose natural slot differs from their position.
  pub misplaced: usize,
  /// Overflow elements whose natural slot is vacant.
  pub placeable: usize,
  /// Overflow elements whose natural slot lacks the matching conflict tag.
  pub untagged: usize,
  /// Stored classes that a lookup fails to find.
  pub unreachable: usize,
  /// Classes stored more than once.
  pub duplicates: usize,
  /// Secondary supertypes absent from the table.
  pub missing: usize,
  /// Stored classes that are not secondary supertypes.
  pub unexpected: usize,
}

impl Report {
  /// Returns `true` if no defect was found.
  #[inline]
  pub fn is_ok(&self) -> bool {
    *self == Self::default()
  }
}

impl Display for Report {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(
      f,
      "misplaced={} placeable={} untagged={} unreachable={} duplicates={} missing={} unexpected={}",
      self.misplaced,
      self.placeable,
      self.untagged,
      self.unreachable,
      self.duplicates,
      self.missing,
      self.unexpected,
    )
  }
}

// -----------------------------------------------------------------------------
// Structural Checks
// -----------------------------------------------------------------------------

impl<P> SecondarySupers<P>
where
  P: Params + ?Sized,
{
  /// Checks the layout invariants of this table.
  ///
  /// Recomputes the natural slot of every stored class from the stored seeds
  /// and confirms that every overflow element genuinely lost its slots and is
  /// announced by the conflict tags on the way to it.
  pub fn verify(&self) -> Report {
    let mut report: Report = Report::default();
    let mut seen: FxHashSet<*const Class<P>> = FxHashSet::default();

    let primary: Seed<P> = self.primary_seed();
    let secondary: Seed<P> = self.secondary_seed();

    for (index, entry) in self.primary_zone().iter().enumerate() {
      if let Some(class) = entry.class()
        && slot_index(class.hash_code(), primary) != index
      {
        report.misplaced += 1;
      }
    }

    for (index, entry) in self.secondary_zone().iter().enumerate() {
      let Some(class) = entry.class() else {
        continue;
      };

      if slot_index(class.hash_code(), secondary) != index {
        report.misplaced += 1;
      }

      self.check_natural(class, primary, 0, Conflict::SECONDARY, &mut report);
    }

    for class in self.tail_zone().iter().filter_map(Entry::class) {
      if !primary.is_empty() {
        self.check_natural(class, primary, 0, Conflict::TAIL, &mut report);
      }

      if !secondary.is_empty() {
        let offset: usize = primary.size();
        self.check_natural(class, secondary, offset, Conflict::TAIL, &mut report);
      }
    }

    for class in self.iter() {
      if !seen.insert(Arc::as_ptr(class)) {
        report.duplicates += 1;
      }

      if !self.contains(class) {
        report.unreachable += 1;
      }
    }

    report
  }

  fn check_natural(
    &self,
    class: &Class<P>,
    seed: Seed<P>,
    offset: usize,
    tag: Conflict,
    report: &mut Report,
  ) {
    let entry: &Entry<P> = &self.storage()[offset + slot_index(class.hash_code(), seed)];

    match entry.class() {
      None => report.placeable += 1,
      Some(_) if !entry.tag().contains(tag) => report.untagged += 1,
      Some(_) => {}
    }
  }
}

// -----------------------------------------------------------------------------
// Class Diagnostics
// -----------------------------------------------------------------------------

impl<P> Class<P>
where
  P: Params + ?Sized,
{
  /// Verifies the published secondary supers table of this class.
  ///
  /// On top of the structural checks of [`SecondarySupers::verify`], compares
  /// the stored classes against the expected secondary supertypes. An
  /// unpublished table reports every expected supertype as missing.
  ///
  /// # Errors
  ///
  /// Returns [`BuildError::Alloc`] if the expected set cannot be allocated.
  pub fn verify(&self) -> Result<Report, BuildError> {
    let expected: Candidates<P> = builder::secondary_candidates(self)?;

    let Some(table) = self.secondary_supers() else {
      return Ok(Report {
        missing: expected.all().len(),
        ..Report::default()
      });
    };

    let mut report: Report = table.verify();
    let mut wanted: FxHashSet<*const Class<P>> = FxHashSet::default();

    wanted.try_reserve(expected.all().len())?;
    wanted.extend(expected.all().iter().map(Arc::as_ptr));

    report.missing = expected
      .primaries()
      .iter()
      .chain(expected.secondaries())
      .filter(|class| !table.contains_linear(class))
      .count();

    report.unexpected = table
      .iter()
      .filter(|class| !wanted.contains(&Arc::as_ptr(*class)))
      .count();

    Ok(report)
  }

  /// Verifies this class and writes the outcome to `out`.
  ///
  /// Returns `true` if the table is sound.
  ///
  /// # Errors
  ///
  /// Returns an error if writing to `out` fails.
  pub fn verify_on<W>(&self, out: &mut W) -> Result<bool, core::fmt::Error>
  where
    W: Write + ?Sized,
  {
    match self.verify() {
      Ok(report) => {
        let status: &str = if report.is_ok() { "ok" } else { "FAILED" };
        writeln!(out, "verify {}: {status} ({report})", self.name())?;
        Ok(report.is_ok())
      }
      Err(error) => {
        writeln!(out, "verify {}: {error}", self.name())?;
        Ok(false)
      }
    }
  }

  /// Writes a human-readable layout report of the secondary supers table.
  ///
  /// Prints a summary line per zone; with `verbose`, also every slot.
  ///
  /// # Errors
  ///
  /// Returns an error if writing to `out` fails.
  pub fn dump_on<W>(&self, out: &mut W, verbose: bool) -> Result<(), core::fmt::Error>
  where
    W: Write + ?Sized,
  {
    let Some(table) = self.secondary_supers() else {
      return writeln!(out, "--- {}: secondary supers not initialized ---", self.name());
    };

    writeln!(
      out,
      "--- {}: {} secondary supers, storage={} ---",
      self.name(),
      table.len(),
      table.storage().len(),
    )?;

    dump_zone(out, "primary", table.primary_seed(), table.primary_zone(), verbose)?;

    if !table.secondary_seed().is_empty() {
      dump_zone(out, "secondary", table.secondary_seed(), table.secondary_zone(), verbose)?;
    }

    writeln!(out, "tail size={}", table.tail_zone().len())?;

    if verbose {
      for (index, class) in table.tail_zone().iter().filter_map(Entry::class).enumerate() {
        writeln!(
          out,
          "  [{index:>4}] {:<24} hash={:#010x}",
          class.name(),
          class.hash_code(),
        )?;
      }
    }

    Ok(())
  }
}

fn dump_zone<W, P>(
  out: &mut W,
  label: &str,
  seed: Seed<P>,
  zone: &[Entry<P>],
  verbose: bool,
) -> Result<(), core::fmt::Error>
where
  W: Write + ?Sized,
  P: Params + ?Sized,
{
  let empty: usize = zone.iter().filter(|entry| entry.class().is_none()).count();
  let conflicts: usize = zone.iter().filter(|entry| !entry.tag().is_empty()).count();

  writeln!(
    out,
    "{label} seed={seed} size={} empty={empty} conflicts={conflicts}",
    zone.len(),
  )?;

  if !verbose {
    return Ok(());
  }

  for (index, entry) in zone.iter().enumerate() {
    match entry.class() {
      Some(class) => {
        let natural: usize = slot_index(class.hash_code(), seed);
        let marker: char = if natural == index { ' ' } else { '!' };

        writeln!(
          out,
          "{marker} [{index:>4}] {:<24} hash={:#010x} slot={natural:>4} {}",
          class.name(),
          class.hash_code(),
          tag_marker(entry.tag()),
        )?;
      }
      None => {
        writeln!(out, "  [{index:>4}] <empty> {}", tag_marker(entry.tag()))?;
      }
    }
  }

  Ok(())
}

fn tag_marker(tag: Conflict) -> &'static str {
  match (tag.contains(Conflict::SECONDARY), tag.contains(Conflict::TAIL)) {
    (false, false) => "",
    (true, false) => "[S]",
    (false, true) => "[T]",
    (true, true) => "[ST]",
  }
}

