use core::marker::PhantomData;

use crate::class::Class;
use crate::class::ClassRef;
use crate::error::BuildError;
use crate::hash::HashAllocator;
use crate::hash::SeedSource;
use crate::params::Capacity;
use crate::params::Params;
use crate::params::Sizing;

mod search;
mod seed;
mod verify;

// -----------------------------------------------------------------------------
// Test Params
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub(crate) struct PowerOfTwo<const N: usize>;

impl<const N: usize> Params for PowerOfTwo<N> {
  const MAX_TABLE_SIZE: Capacity = Capacity::new(N);
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Modulo<const N: usize>;

impl<const N: usize> Params for Modulo<N> {
  const SIZING: Sizing = Sizing::Modulo;
  const MAX_TABLE_SIZE: Capacity = Capacity::new(N);
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Reflect<const N: usize>;

impl<const N: usize> Params for Reflect<N> {
  const SIZING: Sizing = Sizing::Reflect;
  const MAX_TABLE_SIZE: Capacity = Capacity::new(N);
}

/// Two primary super levels, so short chains already overflow.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shallow;

impl Params for Shallow {
  const PRIMARY_SUPER_LIMIT: usize = 2;
}

/// Primary zone only.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SingleLevel;

impl Params for SingleLevel {
  const SECOND_LEVEL: bool = false;
}

/// `P` with every lookup cross-checked against a linear scan.
pub(crate) struct Checked<P> {
  marker: PhantomData<fn(P)>,
}

impl<P> Params for Checked<P>
where
  P: Params,
{
  const SIZING: Sizing = P::SIZING;
  const MAX_TABLE_SIZE: Capacity = P::MAX_TABLE_SIZE;
  const MIN_TABLE_SIZE: usize = P::MIN_TABLE_SIZE;
  const CHUNK_SIZE: usize = P::CHUNK_SIZE;
  const MAX_ATTEMPTS: usize = P::MAX_ATTEMPTS;
  const MAX_TOTAL_ATTEMPTS: usize = P::MAX_TOTAL_ATTEMPTS;
  const ALLOW_RESIZING: bool = P::ALLOW_RESIZING;
  const SECOND_LEVEL: bool = P::SECOND_LEVEL;
  const SECOND_LEVEL_MIN: usize = P::SECOND_LEVEL_MIN;
  const PRIMARY_SUPER_LIMIT: usize = P::PRIMARY_SUPER_LIMIT;
  const VERIFY_LOOKUPS: bool = true;
}

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

/// A seed source that never changes its mind.
pub(crate) struct FixedSeeds(pub(crate) u64);

impl SeedSource for FixedSeeds {
  fn next_seed(&mut self) -> u64 {
    self.0
  }
}

/// Declares `count` unrelated interfaces named `I1..=I{count}`.
pub(crate) fn interfaces<P>(count: usize, alloc: &mut HashAllocator) -> Vec<ClassRef<P>>
where
  P: Params + ?Sized,
{
  (1..=count)
    .map(|index| Class::new_interface(&format!("I{index}"), &[], alloc).unwrap())
    .collect()
}

/// Declares a linear class chain of `length` classes, root first.
pub(crate) fn chain<P>(length: usize, alloc: &mut HashAllocator) -> Vec<ClassRef<P>>
where
  P: Params + ?Sized,
{
  let mut output: Vec<ClassRef<P>> = Vec::with_capacity(length);

  for index in 0..length {
    let class: Result<ClassRef<P>, BuildError> =
      Class::new_class(&format!("C{index}"), output.last(), &[], alloc);

    output.push(class.unwrap());
  }

  output
}
