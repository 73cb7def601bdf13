//! A minimal class hierarchy model.
//!
//! Just enough of a class descriptor to drive the secondary supers table: an
//! identity, a hash code, a superclass chain with a fixed-depth primary supers
//! array, and a transitive interface list.

use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::iter;
use core::ptr;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::builder;
use crate::error::BuildError;
use crate::hash::HashAllocator;
use crate::hash::SeedSource;
use crate::params::DefaultParams;
use crate::params::Params;
use crate::publish::Published;
use crate::table::SecondarySupers;

/// A shared reference to a [`Class`].
pub type ClassRef<P = DefaultParams> = Arc<Class<P>>;

// -----------------------------------------------------------------------------
// Class Id
// -----------------------------------------------------------------------------

/// A unique class identity handed out by a [`HashAllocator`].
///
/// Identities are only comparable between classes created by the same
/// allocator.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClassId {
  bits: u64,
}

impl ClassId {
  /// Creates an identity from its raw bit representation.
  #[inline]
  pub const fn from_bits(bits: u64) -> Self {
    Self { bits }
  }

  /// Returns the raw bit representation of this identity.
  #[inline]
  pub const fn into_bits(self) -> u64 {
    self.bits
  }
}

impl Debug for ClassId {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Debug::fmt(&self.bits, f)
  }
}

impl Display for ClassId {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(&self.bits, f)
  }
}

// -----------------------------------------------------------------------------
// Class Kind
// -----------------------------------------------------------------------------

/// Whether a descriptor is a class or an interface.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ClassKind {
  /// A class with at most one superclass.
  Class,
  /// An interface; never a primary supertype.
  Interface,
}

// -----------------------------------------------------------------------------
// Class
// -----------------------------------------------------------------------------

/// A class or interface descriptor.
///
/// Classes are declared bottom-up: a superclass and every listed interface
/// must exist before the class that names them. Declaration assigns the
/// identity and hash code and lays out the primary supers array; the
/// secondary supers table is built separately by
/// [`initialize_secondary_supers`] and published atomically, so readers on
/// other threads never observe a partially built table.
///
/// # Examples
///
/// ```
/// use sstab::{Class, ClassRef, HashAllocator};
///
/// let mut alloc: HashAllocator = HashAllocator::default();
///
/// let object: ClassRef = Class::new_class("Object", None, &[], &mut alloc)?;
/// let runnable: ClassRef = Class::new_interface("Runnable", &[], &mut alloc)?;
/// let thread: ClassRef = Class::new_class("Thread", Some(&object), &[runnable.clone()], &mut alloc)?;
///
/// assert!(thread.is_subtype_of(&object));
/// assert!(thread.search_secondary_supers(&runnable));
/// assert!(!object.is_subtype_of(&runnable));
/// # Ok::<(), sstab::BuildError>(())
/// ```
///
/// [`initialize_secondary_supers`]: Self::initialize_secondary_supers
pub struct Class<P = DefaultParams>
where
  P: Params + ?Sized,
{
  id: ClassId,
  name: Box<str>,
  kind: ClassKind,
  hash_code: u32,
  depth: usize,
  parent: Option<ClassRef<P>>,
  primary_supers: Box<[ClassId]>,
  local_interfaces: Box<[ClassRef<P>]>,
  transitive_interfaces: Box<[ClassRef<P>]>,
  secondary_supers: Published<SecondarySupers<P>>,
}

impl<P> Class<P>
where
  P: Params + ?Sized,
{
  /// Declares a class without building its secondary supers table.
  ///
  /// `interfaces` lists the interfaces the class implements directly; the
  /// transitive interface list is derived from them and from the superclass.
  ///
  /// # Errors
  ///
  /// Returns an error if `super_class` is an interface, if `interfaces`
  /// contains a class or repeats an entry, or if allocation fails.
  pub fn declare_class(
    name: &str,
    super_class: Option<&ClassRef<P>>,
    interfaces: &[ClassRef<P>],
    alloc: &mut HashAllocator,
  ) -> Result<ClassRef<P>, BuildError> {
    if let Some(parent) = super_class
      && parent.is_interface()
    {
      return Err(BuildError::InterfaceSuperclass {
        class: name.into(),
        name: parent.name.clone(),
      });
    }

    check_interfaces(name, interfaces)?;

    let id: ClassId = alloc.next_id();
    let depth: usize = super_class.map_or(0, |parent| parent.depth + 1);

    let mut primary_supers: Vec<ClassId> = Vec::new();

    if let Some(parent) = super_class {
      primary_supers.try_reserve_exact(parent.primary_supers.len() + 1)?;
      primary_supers.extend_from_slice(&parent.primary_supers);
    }

    if depth < P::PRIMARY_SUPER_LIMIT {
      primary_supers.try_reserve_exact(1)?;
      primary_supers.push(id);
    }

    let inherited: &[ClassRef<P>] = match super_class {
      Some(parent) => &parent.transitive_interfaces,
      None => &[],
    };
    let transitive_interfaces: Vec<ClassRef<P>> = transitive_union(inherited, interfaces)?;

    Ok(Arc::new(Self {
      id,
      name: name.into(),
      kind: ClassKind::Class,
      hash_code: alloc.next_hash_code(),
      depth,
      parent: super_class.cloned(),
      primary_supers: primary_supers.into_boxed_slice(),
      local_interfaces: interfaces.into(),
      transitive_interfaces: transitive_interfaces.into_boxed_slice(),
      secondary_supers: Published::new(),
    }))
  }

  /// Declares an interface without building its secondary supers table.
  ///
  /// # Errors
  ///
  /// Returns an error if `super_interfaces` contains a class or repeats an
  /// entry, or if allocation fails.
  pub fn declare_interface(
    name: &str,
    super_interfaces: &[ClassRef<P>],
    alloc: &mut HashAllocator,
  ) -> Result<ClassRef<P>, BuildError> {
    check_interfaces(name, super_interfaces)?;

    let transitive_interfaces: Vec<ClassRef<P>> = transitive_union(&[], super_interfaces)?;

    Ok(Arc::new(Self {
      id: alloc.next_id(),
      name: name.into(),
      kind: ClassKind::Interface,
      hash_code: alloc.next_hash_code(),
      depth: 0,
      parent: None,
      primary_supers: Box::new([]),
      local_interfaces: super_interfaces.into(),
      transitive_interfaces: transitive_interfaces.into_boxed_slice(),
      secondary_supers: Published::new(),
    }))
  }

  /// Declares and initializes a class with no superclass and no interfaces.
  ///
  /// # Errors
  ///
  /// Returns an error if allocation fails.
  pub fn root(name: &str, alloc: &mut HashAllocator) -> Result<ClassRef<P>, BuildError> {
    Self::new_class(name, None, &[], alloc)
  }

  /// Declares a class and builds its secondary supers table.
  ///
  /// # Errors
  ///
  /// See [`declare_class`](Self::declare_class).
  pub fn new_class(
    name: &str,
    super_class: Option<&ClassRef<P>>,
    interfaces: &[ClassRef<P>],
    alloc: &mut HashAllocator,
  ) -> Result<ClassRef<P>, BuildError> {
    let this: ClassRef<P> = Self::declare_class(name, super_class, interfaces, alloc)?;
    this.initialize_secondary_supers(alloc)?;
    Ok(this)
  }

  /// Declares an interface and builds its secondary supers table.
  ///
  /// # Errors
  ///
  /// See [`declare_interface`](Self::declare_interface).
  pub fn new_interface(
    name: &str,
    super_interfaces: &[ClassRef<P>],
    alloc: &mut HashAllocator,
  ) -> Result<ClassRef<P>, BuildError> {
    let this: ClassRef<P> = Self::declare_interface(name, super_interfaces, alloc)?;
    this.initialize_secondary_supers(alloc)?;
    Ok(this)
  }

  /// Builds and publishes the secondary supers table.
  ///
  /// Seeds for the table search are drawn from `seeds`. Concurrent readers
  /// keep using the linear fallback until the table is published.
  ///
  /// # Errors
  ///
  /// Returns [`BuildError::Alloc`] if the table storage cannot be allocated.
  ///
  /// # Panics
  ///
  /// Panics if the table was already initialized.
  pub fn initialize_secondary_supers<S>(&self, seeds: &mut S) -> Result<(), BuildError>
  where
    S: SeedSource + ?Sized,
  {
    assert!(
      !self.secondary_supers.is_published(),
      "secondary supers of `{}` initialized twice",
      self.name,
    );

    let table: SecondarySupers<P> = builder::build(self, seeds)?;

    debug_assert!(
      table.verify().is_ok(),
      "corrupt secondary supers for `{}`: {}",
      self.name,
      table.verify(),
    );

    tracing::debug!(
      class = %self.name,
      primary = table.primary_seed().size(),
      secondary = table.secondary_seed().size(),
      tail = table.tail_zone().len(),
      "publishing secondary supers"
    );

    assert!(
      self.secondary_supers.publish(Box::new(table)).is_ok(),
      "secondary supers of `{}` published concurrently",
      self.name,
    );

    Ok(())
  }

  /// Returns the identity of this class.
  #[inline]
  pub const fn id(&self) -> ClassId {
    self.id
  }

  /// Returns the name of this class.
  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Returns whether this is a class or an interface.
  #[inline]
  pub const fn kind(&self) -> ClassKind {
    self.kind
  }

  /// Returns `true` if this is an interface.
  #[inline]
  pub const fn is_interface(&self) -> bool {
    matches!(self.kind, ClassKind::Interface)
  }

  /// Returns the hash code assigned at declaration.
  #[inline]
  pub const fn hash_code(&self) -> u32 {
    self.hash_code
  }

  /// Returns the length of the superclass chain above this class.
  #[inline]
  pub const fn depth(&self) -> usize {
    self.depth
  }

  /// Returns the direct superclass.
  #[inline]
  pub fn super_class(&self) -> Option<&ClassRef<P>> {
    self.parent.as_ref()
  }

  /// Returns the superclass chain, nearest first.
  pub fn supers(&self) -> impl Iterator<Item = &ClassRef<P>> {
    iter::successors(self.parent.as_ref(), |class| class.parent.as_ref())
  }

  /// Returns the directly declared interfaces.
  #[inline]
  pub fn local_interfaces(&self) -> &[ClassRef<P>] {
    &self.local_interfaces
  }

  /// Returns every interface implemented directly or indirectly.
  #[inline]
  pub fn transitive_interfaces(&self) -> &[ClassRef<P>] {
    &self.transitive_interfaces
  }

  /// Returns the primary supers array, root first.
  ///
  /// Includes this class itself when it is a primary supertype.
  #[inline]
  pub fn primary_supers(&self) -> &[ClassId] {
    &self.primary_supers
  }

  /// Returns the primary supertype at `depth`, if any.
  #[inline]
  pub fn primary_super_of_depth(&self, depth: usize) -> Option<ClassId> {
    self.primary_supers.get(depth).copied()
  }

  /// Returns `true` if this class fits in the primary supers array of its
  /// subclasses.
  #[inline]
  pub const fn can_be_primary_super(&self) -> bool {
    matches!(self.kind, ClassKind::Class) && self.depth < P::PRIMARY_SUPER_LIMIT
  }

  /// Returns the published secondary supers table, if any.
  #[inline]
  pub fn secondary_supers(&self) -> Option<&SecondarySupers<P>> {
    self.secondary_supers.get()
  }

  /// Returns `true` if `other` is this class or one of its superclasses.
  pub fn is_subclass_of(&self, other: &Self) -> bool {
    ptr::eq(self, other) || self.supers().any(|class| ptr::eq(Arc::as_ptr(class), other))
  }

  /// Returns `true` if `other` is a supertype of this class.
  ///
  /// Resolves primary supertypes through the primary supers array and every
  /// other supertype through [`search_secondary_supers`].
  ///
  /// [`search_secondary_supers`]: Self::search_secondary_supers
  pub fn is_subtype_of(&self, other: &Self) -> bool {
    if ptr::eq(self, other) {
      return true;
    }

    if other.can_be_primary_super() {
      return self.primary_super_of_depth(other.depth) == Some(other.id);
    }

    self.search_secondary_supers(other)
  }

  /// Returns `true` if `other` is this class or one of its secondary
  /// supertypes.
  ///
  /// Lock-free; safe to call concurrently with
  /// [`initialize_secondary_supers`]. Before the table is published the
  /// superclass chain and interface list are scanned instead.
  ///
  /// # Panics
  ///
  /// With [`Params::VERIFY_LOOKUPS`] set, panics if the table and a linear
  /// scan of its entries disagree.
  ///
  /// [`initialize_secondary_supers`]: Self::initialize_secondary_supers
  #[inline]
  pub fn search_secondary_supers(&self, other: &Self) -> bool {
    // A class is never stored in its own table.
    if ptr::eq(self, other) {
      return true;
    }

    match self.secondary_supers.get() {
      Some(table) => {
        let found: bool = table.contains(other);

        if P::VERIFY_LOOKUPS {
          assert_eq!(
            found,
            table.contains_linear(other),
            "secondary supers of `{}` disagree with a linear scan for `{}`",
            self.name,
            other.name,
          );
        }

        found
      }
      None => self.search_secondary_supers_linear(other),
    }
  }

  /// Scans the overflowed superclasses and the interface list for `other`.
  #[cold]
  pub fn search_secondary_supers_linear(&self, other: &Self) -> bool {
    self
      .overflow_supers()
      .chain(self.transitive_interfaces.iter())
      .any(|class| ptr::eq(Arc::as_ptr(class), other))
  }

  /// Returns the superclasses that do not fit in the primary supers array.
  pub(crate) fn overflow_supers(&self) -> impl Iterator<Item = &ClassRef<P>> {
    self.supers().take_while(|class| !class.can_be_primary_super())
  }
}

impl<P> Debug for Class<P>
where
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Class")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("kind", &self.kind)
      .field("hash_code", &format_args!("{:#010x}", self.hash_code))
      .field("depth", &self.depth)
      .finish_non_exhaustive()
  }
}

impl<P> Display for Class<P>
where
  P: Params + ?Sized,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str(&self.name)
  }
}

// -----------------------------------------------------------------------------
// Misc. Utilities
// -----------------------------------------------------------------------------

fn check_interfaces<P>(class: &str, interfaces: &[ClassRef<P>]) -> Result<(), BuildError>
where
  P: Params + ?Sized,
{
  let mut seen: FxHashSet<ClassId> = FxHashSet::default();

  seen.try_reserve(interfaces.len())?;

  for interface in interfaces {
    if !interface.is_interface() {
      return Err(BuildError::NotAnInterface {
        class: class.into(),
        name: interface.name.clone(),
      });
    }

    if !seen.insert(interface.id) {
      return Err(BuildError::DuplicateInterface {
        class: class.into(),
        interface: interface.name.clone(),
      });
    }
  }

  Ok(())
}

/// Appends `local` and everything they extend to `inherited`, without
/// duplicates. Each interface follows its own super-interfaces.
fn transitive_union<P>(
  inherited: &[ClassRef<P>],
  local: &[ClassRef<P>],
) -> Result<Vec<ClassRef<P>>, BuildError>
where
  P: Params + ?Sized,
{
  let upper: usize = local
    .iter()
    .map(|interface| interface.transitive_interfaces.len() + 1)
    .sum::<usize>()
    + inherited.len();

  let mut output: Vec<ClassRef<P>> = Vec::new();
  let mut seen: FxHashSet<ClassId> = FxHashSet::default();

  output.try_reserve(upper)?;
  seen.try_reserve(upper)?;

  let expanded = local.iter().flat_map(|interface| {
    interface
      .transitive_interfaces
      .iter()
      .chain(iter::once(interface))
  });

  for interface in inherited.iter().chain(expanded) {
    if seen.insert(interface.id) {
      output.push(Arc::clone(interface));
    }
  }

  Ok(output)
}
