//! Constant-time secondary supertype checks.
//!
//! `sstab` resolves "is `K` a supertype of `C`?" for the supertypes that do
//! not fit in a class's fixed-depth primary supers array: interfaces, and
//! superclasses beyond the depth limit. Each class gets a small, immutable
//! hash table of its secondary supertypes, laid out with a randomly searched
//! seed so that most lookups touch exactly one slot.
//!
//! # Overview
//!
//! Every [`Class`] carries a 32-bit hash code assigned at declaration by a
//! [`HashAllocator`]. When the class is linked, [`initialize_secondary_supers`]
//! tries a series of seeds and table sizes, keeps the packing with the fewest
//! overflow elements, and publishes it atomically. Queries through
//! [`search_secondary_supers`] are lock-free and may run concurrently with
//! publication; before the table is visible they fall back to scanning the
//! interface list.
//!
//! # Usage
//!
//! ```
//! use sstab::{Class, ClassRef, HashAllocator};
//!
//! let mut alloc: HashAllocator = HashAllocator::default();
//!
//! let object: ClassRef = Class::new_class("Object", None, &[], &mut alloc)?;
//! let auto: ClassRef = Class::new_interface("AutoCloseable", &[], &mut alloc)?;
//! let closeable: ClassRef = Class::new_interface("Closeable", &[auto.clone()], &mut alloc)?;
//! let stream: ClassRef = Class::new_class("Stream", Some(&object), &[closeable.clone()], &mut alloc)?;
//!
//! assert!(stream.search_secondary_supers(&auto));
//! assert!(stream.search_secondary_supers(&closeable));
//! assert!(stream.is_subtype_of(&object));
//! assert!(!object.is_subtype_of(&auto));
//! # Ok::<(), sstab::BuildError>(())
//! ```
//!
//! # Configuration
//!
//! Table sizing and search effort are configured at compile time through the
//! [`Params`] trait. The default configuration ([`DefaultParams`]) uses
//! power-of-two tables of up to [`Capacity::DEF`] slots:
//!
//! ```
//! use sstab::{Class, ClassRef, ConstParams, HashAllocator};
//!
//! type Params = ConstParams<1024>;
//!
//! let mut alloc: HashAllocator = HashAllocator::new(42);
//! let root: ClassRef<Params> = Class::new_class("Root", None, &[], &mut alloc)?;
//!
//! assert!(root.secondary_supers().is_some());
//! # Ok::<(), sstab::BuildError>(())
//! ```
//!
//! Other slot index strategies are selected with [`Sizing`]; [`LinearParams`]
//! disables the slot zones entirely.
//!
//! # Table Layout
//!
//! See the [`implementation`] module for the seed encoding, the packing
//! search, and the lookup algorithm.
//!
//! [`initialize_secondary_supers`]: crate::Class::initialize_secondary_supers
//! [`search_secondary_supers`]: crate::Class::search_secondary_supers
//! [`Capacity::DEF`]: crate::config::Capacity::DEF
//! [`DefaultParams`]: crate::config::DefaultParams
//! [`LinearParams`]: crate::config::LinearParams
//! [`Params`]: crate::config::Params
//! [`Sizing`]: crate::config::Sizing
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod builder;
mod class;
mod error;
mod hash;
mod index;
mod pack;
mod params;
mod publish;
mod search;
mod seed;
mod table;
mod utils;
mod verify;

#[cfg(test)]
mod tests;

pub(crate) use crate::utils::sync;

pub mod implementation {
  #![doc = include_str!("../IMPLEMENTATION.md")]
}

pub mod config {
  //! Configuration parameters which can be used to override the default table
  //! settings.

  pub use crate::params::Capacity;
  pub use crate::params::ConstParams;
  pub use crate::params::DebugParams;
  pub use crate::params::DefaultParams;
  pub use crate::params::LinearParams;
  pub use crate::params::Params;
  pub use crate::params::ParamsExt;
  pub use crate::params::Sizing;
}

pub mod hashing {
  //! The building blocks of table construction.
  //!
  //! Exposed for tooling and experiments. [`Class`] drives all of these
  //! internally; you do not need them to build or query tables.
  //!
  //! [`Class`]: crate::Class

  pub use crate::hash::SeedSource;
  pub use crate::hash::mix;
  pub use crate::hash::mix32;
  pub use crate::index::slot_index;
  pub use crate::pack::Packing;
  pub use crate::pack::Slot;
  pub use crate::pack::SlotKey;
  pub use crate::pack::pack;
  pub use crate::pack::pack_bounded;
  pub use crate::search::Score;
  pub use crate::search::initial_size;
  pub use crate::search::next_size;
  pub use crate::search::search;
}

#[doc(inline)]
pub use self::config::Capacity;

#[doc(inline)]
pub use self::config::ConstParams;

#[doc(inline)]
pub use self::config::DefaultParams;

#[doc(inline)]
pub use self::config::Params;

pub use self::class::Class;
pub use self::class::ClassId;
pub use self::class::ClassKind;
pub use self::class::ClassRef;
pub use self::error::BuildError;
pub use self::hash::HashAllocator;
pub use self::seed::Seed;
pub use self::table::Conflict;
pub use self::table::Entry;
pub use self::table::SecondarySupers;
pub use self::verify::Report;
