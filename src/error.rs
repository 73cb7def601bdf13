use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised while declaring a class or building its supers table.
///
/// Internal consistency violations (such as initializing the same class
/// twice) are not represented here; they panic.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
  /// Storage for the table or one of its scratch lists could not be
  /// allocated.
  #[error("failed to allocate secondary supers storage")]
  Alloc(#[from] TryReserveError),

  /// The same interface appears twice in a local interface list.
  #[error("class `{class}` declares interface `{interface}` more than once")]
  DuplicateInterface {
    /// The class being declared.
    class: Box<str>,
    /// The repeated interface.
    interface: Box<str>,
  },

  /// A class appears in an interface list.
  #[error("class `{class}` lists `{name}` as an interface, but it is a class")]
  NotAnInterface {
    /// The class being declared.
    class: Box<str>,
    /// The offending entry.
    name: Box<str>,
  },

  /// An interface is used as a superclass.
  #[error("class `{class}` cannot extend `{name}`: it is an interface")]
  InterfaceSuperclass {
    /// The class being declared.
    class: Box<str>,
    /// The offending superclass.
    name: Box<str>,
  },
}
