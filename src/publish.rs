//! Set-once publication cell.

use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::marker::PhantomData;
use core::ptr;

use crate::sync::atomic::AtomicPtr;
use crate::sync::atomic::Ordering::Acquire;
use crate::sync::atomic::Ordering::Release;

/// An atomic pointer that is written at most once.
///
/// Readers either observe nothing or a fully-initialized value; the single
/// release store in [`publish`] orders every write made while building the
/// value before it becomes visible. The value lives until the cell is
/// dropped, so references handed out by [`get`] stay valid for the lifetime
/// of the borrow of the cell.
///
/// [`get`]: Self::get
/// [`publish`]: Self::publish
pub(crate) struct Published<T> {
  inner: AtomicPtr<T>,
  phantom: PhantomData<Box<T>>,
}

impl<T> Published<T> {
  /// Creates an empty cell.
  #[inline]
  pub(crate) fn new() -> Self {
    Self {
      inner: AtomicPtr::new(ptr::null_mut()),
      phantom: PhantomData,
    }
  }

  /// Returns the published value, if any.
  #[inline]
  pub(crate) fn get(&self) -> Option<&T> {
    let pointer: *mut T = self.inner.load(Acquire);

    // SAFETY:
    // - `pointer` is either null or was created by `Box::into_raw` in
    //   `publish` and fully initialized before the release store.
    // - The allocation is only freed in `Drop`, which requires `&mut self`,
    //   so it outlives the returned borrow.
    // - Only shared references to `T` are created after publication.
    unsafe { pointer.as_ref() }
  }

  /// Returns `true` if a value has been published.
  #[inline]
  pub(crate) fn is_published(&self) -> bool {
    !self.inner.load(Acquire).is_null()
  }

  /// Publishes `value`.
  ///
  /// Returns the value back if the cell was already set.
  #[inline]
  pub(crate) fn publish(&self, value: Box<T>) -> Result<(), Box<T>> {
    let pointer: *mut T = Box::into_raw(value);

    match self
      .inner
      .compare_exchange(ptr::null_mut(), pointer, Release, Acquire)
    {
      Ok(_) => Ok(()),
      // SAFETY: `pointer` came from `Box::into_raw` above and was never
      // shared because the exchange failed.
      Err(_) => Err(unsafe { Box::from_raw(pointer) }),
    }
  }
}

impl<T> Drop for Published<T> {
  fn drop(&mut self) {
    let pointer: *mut T = self.inner.load(Acquire);

    if !pointer.is_null() {
      // SAFETY:
      // - `pointer` originated from `Box::into_raw` in `publish`.
      // - `&mut self` guarantees no outstanding borrows from `get`.
      // - The pointer is dropped exactly once, here.
      drop(unsafe { Box::from_raw(pointer) });
    }
  }
}

impl<T> Default for Published<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Debug for Published<T>
where
  T: Debug,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.get() {
      Some(value) => f.debug_tuple("Published").field(value).finish(),
      None => f.write_str("Published(<unset>)"),
    }
  }
}

// SAFETY: The cell owns a `Box<T>`; moving it between threads moves the box.
unsafe impl<T> Send for Published<T> where T: Send {}

// SAFETY: Shared access only hands out `&T` after an acquire load.
unsafe impl<T> Sync for Published<T> where T: Send + Sync {}
