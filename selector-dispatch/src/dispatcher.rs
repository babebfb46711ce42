//! # Dispatcher
//!
//! Routes a tuple of selector values plus trailing arguments to the behavior
//! specialized for that tuple.
//!
//! ```text
//! Uninitialized ──first call──▶ Built ──▶ Ready (every later call)
//! ```
//!
//! The table is built on first use and kept for the dispatcher's lifetime.
//! Put it in a `static` to share it across the process. Trailing arguments
//! may borrow from the caller:
//!
//! ```
//! use selector_dispatch::{selector_enum, Combination, Dispatcher, Family};
//!
//! selector_enum! {
//!     pub enum Mode { Fast, Exact }
//! }
//!
//! struct Scale;
//!
//! impl Family for Scale {
//!     type Args<'a> = (&'a mut [f64],);
//!     type Output = f64;
//!
//!     fn invoke<C: Combination>((buf,): Self::Args<'_>) -> f64 {
//!         let factor = match C::value::<Mode>(0) {
//!             Some(Mode::Fast) => 2.0,
//!             _ => 3.0,
//!         };
//!         buf.iter_mut().for_each(|x| *x *= factor);
//!         buf.iter().sum()
//!     }
//! }
//!
//! static SCALE: Dispatcher<(Mode,), Scale> = Dispatcher::new();
//!
//! let mut samples = [0.5, 1.0];
//! assert_eq!(SCALE.call((Mode::Exact,), (&mut samples[..],)), 4.5);
//! assert_eq!(samples, [1.5, 3.0]);
//! ```
//!
//! ## Concurrency
//!
//! The first call builds the table under a mutex and publishes it through a
//! [`OnceLock`]. Concurrent first callers wait for that single build and
//! never see a partial table. After publication every call is a lock-free
//! read followed by K index operations.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use parking_lot::{const_mutex, Mutex};

use crate::error::DispatchResult;
use crate::family::Family;
use crate::table::{Domains, Table};

/// Lazily built, shared dispatch over domains `D` for family `F`.
pub struct Dispatcher<D: Domains, F: Family> {
    table: OnceLock<Table<D, F>>,
    /// Serializes construction so the builder runs at most once.
    init: Mutex<()>,
    builds: AtomicUsize,
    _family: PhantomData<fn() -> F>,
}

impl<D: Domains, F: Family> Dispatcher<D, F> {
    /// Create an uninitialized dispatcher. No table is built yet.
    pub const fn new() -> Self {
        Self {
            table: OnceLock::new(),
            init: const_mutex(()),
            builds: AtomicUsize::new(0),
            _family: PhantomData,
        }
    }

    /// Invoke the behavior for `selectors` with `args`.
    ///
    /// Out-of-range selectors dispatch to their domain's last value.
    ///
    /// # Panics
    ///
    /// Panics if a domain is malformed (see [`Dispatcher::try_table`]).
    /// Panics raised by the behavior propagate unchanged.
    #[inline]
    pub fn call(&self, selectors: D::Selectors, args: F::Args<'_>) -> F::Output {
        self.call_ordinals(D::ordinals(selectors), args)
    }

    /// Like [`Dispatcher::call`], taking raw ordinals.
    #[inline]
    pub fn call_ordinals(&self, ordinals: D::Ordinals, args: F::Args<'_>) -> F::Output {
        let leaf = self.table().lookup(ordinals);
        leaf(args)
    }

    /// Strict variant of [`Dispatcher::call`]: out-of-range selectors are
    /// rejected instead of clamped.
    pub fn try_call(
        &self,
        selectors: D::Selectors,
        args: F::Args<'_>,
    ) -> DispatchResult<F::Output> {
        self.try_call_ordinals(D::ordinals(selectors), args)
    }

    /// Strict variant of [`Dispatcher::call_ordinals`].
    pub fn try_call_ordinals(
        &self,
        ordinals: D::Ordinals,
        args: F::Args<'_>,
    ) -> DispatchResult<F::Output> {
        let leaf = self.try_table()?.try_lookup(ordinals)?;
        Ok(leaf(args))
    }

    /// The table, building it on first use.
    ///
    /// # Panics
    ///
    /// Panics if a domain is malformed.
    pub fn table(&self) -> &Table<D, F> {
        match self.try_table() {
            Ok(table) => table,
            Err(err) => panic!("cannot build dispatch table: {err}"),
        }
    }

    /// The table, building it on first use.
    ///
    /// A failed build leaves the dispatcher uninitialized; the next call
    /// tries again.
    pub fn try_table(&self) -> DispatchResult<&Table<D, F>> {
        match self.table.get() {
            Some(table) => Ok(table),
            None => self.build_slow(),
        }
    }

    // The build is fallible and `OnceLock::get_or_try_init` is unstable, so
    // the mutex keeps concurrent first callers from building twice.
    #[cold]
    fn build_slow(&self) -> DispatchResult<&Table<D, F>> {
        let _guard = self.init.lock();
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = Table::build()?;
        self.builds.fetch_add(1, Ordering::Relaxed);
        Ok(self.table.get_or_init(|| table))
    }

    /// Whether the table has been built.
    pub fn is_built(&self) -> bool {
        self.table.get().is_some()
    }

    /// Number of successful table builds. At most 1.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl<D: Domains, F: Family> Default for Dispatcher<D, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Domains, F: Family> fmt::Debug for Dispatcher<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table.get())
            .field("builds", &self.builds())
            .finish()
    }
}
