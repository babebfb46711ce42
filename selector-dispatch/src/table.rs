//! # Dispatch Tables
//!
//! A dispatch table maps every combination of K selector values to the
//! behavior specialized for it. It is a K-level nested array: level `i` has
//! one slot per value of dimension `i`, and the innermost slots hold plain
//! function pointers.
//!
//! ```text
//! (Precision, Layout)          Precision = 3 values, Layout = 2 values
//!
//! root ─┬─ [Half]   ─┬─ [RowMajor]    → thunk<(Half, RowMajor)>
//!       │            └─ [ColumnMajor] → thunk<(Half, ColumnMajor)>
//!       ├─ [Single] ─┬─ [RowMajor]    → thunk<(Single, RowMajor)>
//!       │            └─ [ColumnMajor] → thunk<(Single, ColumnMajor)>
//!       └─ [Double] ─┬─ [RowMajor]    → thunk<(Double, RowMajor)>
//!                    └─ [ColumnMajor] → thunk<(Double, ColumnMajor)>
//! ```
//!
//! ## Construction
//!
//! The shape is derived from a type-level list of domains ([`Nil`] /
//! [`Cons`]). Building recurses one dimension at a time: each domain visits
//! its values as type-level markers, the visited value is appended to the
//! bound [`Combination`], and the last level stores `thunk::<F, C>()`.
//! Every thunk is therefore a distinct monomorphized function. No behavior
//! runs during construction.
//!
//! ## Lookup
//!
//! A lookup performs exactly K index operations. Each ordinal is clamped to
//! its dimension's last valid value first, so an out-of-range selector
//! dispatches to the last-defined case. [`Table::try_lookup`] is the strict
//! variant that reports [`DispatchError::OutOfRange`] instead.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::combination::{Combination, Root, Then};
use crate::domain::{clamp, Selector, Value, Visitor};
use crate::error::{DispatchError, DispatchResult};
use crate::family::{thunk, Family, Leaf};

/// End of a type-level domain list.
pub struct Nil;

/// Type-level domain list with head `D`.
pub struct Cons<D, Rest>(PhantomData<fn() -> (D, Rest)>);

/// A type-level list of selector domains, outermost first.
///
/// The nested table type is computed from the list: [`Nil`] is a [`Leaf`],
/// [`Cons`] is a boxed slice of its tail's table.
pub trait DomainList: 'static {
    /// Number of dimensions.
    const DEPTH: usize;
    /// Number of leaf thunks, the product of all domain sizes.
    const CELLS: usize;

    type Table<F: Family>: Send + Sync + 'static;

    /// Build the table for this list with `P` already bound.
    #[doc(hidden)]
    fn build_level<P: Combination, F: Family>() -> DispatchResult<Self::Table<F>>;

    /// Clamping walk. `ordinals` holds at least `DEPTH` entries.
    #[doc(hidden)]
    fn walk<F: Family>(table: &Self::Table<F>, ordinals: &[usize]) -> Leaf<F>;

    /// Strict walk. `dimension` is the index of this list's head.
    #[doc(hidden)]
    fn try_walk<F: Family>(
        table: &Self::Table<F>,
        ordinals: &[usize],
        dimension: usize,
    ) -> DispatchResult<Leaf<F>>;

    #[doc(hidden)]
    fn shape(out: &mut Vec<usize>);

    #[doc(hidden)]
    fn names(out: &mut Vec<&'static str>);
}

impl DomainList for Nil {
    const DEPTH: usize = 0;
    const CELLS: usize = 1;

    type Table<F: Family> = Leaf<F>;

    fn build_level<P: Combination, F: Family>() -> DispatchResult<Leaf<F>> {
        Ok(thunk::<F, P>())
    }

    #[inline(always)]
    fn walk<F: Family>(table: &Leaf<F>, _ordinals: &[usize]) -> Leaf<F> {
        *table
    }

    fn try_walk<F: Family>(
        table: &Leaf<F>,
        _ordinals: &[usize],
        _dimension: usize,
    ) -> DispatchResult<Leaf<F>> {
        Ok(*table)
    }

    fn shape(_out: &mut Vec<usize>) {}

    fn names(_out: &mut Vec<&'static str>) {}
}

impl<D: Selector, Rest: DomainList> DomainList for Cons<D, Rest> {
    const DEPTH: usize = Rest::DEPTH + 1;
    const CELLS: usize = D::END * Rest::CELLS;

    type Table<F: Family> = Box<[Rest::Table<F>]>;

    fn build_level<P: Combination, F: Family>() -> DispatchResult<Self::Table<F>> {
        const { assert!(D::END > 0, "selector domain must have at least one value") };

        let mut level = Level::<P, Rest, F> {
            slots: Vec::with_capacity(D::size()),
            error: None,
            _marker: PhantomData,
        };
        D::visit(&mut level);

        if let Some(err) = level.error {
            return Err(err);
        }
        if level.slots.len() != D::size() {
            return Err(malformed::<D>(format!(
                "visited {} values, END is {}",
                level.slots.len(),
                D::END
            )));
        }
        Ok(level.slots.into_boxed_slice())
    }

    #[inline(always)]
    fn walk<F: Family>(table: &Self::Table<F>, ordinals: &[usize]) -> Leaf<F> {
        let index = clamp(ordinals[0], D::size());
        Rest::walk::<F>(&table[index], &ordinals[1..])
    }

    fn try_walk<F: Family>(
        table: &Self::Table<F>,
        ordinals: &[usize],
        dimension: usize,
    ) -> DispatchResult<Leaf<F>> {
        let ordinal = ordinals[0];
        if ordinal >= D::size() {
            return Err(DispatchError::OutOfRange {
                dimension,
                domain: type_name::<D>(),
                ordinal,
                end: D::END,
            });
        }
        Rest::try_walk::<F>(&table[ordinal], &ordinals[1..], dimension + 1)
    }

    fn shape(out: &mut Vec<usize>) {
        out.push(D::size());
        Rest::shape(out);
    }

    fn names(out: &mut Vec<&'static str>) {
        out.push(type_name::<D>());
        Rest::names(out);
    }
}

/// Collects the slots of one level while its domain visits its values.
struct Level<P, Rest: DomainList, F: Family> {
    slots: Vec<Rest::Table<F>>,
    error: Option<DispatchError>,
    _marker: PhantomData<fn() -> (P, F)>,
}

impl<D, P, Rest, F> Visitor<D> for Level<P, Rest, F>
where
    D: Selector,
    P: Combination,
    Rest: DomainList,
    F: Family,
{
    fn visit<V: Value<Domain = D>>(&mut self) {
        if self.error.is_some() {
            return;
        }
        if V::ORDINAL != self.slots.len() {
            self.error = Some(malformed::<D>(format!(
                "value with ordinal {} visited at position {}",
                V::ORDINAL,
                self.slots.len()
            )));
            return;
        }
        match Rest::build_level::<Then<P, V>, F>() {
            Ok(slot) => self.slots.push(slot),
            Err(err) => self.error = Some(err),
        }
    }
}

fn malformed<D>(reason: String) -> DispatchError {
    DispatchError::MalformedDomain {
        domain: type_name::<D>(),
        reason,
    }
}

/// An ordered set of selector domains, written as a tuple.
///
/// Implemented for tuples of one to six [`Selector`] types.
pub trait Domains: 'static {
    /// The equivalent type-level list.
    type List: DomainList;
    /// One selector value per dimension.
    type Selectors: Copy;
    /// One raw ordinal per dimension.
    type Ordinals: AsRef<[usize]> + Copy;

    /// Raw ordinals of `selectors`, unclamped.
    fn ordinals(selectors: Self::Selectors) -> Self::Ordinals;
}

macro_rules! cons {
    () => { Nil };
    ($head:ident $(, $tail:ident)*) => { Cons<$head, cons!($($tail),*)> };
}

macro_rules! tuple_domains {
    ($($len:literal => ($($ty:ident . $idx:tt),+);)+) => {
        $(
            impl<$($ty: Selector),+> Domains for ($($ty,)+) {
                type List = cons!($($ty),+);
                type Selectors = ($($ty,)+);
                type Ordinals = [usize; $len];

                #[inline(always)]
                fn ordinals(selectors: Self::Selectors) -> [usize; $len] {
                    [$(selectors.$idx.ordinal()),+]
                }
            }
        )+
    };
}

tuple_domains! {
    1 => (A.0);
    2 => (A.0, B.1);
    3 => (A.0, B.1, C.2);
    4 => (A.0, B.1, C.2, D.3);
    5 => (A.0, B.1, C.2, D.3, E.4);
    6 => (A.0, B.1, C.2, D.3, E.4, F.5);
}

/// Summary of a built table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    /// Domain type names, outermost first.
    pub domains: Vec<&'static str>,
    /// Width of each level.
    pub shape: Vec<usize>,
    /// Number of leaf thunks.
    pub cells: usize,
    /// Time spent building.
    pub build_time: Duration,
}

/// A fully built dispatch table for domains `D` and family `F`. Immutable
/// once built.
pub struct Table<D: Domains, F: Family> {
    root: <D::List as DomainList>::Table<F>,
    stats: TableStats,
}

impl<D: Domains, F: Family> Table<D, F> {
    /// Build the table for family `F`.
    ///
    /// Generates one thunk per combination of selector values. No behavior
    /// is invoked.
    pub fn build() -> DispatchResult<Self> {
        let start = Instant::now();
        let root = D::List::build_level::<Root, F>()?;

        let mut shape = Vec::with_capacity(D::List::DEPTH);
        D::List::shape(&mut shape);
        let mut domains = Vec::with_capacity(D::List::DEPTH);
        D::List::names(&mut domains);

        let stats = TableStats {
            domains,
            shape,
            cells: D::List::CELLS,
            build_time: start.elapsed(),
        };
        debug!(
            family = type_name::<F>(),
            domains = ?stats.domains,
            cells = stats.cells,
            elapsed = ?stats.build_time,
            "built dispatch table"
        );
        Ok(Self { root, stats })
    }

    /// Find the thunk for `ordinals`, clamping each to its dimension.
    #[inline]
    pub fn lookup(&self, ordinals: D::Ordinals) -> Leaf<F> {
        D::List::walk::<F>(&self.root, ordinals.as_ref())
    }

    /// Find the thunk for `ordinals`, rejecting any ordinal `>= END`.
    pub fn try_lookup(&self, ordinals: D::Ordinals) -> DispatchResult<Leaf<F>> {
        D::List::try_walk::<F>(&self.root, ordinals.as_ref(), 0)
    }

    pub fn stats(&self) -> &TableStats {
        &self.stats
    }

    /// Number of dimensions.
    pub fn depth(&self) -> usize {
        D::List::DEPTH
    }

    /// Number of leaf thunks.
    pub fn cells(&self) -> usize {
        self.stats.cells
    }
}

impl<D: Domains, F: Family> fmt::Debug for Table<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
