//! # Selector Combinations
//!
//! A combination is the ordered tuple of selector values a behavior is
//! specialized for, expressed as a type. The table builder grows it one
//! dimension at a time:
//!
//! ```text
//! Root
//! Then<Root, Fixed<Precision, 1>>
//! Then<Then<Root, Fixed<Precision, 1>>, Fixed<Layout, 0>>   // (Single, RowMajor)
//! ```
//!
//! All accessors depend on type parameters only, so inside a monomorphized
//! behavior they fold to constants.

use std::any::Any;
use std::marker::PhantomData;

use crate::domain::{Selector, Value};

/// A type-level, ordered list of fixed selector values.
pub trait Combination: 'static {
    /// Number of bound dimensions.
    const LEN: usize;

    /// Ordinal bound at dimension `dim`, or `None` past the end.
    fn ordinal(dim: usize) -> Option<usize>;

    /// Typed value bound at dimension `dim`.
    ///
    /// Returns `None` if `dim` is out of range or the dimension's domain is
    /// not `D`.
    fn value<D: Selector>(dim: usize) -> Option<D>;

    /// All bound ordinals, outermost dimension first.
    fn ordinals() -> Vec<usize> {
        (0..Self::LEN).filter_map(Self::ordinal).collect()
    }
}

/// The empty combination.
pub struct Root;

impl Combination for Root {
    const LEN: usize = 0;

    fn ordinal(_dim: usize) -> Option<usize> {
        None
    }

    fn value<D: Selector>(_dim: usize) -> Option<D> {
        None
    }
}

/// Combination `P` extended by the value `M` on the next dimension.
pub struct Then<P, M>(PhantomData<fn() -> (P, M)>);

impl<P: Combination, M: Value> Combination for Then<P, M> {
    const LEN: usize = P::LEN + 1;

    #[inline(always)]
    fn ordinal(dim: usize) -> Option<usize> {
        if dim == P::LEN {
            Some(M::ORDINAL)
        } else {
            P::ordinal(dim)
        }
    }

    #[inline(always)]
    fn value<D: Selector>(dim: usize) -> Option<D> {
        if dim != P::LEN {
            return P::value::<D>(dim);
        }
        let value = M::get();
        (&value as &dyn Any).downcast_ref::<D>().copied()
    }
}
