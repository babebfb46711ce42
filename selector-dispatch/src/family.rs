//! # Behavior Families
//!
//! A family supplies one behavior per selector combination. It is written
//! once as a generic method; the table builder instantiates it for every
//! combination and stores the resulting function pointers.
//!
//! Trailing arguments may borrow from the caller. `Args` is generic over
//! the borrow's lifetime and table leaves are higher-ranked over it, so one
//! table serves every call site:
//!
//! ```
//! use selector_dispatch::{Combination, Family};
//!
//! struct Scale;
//!
//! impl Family for Scale {
//!     type Args<'a> = (&'a mut [f32], f32);
//!     type Output = ();
//!
//!     fn invoke<C: Combination>((buf, factor): Self::Args<'_>) {
//!         let bias = C::ordinal(0).unwrap_or(0) as f32;
//!         buf.iter_mut().for_each(|x| *x = *x * factor + bias);
//!     }
//! }
//! ```

use crate::combination::Combination;

/// A family of behaviors indexed by selector combination.
///
/// `Args` is the trailing-argument type, usually a tuple. Every combination
/// takes the same arguments and returns the same `Output`.
///
/// Implementations should name the argument type as `Self::Args<'_>` in
/// `invoke`, matching the declaration below.
pub trait Family: 'static {
    /// Trailing arguments, possibly borrowing for `'a`.
    type Args<'a>;
    type Output;

    /// The behavior specialized for combination `C`.
    fn invoke<C: Combination>(args: Self::Args<'_>) -> Self::Output;
}

/// A table leaf: the behavior of one combination, callable with arguments
/// borrowed for any lifetime.
pub type Leaf<F> = for<'a> fn(<F as Family>::Args<'a>) -> <F as Family>::Output;

/// The leaf that forwards to the behavior bound to `C`.
///
/// A closure, not a generic fn item: a lifetime that appears only inside
/// `F::Args<'_>` is early-bound on a fn item and would not coerce to the
/// higher-ranked [`Leaf`].
#[inline]
pub(crate) fn thunk<F: Family, C: Combination>() -> Leaf<F> {
    |args| F::invoke::<C>(args)
}
