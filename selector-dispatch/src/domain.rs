//! # Selector Domains
//!
//! A selector domain is one dispatch dimension: a finite, zero-based, densely
//! numbered set of values whose size is the ordinal of its END sentinel.
//!
//! ```text
//! Precision:   Half   Single   Double  |  END
//! ordinal:      0       1        2     |   3   (= size)
//! ```
//!
//! Besides the runtime ordinal, every domain enumerates its values at the
//! type level through [`Selector::visit`]. The table builder uses that to
//! instantiate one behavior per value, so the call path never branches on a
//! selector value.
//!
//! ## Declaring a domain
//!
//! ```
//! use selector_dispatch::{selector_enum, Selector};
//!
//! selector_enum! {
//!     /// Floating point width.
//!     pub enum Precision { Half, Single, Double }
//! }
//!
//! assert_eq!(Precision::END, 3);
//! assert_eq!(Precision::from_ordinal(7), Precision::Double);
//! ```

use std::marker::PhantomData;

/// One dispatch dimension.
///
/// Implementations must keep `visit` consistent with `END`: exactly `END`
/// markers, ordinals `0..END`, in increasing order. The table builder checks
/// this and reports [`crate::DispatchError::MalformedDomain`] otherwise.
pub trait Selector: Copy + Send + Sync + 'static {
    /// Ordinal of the END sentinel, one past the last valid value.
    const END: usize;

    /// Raw ordinal of this value. Open domains such as [`Bounded`] may return
    /// values `>= END`; those are clamped when dispatching.
    fn ordinal(self) -> usize;

    /// The value with the given ordinal, clamped to the last valid value.
    fn from_ordinal(ordinal: usize) -> Self;

    /// Present every valid value, in ordinal order, as a [`Value`] marker.
    fn visit<V: Visitor<Self>>(visitor: &mut V);

    /// Number of valid values.
    #[inline(always)]
    fn size() -> usize {
        Self::END
    }
}

/// Replace an out-of-range ordinal with the last valid one.
///
/// `end` must be at least 1.
#[inline(always)]
pub fn clamp(ordinal: usize, end: usize) -> usize {
    ordinal.min(end - 1)
}

/// Receives the type-level values of a domain, one call per value.
pub trait Visitor<D: Selector> {
    fn visit<V: Value<Domain = D>>(&mut self);
}

/// A selector value lifted to the type level.
pub trait Value: 'static {
    /// The domain this value belongs to.
    type Domain: Selector;

    /// Ordinal of the value within its domain.
    const ORDINAL: usize;

    /// The runtime value.
    fn get() -> Self::Domain {
        Self::Domain::from_ordinal(Self::ORDINAL)
    }
}

/// Marker for the value with ordinal `I` of domain `D`.
///
/// Never constructed; it exists only to carry `I` into monomorphized code.
pub struct Fixed<D, const I: usize>(PhantomData<fn() -> D>);

impl<D: Selector, const I: usize> Value for Fixed<D, I> {
    type Domain = D;
    const ORDINAL: usize = I;
}

/// Declare a fieldless enum usable as a selector domain.
///
/// Variants are numbered densely from zero in declaration order and the END
/// sentinel is implicit: `END` equals the number of variants. The generated
/// enum derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`,
/// `Ord` and `Hash`, and gains an `ALL` constant listing the variants.
#[macro_export]
macro_rules! selector_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every value, in ordinal order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl $crate::Selector for $name {
            const END: usize = $name::ALL.len();

            #[inline(always)]
            fn ordinal(self) -> usize {
                self as usize
            }

            fn from_ordinal(ordinal: usize) -> Self {
                $name::ALL[$crate::domain::clamp(ordinal, <Self as $crate::Selector>::END)]
            }

            fn visit<V: $crate::Visitor<Self>>(visitor: &mut V) {
                $(
                    visitor.visit::<$crate::Fixed<Self, { $name::$variant as usize }>>();
                )+
            }
        }
    };
}

impl Selector for bool {
    const END: usize = 2;

    #[inline(always)]
    fn ordinal(self) -> usize {
        self as usize
    }

    fn from_ordinal(ordinal: usize) -> Self {
        ordinal != 0
    }

    fn visit<V: Visitor<Self>>(visitor: &mut V) {
        visitor.visit::<Fixed<bool, 0>>();
        visitor.visit::<Fixed<bool, 1>>();
    }
}

/// An integer selector with `N` valid values, `0..N`.
///
/// The wrapped value is not range-checked: anything `>= N` dispatches as
/// `N - 1`. Useful for rank- or arity-style dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bounded<const N: usize>(pub usize);

impl<const N: usize> Bounded<N> {
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

macro_rules! bounded_domains {
    ($($n:literal => [$($i:literal)+];)+) => {
        $(
            impl Selector for Bounded<$n> {
                const END: usize = $n;

                #[inline(always)]
                fn ordinal(self) -> usize {
                    self.0
                }

                fn from_ordinal(ordinal: usize) -> Self {
                    Self(clamp(ordinal, $n))
                }

                fn visit<V: Visitor<Self>>(visitor: &mut V) {
                    $(visitor.visit::<Fixed<Self, $i>>();)+
                }
            }
        )+
    };
}

// Handles widths up to 12.
bounded_domains! {
    1 => [0];
    2 => [0 1];
    3 => [0 1 2];
    4 => [0 1 2 3];
    5 => [0 1 2 3 4];
    6 => [0 1 2 3 4 5];
    7 => [0 1 2 3 4 5 6];
    8 => [0 1 2 3 4 5 6 7];
    9 => [0 1 2 3 4 5 6 7 8];
    10 => [0 1 2 3 4 5 6 7 8 9];
    11 => [0 1 2 3 4 5 6 7 8 9 10];
    12 => [0 1 2 3 4 5 6 7 8 9 10 11];
}
