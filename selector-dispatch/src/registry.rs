//! Process-wide dispatchers keyed by signature.
//!
//! [`dispatch`] finds or creates the one [`Dispatcher`] for a
//! `(domains, family)` signature without the caller declaring a
//! `static`. Entries are leaked and live for the rest of the process.
//!
//! Each call pays a read lock and a hash lookup on top of the table walk.
//! Hot paths should hold their own `static Dispatcher` instead.

use std::any::{type_name, Any, TypeId};
use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::dispatcher::Dispatcher;
use crate::family::Family;
use crate::table::Domains;

type Entry = &'static (dyn Any + Send + Sync);

fn registry() -> &'static RwLock<FxHashMap<TypeId, Entry>> {
    static REGISTRY: OnceLock<RwLock<FxHashMap<TypeId, Entry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// The shared dispatcher for domains `D` and family `F`, created on first
/// request.
///
/// The dispatcher's table is still built lazily, on its first call.
pub fn dispatcher<D: Domains, F: Family>() -> &'static Dispatcher<D, F> {
    let key = TypeId::of::<Dispatcher<D, F>>();

    let found = registry().read().get(&key).copied();
    let entry = match found {
        Some(entry) => entry,
        None => {
            let mut map = registry().write();
            let entry = *map.entry(key).or_insert_with(|| {
                trace!(
                    signature = type_name::<Dispatcher<D, F>>(),
                    "registered dispatcher"
                );
                let leaked: Entry = Box::leak(Box::new(Dispatcher::<D, F>::new()));
                leaked
            });
            entry
        }
    };

    match entry.downcast_ref::<Dispatcher<D, F>>() {
        Some(dispatcher) => dispatcher,
        None => unreachable!("registry entry stored under a foreign TypeId"),
    }
}

/// Dispatch through the shared dispatcher for domains `D` and family `F`.
///
/// Clamps out-of-range selectors like [`Dispatcher::call`].
pub fn dispatch<D: Domains, F: Family>(selectors: D::Selectors, args: F::Args<'_>) -> F::Output {
    dispatcher::<D, F>().call(selectors, args)
}

/// Number of signatures registered so far.
pub fn registered() -> usize {
    registry().read().len()
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;
    use crate::combination::Combination;
    use crate::domain::Bounded;

    struct Sum;

    impl Family for Sum {
        type Args<'a> = (i32, i32);
        type Output = i32;

        fn invoke<C: Combination>((a, b): Self::Args<'_>) -> i32 {
            a + b + C::ordinal(0).unwrap_or(0) as i32 * 100
        }
    }

    struct Negate;

    impl Family for Negate {
        type Args<'a> = (i64,);
        type Output = i64;

        fn invoke<C: Combination>((a,): Self::Args<'_>) -> i64 {
            -a - C::ordinal(0).unwrap_or(0) as i64
        }
    }

    /// Counts a borrowed string's bytes above a threshold.
    struct Above;

    impl Family for Above {
        type Args<'a> = (&'a str,);
        type Output = usize;

        fn invoke<C: Combination>((text,): Self::Args<'_>) -> usize {
            let floor = b'a' + C::ordinal(0).unwrap_or(0) as u8;
            text.bytes().filter(|&b| b > floor).count()
        }
    }

    #[test]
    fn test_same_signature_same_dispatcher() {
        let first = dispatcher::<(Bounded<3>,), Sum>();
        let second = dispatcher::<(Bounded<3>,), Sum>();
        assert!(ptr::eq(first, second));
    }

    #[test]
    fn test_families_get_separate_dispatchers() {
        assert_eq!(dispatch::<(Bounded<2>,), Sum>((Bounded(1),), (1, 2)), 103);
        assert_eq!(dispatch::<(Bounded<2>,), Negate>((Bounded(1),), (5,)), -6);

        let sum = dispatcher::<(Bounded<2>,), Sum>();
        let negate = dispatcher::<(Bounded<2>,), Negate>();
        assert!(!ptr::eq(sum as *const _ as *const u8, negate as *const _ as *const u8));
        assert_eq!(sum.builds(), 1);
        assert_eq!(negate.builds(), 1);
        assert!(registered() >= 2);
    }

    #[test]
    fn test_dispatch_clamps() {
        assert_eq!(dispatch::<(Bounded<4>,), Sum>((Bounded(9),), (0, 0)), 300);
    }

    #[test]
    fn test_dispatch_forwards_borrowed_arguments() {
        let text = String::from("abcde");
        assert_eq!(dispatch::<(Bounded<3>,), Above>((Bounded(0),), (text.as_str(),)), 4);
        assert_eq!(dispatch::<(Bounded<3>,), Above>((Bounded(2),), (&text[1..],)), 2);
    }
}
