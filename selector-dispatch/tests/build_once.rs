//! Build-once behavior under concurrent first use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use tracing_subscriber::EnvFilter;

use selector_dispatch::{
    dispatch, dispatcher, selector_enum, Bounded, Combination, Dispatcher, Family,
};

selector_enum! {
    pub enum Codec { Raw, Lz4, Zstd, Brotli }
}

struct Encode;

impl Family for Encode {
    type Args<'a> = (&'a [u8],);
    type Output = (Vec<usize>, usize);

    fn invoke<C: Combination>((payload,): Self::Args<'_>) -> (Vec<usize>, usize) {
        (C::ordinals(), payload.len())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

fn race<T: Send>(threads: usize, work: impl Fn(usize) -> T + Sync) -> Vec<T> {
    let barrier = Barrier::new(threads);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let barrier = &barrier;
                let work = &work;
                scope.spawn(move || {
                    barrier.wait();
                    work(t)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    })
}

#[test]
fn test_static_dispatcher_builds_once_under_race() {
    init_tracing();
    static ENCODE: Dispatcher<(Codec, Bounded<6>, bool), Encode> = Dispatcher::new();

    let results = race(32, |t| {
        let payload = vec![0u8; t];
        let out = ENCODE.call_ordinals([t % 4, t, t % 2], (&payload[..],));
        (t, out)
    });

    for (t, (ordinals, len)) in results {
        assert_eq!(ordinals, vec![t % 4, t.min(5), t % 2]);
        assert_eq!(len, t);
    }
    assert_eq!(ENCODE.builds(), 1);
    assert_eq!(ENCODE.table().cells(), 4 * 6 * 2);
}

#[test]
fn test_registry_dispatcher_builds_once_under_race() {
    init_tracing();

    let outputs = race(24, |t| {
        let payload = [7u8; 3];
        dispatch::<(Codec, bool), Encode>((Codec::Zstd, t % 2 == 0), (&payload[..],))
    });

    assert_eq!(outputs.len(), 24);
    let shared = dispatcher::<(Codec, bool), Encode>();
    assert_eq!(shared.builds(), 1);
    assert!(shared.is_built());
}

#[test]
fn test_building_does_not_invoke_behaviors() {
    static INVOKED: AtomicUsize = AtomicUsize::new(0);

    struct Tally;

    impl Family for Tally {
        type Args<'a> = u16;
        type Output = u16;

        fn invoke<C: Combination>(x: Self::Args<'_>) -> u16 {
            INVOKED.fetch_add(1, Ordering::SeqCst);
            x + C::ordinals().iter().sum::<usize>() as u16
        }
    }

    let fresh = Dispatcher::<(Codec, Codec, Codec), Tally>::new();
    let table = fresh.table();
    assert_eq!(table.cells(), 64);
    assert_eq!(table.depth(), 3);
    assert_eq!(INVOKED.load(Ordering::SeqCst), 0);

    assert_eq!(fresh.call((Codec::Brotli, Codec::Raw, Codec::Lz4), 10), 14);
    assert_eq!(INVOKED.load(Ordering::SeqCst), 1);
    assert_eq!(fresh.builds(), 1);
}
