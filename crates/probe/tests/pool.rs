use probe::{CancelScope, Counters, Pool, PoolConfig, Probe, ProbeConfig, RandSource, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

struct Zeroes;

impl RandSource for Zeroes {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        buf.fill(0);
        Ok(())
    }
}

#[test]
fn zero_rand_source_gives_deterministic_ids() {
    let pool = Pool::new(PoolConfig::new().size(3).rand(Arc::new(Zeroes))).unwrap();
    for probe in pool.probes() {
        assert_eq!(probe.id().as_str(), "000000");
    }
    pool.stop(true);
}

#[test]
fn many_producers_share_one_pool() {
    let pool = Arc::new(Pool::new(PoolConfig::new().size(4).buffer_size(8)).unwrap());
    let total = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            let total = total.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    let total = total.clone();
                    let tx = tx.clone();
                    pool.submit(move || {
                        total.fetch_add(1, Ordering::Relaxed);
                        tx.send(()).unwrap();
                    });
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    for _ in 0..1000 {
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
    assert_eq!(total.load(Ordering::Relaxed), 1000);
    assert!(wait_for(|| pool.idle_count() == 4));
    pool.stop(true);
    assert_eq!(pool.running_count(), 0);
}

#[test]
fn queued_units_survive_a_restart() {
    let pool = Pool::new(PoolConfig::new().size(1).buffer_size(4)).unwrap();
    pool.stop(true);

    let (tx, rx) = mpsc::channel();
    for i in 0..4 {
        let tx = tx.clone();
        pool.submit(move || tx.send(i).unwrap());
    }
    assert_eq!(pool.stats().queued, 4);
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

    pool.start().unwrap();
    let mut seen: Vec<_> = (0..4)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3]);
    pool.stop(true);
}

#[test]
fn manual_probe_joins_pool_queue() {
    let counters = Counters::new();
    let pool = Pool::new(PoolConfig::new().size(1).counters(counters.clone())).unwrap();
    let queue = pool.probes()[0].queue().clone();

    let extra = Probe::new(
        ProbeConfig::new()
            .queue(queue.clone())
            .counters(counters.clone()),
    )
    .unwrap();
    assert_eq!(pool.running_count(), 2);

    pool.stop(true);
    assert_eq!(pool.running_count(), 1);

    let (tx, rx) = mpsc::channel();
    queue.submit(move || tx.send(()).unwrap());
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    extra.stop(true);
    assert_eq!(counters.running(), 0);
}

#[test]
fn individual_probe_restart_does_not_affect_pool() {
    let pool = Pool::new(PoolConfig::new().size(4)).unwrap();
    let probe = &pool.probes()[2];

    probe.stop(true);
    assert_eq!(pool.running_count(), 3);
    assert!(pool.is_started());

    probe.start().unwrap();
    assert_eq!(pool.running_count(), 4);
    pool.stop(true);
    assert!(pool.probes().iter().all(|p| !p.running()));
}

#[test]
fn outer_scope_cancels_several_pools() {
    let root = CancelScope::new();
    let a = Pool::new(PoolConfig::new().size(2).cancel(root.child())).unwrap();
    let b = Pool::new(PoolConfig::new().size(2).cancel(root.clone())).unwrap();

    root.cancel();
    assert!(wait_for(|| a.running_count() == 0 && b.running_count() == 0));
}
