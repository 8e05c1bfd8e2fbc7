// ==============================================
// CONCURRENCY TESTS (integration)
// ==============================================
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use treecache::{TreeCache, TreeOps};

const TTL: Duration = Duration::from_secs(60);

#[test]
fn disjoint_top_level_writers_do_not_interfere() {
    let cache = Arc::new(TreeCache::new());
    let num_threads = 8;
    let keys_per_thread = 200;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..keys_per_thread {
                    let top = format!("thread_{thread_id}");
                    let key = format!("key_{i}");
                    let value = format!("value_{thread_id}_{i}");
                    cache
                        .set(&[top.as_str(), key.as_str()], TTL, value.as_bytes())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for thread_id in 0..num_threads {
        for i in 0..keys_per_thread {
            let top = format!("thread_{thread_id}");
            let key = format!("key_{i}");
            let expected = format!("value_{thread_id}_{i}");
            let node = cache.get(&[top.as_str(), key.as_str()]).unwrap();
            assert_eq!(&*node.read(), expected.as_bytes());
        }
    }
}

#[test]
fn same_path_writers_leave_one_whole_payload() {
    let cache = Arc::new(TreeCache::new());
    let num_threads: u8 = 8;
    let writes_per_thread = 200;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                // Each thread writes a payload of its own id byte, so a
                // spliced result is detectable as a mixed-byte payload.
                let payload = [thread_id; 64];
                for _ in 0..writes_per_thread {
                    cache.set(&["contended", "slot"], TTL, &payload).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let data = cache.get(&["contended", "slot"]).unwrap().read();
    assert_eq!(data.len(), 64);
    let first = data[0];
    assert!(first < num_threads);
    assert!(data.iter().all(|&b| b == first), "payload was spliced");
}

#[test]
fn readers_and_writers_make_progress_together() {
    let cache = Arc::new(TreeCache::new());
    cache.set(&["hot", "key"], TTL, b"seed").unwrap();

    let reads = Arc::new(AtomicUsize::new(0));
    let deadline = Instant::now() + Duration::from_millis(300);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let reads = Arc::clone(&reads);
        handles.push(thread::spawn(move || {
            while Instant::now() < deadline {
                if let Some(node) = cache.get(&["hot", "key"]) {
                    let _ = node.read();
                    reads.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }
    for writer_id in 0..4u8 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            let payload = [writer_id; 16];
            while Instant::now() < deadline {
                cache.set(&["hot", "key"], TTL, &payload).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(reads.load(Ordering::Relaxed) > 0);
    let data = cache.get(&["hot", "key"]).unwrap().read();
    assert_eq!(data.len(), 16);
    assert!(data.iter().all(|&b| b == data[0]));
}

#[test]
fn concurrent_writers_on_short_ttls_all_expire() {
    let cache = Arc::new(TreeCache::new());
    let num_threads = 4;
    let keys_per_thread = 50;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..keys_per_thread {
                    let key = format!("t{thread_id}_k{i}");
                    cache
                        .set(&["volatile", key.as_str()], Duration::from_millis(30), b"x")
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let branch_size = cache
            .get(&["volatile"])
            .map(|branch| branch.size())
            .unwrap_or(0);
        if branch_size == 0 {
            break;
        }
        assert!(Instant::now() < deadline, "entries never fully expired");
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn deletes_race_sets_without_panics() {
    let cache = Arc::new(TreeCache::new());
    let iterations = 500;

    let setter = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..iterations {
                let key = format!("k{}", i % 10);
                cache.set(&["race", key.as_str()], TTL, b"v").unwrap();
            }
        })
    };
    let deleter = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..iterations {
                let key = format!("k{}", i % 10);
                cache.delete(&["race", key.as_str()]).unwrap();
            }
        })
    };

    setter.join().unwrap();
    deleter.join().unwrap();

    // Whatever survived must be whole values, nothing torn.
    if let Some(branch) = cache.get(&["race"]) {
        for i in 0..10 {
            let key = format!("k{i}");
            if let Some(node) = branch.get(&[key.as_str()]) {
                assert_eq!(&*node.read(), b"v");
            }
        }
    }
}
