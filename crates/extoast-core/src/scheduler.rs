//! Keyed delayed-task scheduler.
//!
//! At most one pending deadline exists per key: scheduling a key again
//! supersedes the earlier deadline. Due keys are handed to a handler on a
//! dedicated timer thread, with the scheduler lock released.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::ToastError;

/// A deadline that came due. `generation` identifies which `schedule` call
/// produced it, so a receiver can tell a superseded firing from a current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<K> {
    pub key: K,
    pub generation: u64,
}

struct State<K> {
    by_deadline: BTreeMap<(Instant, u64), K>,
    by_key: HashMap<K, (Instant, u64)>,
    next_generation: u64,
    shutdown: bool,
}

impl<K: Copy + Eq + Hash> State<K> {
    fn remove(&mut self, key: &K) -> bool {
        match self.by_key.remove(key) {
            Some(slot) => {
                self.by_deadline.remove(&slot);
                true
            }
            None => false,
        }
    }
}

struct Shared<K> {
    state: Mutex<State<K>>,
    wake: Condvar,
}

pub struct TimeoutScheduler<K> {
    shared: Arc<Shared<K>>,
}

impl<K> TimeoutScheduler<K>
where
    K: Copy + Eq + Hash + Send + std::fmt::Debug + 'static,
{
    /// Start the timer thread. `handler` runs on that thread for every
    /// deadline that comes due.
    pub fn spawn<F>(name: &str, handler: F) -> Result<Self, ToastError>
    where
        F: Fn(Fired<K>) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                by_deadline: BTreeMap::new(),
                by_key: HashMap::new(),
                next_generation: 1,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });

        let worker = shared.clone();
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(&worker, handler))
            .map_err(|source| ToastError::Spawn {
                thread: "timer",
                source,
            })?;

        Ok(Self { shared })
    }

    /// Fire `key` after `delay`, replacing any deadline already pending for it.
    /// Returns the generation the firing will carry.
    pub fn schedule(&self, key: K, delay: Duration) -> u64 {
        let mut state = self.shared.state.lock();
        state.remove(&key);
        let generation = state.next_generation;
        state.next_generation += 1;
        let slot = (Instant::now() + delay, generation);
        state.by_deadline.insert(slot, key);
        state.by_key.insert(key, slot);
        drop(state);
        self.shared.wake.notify_one();
        generation
    }

    /// Drop the pending deadline for `key`. Returns whether one existed.
    pub fn cancel(&self, key: K) -> bool {
        let removed = self.shared.state.lock().remove(&key);
        if removed {
            self.shared.wake.notify_one();
        }
        removed
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.shared.state.lock().by_key.contains_key(&key)
    }

    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().by_key.len()
    }
}

impl<K> Drop for TimeoutScheduler<K> {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.wake.notify_all();
    }
}

fn run<K, F>(shared: &Shared<K>, handler: F)
where
    K: Copy + Eq + Hash + std::fmt::Debug,
    F: Fn(Fired<K>),
{
    log::debug!("[scheduler] started");
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            break;
        }

        let next = state.by_deadline.first_key_value().map(|(slot, key)| (*slot, *key));
        match next {
            Some(((deadline, generation), key)) if deadline <= Instant::now() => {
                state.remove(&key);
                drop(state);
                log::trace!("[scheduler] fired {:?} (generation {})", key, generation);
                handler(Fired { key, generation });
                state = shared.state.lock();
            }
            Some(((deadline, _), _)) => {
                shared.wake.wait_until(&mut state, deadline);
            }
            None => {
                shared.wake.wait(&mut state);
            }
        }
    }
    log::debug!("[scheduler] stopped");
}
