//! The queue manager: serializes toast display so at most one is visible.
//!
//! The visible record is always at position 0 and is the only record with a
//! pending timeout. Signals to displayables are dispatched with the queue
//! lock held (so their posts to the UI thread keep queue order) but without
//! a borrow of the list, so a displayable may call back into the manager.

use std::cell::RefCell;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use parking_lot::ReentrantMutex;

use crate::agent::{DisplayToken, Displayable};
use crate::error::ToastError;
use crate::record::{RecordId, ToastRecord};
use crate::scheduler::{Fired, TimeoutScheduler};

type Queue = RefCell<Vec<ToastRecord>>;

pub struct ToastManager {
    queue: ReentrantMutex<Queue>,
    timeouts: TimeoutScheduler<RecordId>,
}

impl ToastManager {
    /// Create the manager and its timer thread.
    pub fn new() -> Result<Arc<Self>, ToastError> {
        let slot: Arc<OnceLock<Weak<ToastManager>>> = Arc::new(OnceLock::new());
        let handler_slot = slot.clone();
        let timeouts = TimeoutScheduler::spawn("extoast-timer", move |fired| {
            if let Some(manager) = handler_slot.get().and_then(Weak::upgrade) {
                manager.handle_timeout(fired);
            }
        })?;

        let manager = Arc::new(ToastManager {
            queue: ReentrantMutex::new(RefCell::new(Vec::new())),
            timeouts,
        });
        let _ = slot.set(Arc::downgrade(&manager));
        Ok(manager)
    }

    /// Queue `handle` for `duration`. A handle already queued keeps its
    /// position and only has its duration refreshed; if it is visible, its
    /// window restarts from now.
    pub fn enqueue(&self, handle: Arc<dyn Displayable>, duration: Duration) {
        if duration.is_zero() {
            log::warn!(
                "[manager] ignoring {} with zero duration",
                handle.token()
            );
            return;
        }

        let guard = self.queue.lock();
        let index = {
            let mut queue = guard.borrow_mut();
            match index_of(&queue, handle.token()) {
                Some(index) => {
                    queue[index].update(duration);
                    log::debug!(
                        "[manager] refreshed {} at position {} to {:?}",
                        handle.token(),
                        index,
                        duration
                    );
                    index
                }
                None => {
                    queue.push(ToastRecord::new(handle, duration));
                    let index = queue.len() - 1;
                    log::debug!("[manager] queued {:?} at position {}", queue[index], index);
                    index
                }
            }
        };

        if index == 0 {
            self.show_next_locked(&guard);
        }
    }

    /// Remove `handle` from the queue, detaching it if visible.
    /// A handle that is not queued is ignored.
    pub fn cancel(&self, handle: &dyn Displayable) {
        let token = handle.token();
        let guard = self.queue.lock();
        let id = guard
            .borrow()
            .iter()
            .find(|r| r.token() == token)
            .map(|r| r.id);
        match id {
            Some(id) => self.cancel_locked(&guard, id),
            None => log::debug!("[manager] cancel of {} which is not queued", token),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nothing queued and no timeout pending.
    pub fn is_idle(&self) -> bool {
        self.is_empty() && self.timeouts.pending_len() == 0
    }

    /// Position of `token` in the queue; 0 is the visible record.
    pub fn position(&self, token: DisplayToken) -> Option<usize> {
        index_of(&self.queue.lock().borrow(), token)
    }

    /// Queue contents, front first.
    pub fn snapshot(&self) -> Vec<(DisplayToken, Duration)> {
        self.queue
            .lock()
            .borrow()
            .iter()
            .map(|r| (r.token(), r.duration))
            .collect()
    }

    fn show_next_locked(&self, queue: &Queue) {
        loop {
            let Some(record) = queue.borrow().first().cloned() else {
                return;
            };
            match record.handle.show() {
                Ok(()) => {
                    // The show signal may have cancelled the record; whoever
                    // removed it has already advanced the queue.
                    let still_front = queue.borrow().first().map(|r| r.id) == Some(record.id);
                    if still_front {
                        self.schedule_timeout_locked(queue, &record);
                    } else {
                        log::debug!("[manager] {:?} left the front while showing", record);
                    }
                    return;
                }
                Err(e) => {
                    // Drop the record and try the next one.
                    log::warn!("[manager] show failed for {:?}: {}", record, e);
                    self.timeouts.cancel(record.id);
                    remove_by_id(queue, record.id);
                }
            }
        }
    }

    fn schedule_timeout_locked(&self, queue: &Queue, record: &ToastRecord) {
        let generation = self.timeouts.schedule(record.id, record.duration);
        if let Some(r) = queue.borrow_mut().iter_mut().find(|r| r.id == record.id) {
            r.timeout = Some(generation);
        }
    }

    /// Detach and remove the record, then advance if it was the visible one.
    fn cancel_locked(&self, queue: &Queue, id: RecordId) {
        let Some(record) = queue.borrow().iter().find(|r| r.id == id).cloned() else {
            return;
        };

        if let Err(e) = record.handle.hide() {
            log::warn!("[manager] hide failed for {:?}: {}", record, e);
        }
        self.timeouts.cancel(id);

        // Look the record up again: the hide signal may have changed the list.
        let removed_front = remove_by_id(queue, id) == Some(0);
        log::debug!("[manager] removed {:?}", record);

        if removed_front && !queue.borrow().is_empty() {
            self.show_next_locked(queue);
        }
    }

    fn handle_timeout(&self, fired: Fired<RecordId>) {
        let guard = self.queue.lock();
        let current = guard
            .borrow()
            .iter()
            .find(|r| r.id == fired.key)
            .map(|r| r.timeout == Some(fired.generation));
        match current {
            Some(true) => self.cancel_locked(&guard, fired.key),
            Some(false) => log::trace!("[manager] superseded timeout for {:?}", fired.key),
            None => log::trace!("[manager] timeout for removed {:?}", fired.key),
        }
    }
}

impl std::fmt::Debug for ToastManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastManager")
            .field("queue", &self.snapshot())
            .finish()
    }
}

fn index_of(queue: &[ToastRecord], token: DisplayToken) -> Option<usize> {
    queue.iter().position(|r| r.token() == token)
}

fn remove_by_id(queue: &Queue, id: RecordId) -> Option<usize> {
    let mut queue = queue.borrow_mut();
    let index = queue.iter().position(|r| r.id == id)?;
    queue.remove(index);
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DisplayError;
    use parking_lot::Mutex;
    use std::time::Instant;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Signal {
        Show(u64),
        Hide(u64),
    }

    /// Records signals synchronously instead of posting to a UI thread.
    struct Probe {
        token: DisplayToken,
        log: Arc<Mutex<Vec<Signal>>>,
        fail_show: bool,
    }

    impl Probe {
        fn new(log: &Arc<Mutex<Vec<Signal>>>) -> Arc<Self> {
            Arc::new(Self {
                token: DisplayToken::next(),
                log: log.clone(),
                fail_show: false,
            })
        }

        fn failing(log: &Arc<Mutex<Vec<Signal>>>) -> Arc<Self> {
            Arc::new(Self {
                token: DisplayToken::next(),
                log: log.clone(),
                fail_show: true,
            })
        }

        fn id(&self) -> u64 {
            self.token.get()
        }
    }

    impl Displayable for Probe {
        fn token(&self) -> DisplayToken {
            self.token
        }

        fn show(&self) -> Result<(), DisplayError> {
            if self.fail_show {
                return Err(DisplayError::UiThreadGone);
            }
            self.log.lock().push(Signal::Show(self.token.get()));
            Ok(())
        }

        fn hide(&self) -> Result<(), DisplayError> {
            self.log.lock().push(Signal::Hide(self.token.get()));
            Ok(())
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    const LONG: Duration = Duration::from_secs(30);

    #[test]
    fn first_enqueue_shows_immediately() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);

        manager.enqueue(a.clone(), LONG);

        assert_eq!(*log.lock(), vec![Signal::Show(a.id())]);
        assert_eq!(manager.position(a.token()), Some(0));
        assert!(!manager.is_idle());
    }

    #[test]
    fn second_enqueue_waits() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let b = Probe::new(&log);

        manager.enqueue(a.clone(), LONG);
        manager.enqueue(b.clone(), LONG);

        assert_eq!(*log.lock(), vec![Signal::Show(a.id())]);
        assert_eq!(manager.position(b.token()), Some(1));
    }

    #[test]
    fn re_enqueue_refreshes_without_reordering() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let b = Probe::new(&log);
        let c = Probe::new(&log);

        manager.enqueue(a.clone(), LONG);
        manager.enqueue(b.clone(), LONG);
        manager.enqueue(c.clone(), LONG);
        manager.enqueue(b.clone(), Duration::from_secs(5));

        assert_eq!(
            manager.snapshot(),
            vec![
                (a.token(), LONG),
                (b.token(), Duration::from_secs(5)),
                (c.token(), LONG),
            ]
        );
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn cancel_of_unknown_handle_is_a_no_op() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let stranger = Probe::new(&log);
        manager.enqueue(a.clone(), LONG);

        manager.cancel(stranger.as_ref());

        assert_eq!(manager.snapshot(), vec![(a.token(), LONG)]);
        assert_eq!(*log.lock(), vec![Signal::Show(a.id())]);
    }

    #[test]
    fn cancel_of_visible_advances_to_next() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let b = Probe::new(&log);
        manager.enqueue(a.clone(), LONG);
        manager.enqueue(b.clone(), LONG);

        manager.cancel(a.as_ref());

        assert_eq!(
            *log.lock(),
            vec![Signal::Show(a.id()), Signal::Hide(a.id()), Signal::Show(b.id())]
        );
        assert_eq!(manager.position(b.token()), Some(0));
    }

    #[test]
    fn cancel_of_waiting_record_leaves_visible_alone() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let b = Probe::new(&log);
        manager.enqueue(a.clone(), LONG);
        manager.enqueue(b.clone(), LONG);

        manager.cancel(b.as_ref());

        assert_eq!(
            *log.lock(),
            vec![Signal::Show(a.id()), Signal::Hide(b.id())]
        );
        assert_eq!(manager.snapshot(), vec![(a.token(), LONG)]);
    }

    #[test]
    fn cancel_clears_the_pending_timeout() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        manager.enqueue(a.clone(), Duration::from_millis(60));
        manager.cancel(a.as_ref());

        assert!(manager.is_idle());
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(
            *log.lock(),
            vec![Signal::Show(a.id()), Signal::Hide(a.id())]
        );
    }

    #[test]
    fn timeout_advances_the_queue() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let b = Probe::new(&log);
        manager.enqueue(a.clone(), Duration::from_millis(40));
        manager.enqueue(b.clone(), Duration::from_millis(40));

        assert!(wait_until(|| manager.is_idle()));
        assert_eq!(
            *log.lock(),
            vec![
                Signal::Show(a.id()),
                Signal::Hide(a.id()),
                Signal::Show(b.id()),
                Signal::Hide(b.id()),
            ]
        );
    }

    #[test]
    fn failed_show_drops_record_and_tries_next() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let broken = Probe::failing(&log);
        let c = Probe::new(&log);
        manager.enqueue(a.clone(), LONG);
        manager.enqueue(broken.clone(), LONG);
        manager.enqueue(c.clone(), LONG);

        manager.cancel(a.as_ref());

        assert_eq!(manager.snapshot(), vec![(c.token(), LONG)]);
        assert_eq!(
            *log.lock(),
            vec![Signal::Show(a.id()), Signal::Hide(a.id()), Signal::Show(c.id())]
        );
    }

    #[test]
    fn zero_duration_is_ignored() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        manager.enqueue(a, Duration::ZERO);
        assert!(manager.is_idle());
        assert!(log.lock().is_empty());
    }

    /// Cancels another handle from inside its own hide signal.
    struct Chained {
        token: DisplayToken,
        manager: Weak<ToastManager>,
        victim: Arc<Probe>,
        log: Arc<Mutex<Vec<Signal>>>,
    }

    impl Displayable for Chained {
        fn token(&self) -> DisplayToken {
            self.token
        }

        fn show(&self) -> Result<(), DisplayError> {
            self.log.lock().push(Signal::Show(self.token.get()));
            Ok(())
        }

        fn hide(&self) -> Result<(), DisplayError> {
            self.log.lock().push(Signal::Hide(self.token.get()));
            if let Some(manager) = self.manager.upgrade() {
                manager.cancel(self.victim.as_ref());
            }
            Ok(())
        }
    }

    /// Cancels itself from inside its own show signal.
    struct SelfCancelling {
        token: DisplayToken,
        manager: Weak<ToastManager>,
        log: Arc<Mutex<Vec<Signal>>>,
    }

    impl Displayable for SelfCancelling {
        fn token(&self) -> DisplayToken {
            self.token
        }

        fn show(&self) -> Result<(), DisplayError> {
            self.log.lock().push(Signal::Show(self.token.get()));
            if let Some(manager) = self.manager.upgrade() {
                manager.cancel(self);
            }
            Ok(())
        }

        fn hide(&self) -> Result<(), DisplayError> {
            self.log.lock().push(Signal::Hide(self.token.get()));
            Ok(())
        }
    }

    #[test]
    fn show_signal_cancelling_itself_leaves_no_timeout() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let quitter = Arc::new(SelfCancelling {
            token: DisplayToken::next(),
            manager: Arc::downgrade(&manager),
            log: log.clone(),
        });

        manager.enqueue(quitter.clone(), LONG);

        assert!(manager.is_empty());
        assert_eq!(manager.timeouts.pending_len(), 0);
        assert!(manager.is_idle());
        let id = quitter.token.get();
        assert_eq!(*log.lock(), vec![Signal::Show(id), Signal::Hide(id)]);
    }

    #[test]
    fn show_signal_cancelling_itself_advances_once() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        let quitter = Arc::new(SelfCancelling {
            token: DisplayToken::next(),
            manager: Arc::downgrade(&manager),
            log: log.clone(),
        });
        let c = Probe::new(&log);
        manager.enqueue(a.clone(), LONG);
        manager.enqueue(quitter.clone(), LONG);
        manager.enqueue(c.clone(), LONG);

        manager.cancel(a.as_ref());

        assert_eq!(manager.snapshot(), vec![(c.token(), LONG)]);
        assert_eq!(manager.timeouts.pending_len(), 1);
        let q = quitter.token.get();
        assert_eq!(
            *log.lock(),
            vec![
                Signal::Show(a.id()),
                Signal::Hide(a.id()),
                Signal::Show(q),
                Signal::Hide(q),
                Signal::Show(c.id()),
            ]
        );
    }

    #[test]
    fn superseded_timeout_is_ignored() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = Probe::new(&log);
        manager.enqueue(a.clone(), LONG);
        let (id, first) = {
            let guard = manager.queue.lock();
            let queue = guard.borrow();
            (queue[0].id, queue[0].timeout.unwrap())
        };

        // refresh while visible, then let the old deadline land
        manager.enqueue(a.clone(), LONG);
        let current = manager.queue.lock().borrow()[0].timeout.unwrap();
        assert_ne!(first, current);
        manager.handle_timeout(Fired {
            key: id,
            generation: first,
        });

        assert_eq!(manager.position(a.token()), Some(0));
        assert_eq!(*log.lock(), vec![Signal::Show(a.id()), Signal::Show(a.id())]);

        manager.handle_timeout(Fired {
            key: id,
            generation: current,
        });
        assert!(manager.is_idle());
        assert_eq!(
            log.lock().iter().filter(|s| **s == Signal::Hide(a.id())).count(),
            1
        );
    }

    #[test]
    fn hide_signal_may_reenter_the_manager() {
        let manager = ToastManager::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let victim = Probe::new(&log);
        let c = Probe::new(&log);
        let chained = Arc::new(Chained {
            token: DisplayToken::next(),
            manager: Arc::downgrade(&manager),
            victim: victim.clone(),
            log: log.clone(),
        });
        let chained_id = chained.token.get();

        manager.enqueue(chained.clone(), LONG);
        manager.enqueue(victim.clone(), LONG);
        manager.enqueue(c.clone(), LONG);

        manager.cancel(chained.as_ref());

        assert_eq!(manager.snapshot(), vec![(c.token(), LONG)]);
        assert_eq!(
            *log.lock(),
            vec![
                Signal::Show(chained_id),
                Signal::Hide(chained_id),
                Signal::Hide(victim.id()),
                Signal::Show(c.id()),
            ]
        );
    }
}
