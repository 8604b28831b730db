//! The UI-owning thread.
//!
//! Every attach/detach of a toast element runs here, in the order it was
//! posted. Posting never blocks.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, ThreadId};

use crate::error::{DisplayError, ToastError};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle for posting work to the UI thread. Cheap to clone; the thread exits
/// once every handle is dropped and the queue has drained.
#[derive(Clone)]
pub struct UiHandle {
    tx: Sender<Task>,
    thread_id: ThreadId,
}

impl UiHandle {
    /// Start the UI thread.
    pub fn spawn() -> Result<UiHandle, ToastError> {
        let (tx, rx) = mpsc::channel::<Task>();
        let handle = thread::Builder::new()
            .name("extoast-ui".to_string())
            .spawn(move || {
                log::debug!("[looper] started");
                for task in rx {
                    task();
                }
                log::debug!("[looper] stopped");
            })
            .map_err(|source| ToastError::Spawn {
                thread: "ui",
                source,
            })?;

        Ok(UiHandle {
            tx,
            thread_id: handle.thread().id(),
        })
    }

    /// Queue `task` behind everything already posted.
    pub fn post<F>(&self, task: F) -> Result<(), DisplayError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(task)).map_err(|_| {
            log::warn!("[looper] ui thread gone, dropping task");
            DisplayError::UiThreadGone
        })
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Block until every task posted before this call has run.
    /// Returns immediately when called on the UI thread itself.
    pub fn sync(&self) {
        if self.is_ui_thread() {
            return;
        }
        let (done_tx, done_rx) = mpsc::channel();
        if self
            .post(move || {
                let _ = done_tx.send(());
            })
            .is_ok()
        {
            let _ = done_rx.recv();
        }
    }
}

impl std::fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiHandle")
            .field("thread_id", &self.thread_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn tasks_run_in_post_order() {
        let ui = UiHandle::spawn().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..50 {
            let seen = seen.clone();
            ui.post(move || seen.lock().unwrap().push(i)).unwrap();
        }
        ui.sync();
        assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn tasks_run_on_the_ui_thread() {
        let ui = UiHandle::spawn().unwrap();
        let flag = Arc::new(Mutex::new(None));
        let ui_for_task = ui.clone();
        let flag_for_task = flag.clone();
        ui.post(move || {
            *flag_for_task.lock().unwrap() = Some(ui_for_task.is_ui_thread());
        })
        .unwrap();
        ui.sync();
        assert_eq!(*flag.lock().unwrap(), Some(true));
        assert!(!ui.is_ui_thread());
    }

    #[test]
    fn posts_from_many_threads_all_run() {
        let ui = UiHandle::spawn().unwrap();
        let count = Arc::new(Mutex::new(0));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let ui = ui.clone();
                let count = count.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let count = count.clone();
                        ui.post(move || *count.lock().unwrap() += 1).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        ui.sync();
        assert_eq!(*count.lock().unwrap(), 100);
    }
}
