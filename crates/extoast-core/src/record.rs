use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::agent::{DisplayToken, Displayable};

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(u64);

impl RecordId {
    fn next() -> Self {
        Self(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A queued toast: the displayable plus how long it stays on screen.
#[derive(Clone)]
pub struct ToastRecord {
    pub(crate) id: RecordId,
    pub(crate) handle: Arc<dyn Displayable>,
    pub(crate) duration: Duration,
    /// Generation of the timeout currently pending for this record.
    pub(crate) timeout: Option<u64>,
}

impl ToastRecord {
    pub(crate) fn new(handle: Arc<dyn Displayable>, duration: Duration) -> Self {
        Self {
            id: RecordId::next(),
            handle,
            duration,
            timeout: None,
        }
    }

    pub(crate) fn update(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn token(&self) -> DisplayToken {
        self.handle.token()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Debug for ToastRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastRecord")
            .field("id", &self.id)
            .field("token", &self.token())
            .field("duration", &self.duration)
            .finish()
    }
}
