use extoast_shared::models::ResId;
use thiserror::Error;

/// Errors surfaced to callers building and configuring toasts.
#[derive(Debug, Error)]
pub enum ToastError {
    /// `show()` was requested before any content element was set.
    #[error("set_view must have been called before show")]
    MissingContent,
    /// `set_text` on a toast whose element has no message slot.
    #[error("this toast was not created with make_text")]
    NotTextToast,
    /// A text resource id did not resolve.
    #[error("text resource not found: {0}")]
    ResourceNotFound(ResId),
    /// A worker thread could not be started.
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to deliver a show/hide signal to a displayable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// The UI thread has stopped accepting work.
    #[error("ui thread is no longer running")]
    UiThreadGone,
}

/// Failures reported by a surface host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface host unavailable")]
    Unavailable,
    #[error("element is not attached to this surface")]
    NotAttached,
    #[error("surface host rejected element: {0}")]
    Rejected(String),
}
