//! Serialized, duration-bounded toast display.
//!
//! A [`Context`] is built once at startup. Toasts created from it are queued
//! by its [`ToastManager`], which keeps at most one on screen at a time and
//! advances when the visible one's duration runs out. All surface mutations
//! happen on the context's UI thread.

pub mod agent;
pub mod context;
pub mod error;
pub mod looper;
pub mod manager;
pub mod params;
pub mod platform;
pub mod record;
pub mod scheduler;
pub mod toast;

pub use agent::{DisplayAgent, DisplayToken, Displayable, Placement};
pub use context::{Context, ContextBuilder, ToastDefaults};
pub use error::{DisplayError, SurfaceError, ToastError};
pub use looper::UiHandle;
pub use manager::ToastManager;
pub use params::{PlacementParams, WindowAnimation, WindowType};
pub use platform::{
    Element, ElementId, LocaleProvider, ResourceResolver, SkinDetector, StringTable, SurfaceHost,
    SurfaceProvider,
};
pub use toast::ToastRequest;

pub use extoast_shared::models::{Gravity, LayoutDirection, ResId, LENGTH_LONG, LENGTH_SHORT};
