//! Collaborators the toast core consumes but does not implement: the surface
//! host that puts elements on screen, the device-skin detector, the locale's
//! layout direction and text resources.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use extoast_shared::models::{LayoutDirection, ResId};
use parking_lot::Mutex;

use crate::error::SurfaceError;
use crate::params::PlacementParams;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct ElementInner {
    id: ElementId,
    label: String,
    message: Option<Mutex<String>>,
    has_parent: AtomicBool,
}

/// A visual element a toast puts on screen. Clones share identity.
///
/// The parent flag mirrors whether the element currently sits on a surface.
/// The display agent keeps it current; a surface host that drops an element
/// on its own should clear it with [`Element::set_has_parent`].
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementInner>,
}

impl Element {
    /// A text element with a message slot, as built by `make_text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::build("message".to_string(), Some(text.into()))
    }

    /// An element with caller-defined content and no message slot.
    pub fn custom(label: impl Into<String>) -> Self {
        Self::build(label.into(), None)
    }

    fn build(label: String, message: Option<String>) -> Self {
        Self {
            inner: Arc::new(ElementInner {
                id: ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed)),
                label,
                message: message.map(Mutex::new),
                has_parent: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn message(&self) -> Option<String> {
        self.inner.message.as_ref().map(|m| m.lock().clone())
    }

    pub fn has_message_slot(&self) -> bool {
        self.inner.message.is_some()
    }

    /// Replace the message text. Returns false when there is no message slot.
    pub fn set_message(&self, text: impl Into<String>) -> bool {
        match &self.inner.message {
            Some(slot) => {
                *slot.lock() = text.into();
                true
            }
            None => false,
        }
    }

    pub fn has_parent(&self) -> bool {
        self.inner.has_parent.load(Ordering::SeqCst)
    }

    pub fn set_has_parent(&self, attached: bool) {
        self.inner.has_parent.store(attached, Ordering::SeqCst);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("message", &self.message())
            .field("has_parent", &self.has_parent())
            .finish()
    }
}

/// The platform service that attaches and removes elements on screen.
/// Only ever called from the UI thread.
pub trait SurfaceHost: Send + Sync {
    fn add_element(&self, element: &Element, params: &PlacementParams) -> Result<(), SurfaceError>;
    fn remove_element(&self, element: &Element) -> Result<(), SurfaceError>;
}

/// Hands out the surface host; `None` while it is unavailable.
pub trait SurfaceProvider: Send + Sync {
    fn surface_host(&self) -> Option<Arc<dyn SurfaceHost>>;
}

/// A provider that always returns the same host.
pub struct FixedSurface(pub Arc<dyn SurfaceHost>);

impl SurfaceProvider for FixedSurface {
    fn surface_host(&self) -> Option<Arc<dyn SurfaceHost>> {
        Some(self.0.clone())
    }
}

/// A provider with no surface at all.
pub struct NoSurface;

impl SurfaceProvider for NoSurface {
    fn surface_host(&self) -> Option<Arc<dyn SurfaceHost>> {
        None
    }
}

/// Reports whether the manufacturer customization that needs the overlay
/// window type is present.
pub trait SkinDetector: Send + Sync {
    fn is_custom_skin(&self) -> bool;
}

pub struct StaticSkin(pub bool);

impl SkinDetector for StaticSkin {
    fn is_custom_skin(&self) -> bool {
        self.0
    }
}

pub trait LocaleProvider: Send + Sync {
    fn layout_direction(&self) -> LayoutDirection;
}

impl LocaleProvider for LayoutDirection {
    fn layout_direction(&self) -> LayoutDirection {
        *self
    }
}

pub trait ResourceResolver: Send + Sync {
    fn text(&self, id: &ResId) -> Option<String>;
}

/// In-memory text resources keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StringTable(HashMap<String, String>);

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.0.insert(id.into(), text.into());
    }
}

impl From<HashMap<String, String>> for StringTable {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl ResourceResolver for StringTable {
    fn text(&self, id: &ResId) -> Option<String> {
        self.0.get(id.as_str()).cloned()
    }
}
