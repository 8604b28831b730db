//! Per-toast display agent: owns the element and its placement, and performs
//! attach/detach on the UI thread.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use extoast_shared::models::Gravity;
use parking_lot::Mutex;

use crate::context::Platform;
use crate::error::DisplayError;
use crate::looper::UiHandle;
use crate::params::{PlacementParams, WindowType};
use crate::platform::{Element, SurfaceHost};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of a displayable for queue membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayToken(u64);

impl DisplayToken {
    pub fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DisplayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The show/hide capability the queue manager schedules.
pub trait Displayable: Send + Sync {
    fn token(&self) -> DisplayToken;
    fn show(&self) -> Result<(), DisplayError>;
    fn hide(&self) -> Result<(), DisplayError>;
}

/// Caller-facing placement configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub gravity: Gravity,
    pub x: i32,
    pub y: i32,
    pub horizontal_margin: f32,
    pub vertical_margin: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            gravity: Gravity::BOTTOM_CENTER,
            x: 0,
            y: 0,
            horizontal_margin: 0.0,
            vertical_margin: 0.0,
        }
    }
}

struct AgentState {
    placement: Placement,
    params: PlacementParams,
    /// Element currently on the surface.
    view: Option<Element>,
    /// Element the next attach should put on the surface.
    pending: Option<Element>,
    surface: Option<Arc<dyn SurfaceHost>>,
}

pub struct DisplayAgent {
    token: DisplayToken,
    this: Weak<DisplayAgent>,
    ui: UiHandle,
    platform: Arc<Platform>,
    state: Mutex<AgentState>,
}

impl DisplayAgent {
    pub(crate) fn new(ui: UiHandle, platform: Arc<Platform>, placement: Placement) -> Arc<Self> {
        let window_type =
            WindowType::select(platform.skin.is_custom_skin(), platform.platform_level);
        Arc::new_cyclic(|this| DisplayAgent {
            token: DisplayToken::next(),
            this: this.clone(),
            ui,
            platform,
            state: Mutex::new(AgentState {
                placement,
                params: PlacementParams::for_toast(window_type),
                view: None,
                pending: None,
                surface: None,
            }),
        })
    }

    /// Set the element the next attach puts on screen.
    pub fn stage(&self, element: Option<Element>) {
        self.state.lock().pending = element;
    }

    pub fn placement(&self) -> Placement {
        self.state.lock().placement
    }

    pub fn set_gravity(&self, gravity: Gravity, x: i32, y: i32) {
        let mut state = self.state.lock();
        state.placement.gravity = gravity;
        state.placement.x = x;
        state.placement.y = y;
    }

    pub fn set_margin(&self, horizontal: f32, vertical: f32) {
        let mut state = self.state.lock();
        state.placement.horizontal_margin = horizontal;
        state.placement.vertical_margin = vertical;
    }

    pub fn params(&self) -> PlacementParams {
        self.state.lock().params.clone()
    }

    /// The element currently on the surface, if any.
    pub fn attached(&self) -> Option<Element> {
        self.state.lock().view.clone()
    }

    fn handle_show(&self) {
        // The surface host is only called with the state lock released.
        let (old, pending, cached) = {
            let mut state = self.state.lock();
            if state.view == state.pending {
                return;
            }
            (
                state.view.take(),
                state.pending.clone(),
                state.surface.clone(),
            )
        };

        // remove the old view if necessary
        if let Some(old) = old {
            Self::detach_from(cached.as_ref(), old);
        }

        let Some(view) = pending else {
            log::debug!("[agent] {} nothing staged to attach", self.token);
            return;
        };

        let surface = match cached.or_else(|| self.platform.surfaces.surface_host()) {
            Some(surface) => surface,
            None => {
                log::warn!(
                    "[agent] {} surface host unavailable, element {} not shown",
                    self.token,
                    view.id()
                );
                return;
            }
        };

        let direction = self.platform.locale.layout_direction();
        let params = {
            let mut state = self.state.lock();
            state.surface = Some(surface.clone());
            let placement = state.placement;
            let gravity = placement.gravity.resolve(direction);
            let params = &mut state.params;
            params.gravity = gravity;
            params.horizontal_weight = if gravity.fills_horizontal() { 1.0 } else { 0.0 };
            params.vertical_weight = if gravity.fills_vertical() { 1.0 } else { 0.0 };
            params.x = placement.x;
            params.y = placement.y;
            params.horizontal_margin = placement.horizontal_margin;
            params.vertical_margin = placement.vertical_margin;
            params.clone()
        };

        if view.has_parent() {
            if let Err(e) = surface.remove_element(&view) {
                log::debug!("[agent] {} stale parent removal: {}", self.token, e);
            }
            view.set_has_parent(false);
        }

        match surface.add_element(&view, &params) {
            Ok(()) => {
                view.set_has_parent(true);
                log::debug!(
                    "[agent] {} attached element {} at {}",
                    self.token,
                    view.id(),
                    params.gravity
                );
                self.state.lock().view = Some(view);
            }
            Err(e) => {
                log::warn!(
                    "[agent] {} failed to attach element {}: {}",
                    self.token,
                    view.id(),
                    e
                );
            }
        }
    }

    /// Detach only; the staged element stays so a later show can reattach it.
    fn handle_hide(&self) {
        let (view, surface) = {
            let mut state = self.state.lock();
            (state.view.take(), state.surface.clone())
        };
        if let Some(view) = view {
            Self::detach_from(surface.as_ref(), view);
        }
    }

    fn detach_from(surface: Option<&Arc<dyn SurfaceHost>>, view: Element) {
        // The element may already be gone from the surface; only remove it
        // while it still reports a parent.
        if view.has_parent() {
            if let Some(surface) = surface {
                if let Err(e) = surface.remove_element(&view) {
                    log::debug!("[agent] detach of element {}: {}", view.id(), e);
                }
            }
            view.set_has_parent(false);
        }
        log::debug!("[agent] detached element {}", view.id());
    }
}

impl Displayable for DisplayAgent {
    fn token(&self) -> DisplayToken {
        self.token
    }

    /// Schedule the attach on the UI thread.
    fn show(&self) -> Result<(), DisplayError> {
        let Some(agent) = self.this.upgrade() else {
            return Ok(());
        };
        self.ui.post(move || agent.handle_show())
    }

    /// Schedule the detach on the UI thread.
    fn hide(&self) -> Result<(), DisplayError> {
        let Some(agent) = self.this.upgrade() else {
            return Ok(());
        };
        self.ui.post(move || agent.handle_hide())
    }
}

impl fmt::Debug for DisplayAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayAgent")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
