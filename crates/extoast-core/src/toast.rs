use std::sync::Arc;
use std::time::Duration;

use extoast_shared::models::{Gravity, ResId};

use crate::agent::{DisplayAgent, DisplayToken, Displayable, Placement};
use crate::context::Context;
use crate::error::ToastError;
use crate::params::PlacementParams;
use crate::platform::Element;

/// A toast as the caller sees it: content, duration and placement.
///
/// ```ignore
/// let toast = ctx.make_text("Saved", LENGTH_SHORT);
/// toast.show()?;
/// ```
pub struct ToastRequest {
    ctx: Context,
    agent: Arc<DisplayAgent>,
    view: Option<Element>,
    duration_ms: u64,
}

impl ToastRequest {
    /// An empty toast with the context's default placement and the short
    /// duration. Content must be set with [`ToastRequest::set_view`].
    pub fn new(ctx: &Context) -> Self {
        let defaults = ctx.defaults();
        let placement = Placement {
            gravity: defaults.gravity,
            x: 0,
            y: ctx.dip_to_px(defaults.y_offset_dp),
            horizontal_margin: defaults.horizontal_margin,
            vertical_margin: defaults.vertical_margin,
        };
        let agent = DisplayAgent::new(ctx.ui().clone(), ctx.platform().clone(), placement);
        Self {
            ctx: ctx.clone(),
            agent,
            view: None,
            duration_ms: ctx.durations().short_ms(),
        }
    }

    /// A text toast. Any duration other than the long marker is clamped to
    /// the short window.
    pub fn make_text(ctx: &Context, text: impl Into<String>, duration: i64) -> Self {
        let mut toast = Self::new(ctx);
        toast.view = Some(Element::text(text));
        toast.duration_ms = ctx.durations().clamp_marker(duration);
        toast
    }

    pub fn make_text_res(ctx: &Context, id: &ResId, duration: i64) -> Result<Self, ToastError> {
        let text = ctx.text(id)?;
        Ok(Self::make_text(ctx, text, duration))
    }

    /// Queue the toast for display.
    pub fn show(&self) -> Result<(), ToastError> {
        let view = self.view.clone().ok_or(ToastError::MissingContent)?;
        self.agent.stage(Some(view));
        self.ctx.manager().enqueue(
            self.agent.clone(),
            Duration::from_millis(self.duration_ms),
        );
        Ok(())
    }

    /// Hide the toast if visible and drop it from the queue.
    pub fn cancel(&self) {
        if let Err(e) = self.agent.hide() {
            log::warn!("[toast] {} hide on cancel failed: {}", self.agent.token(), e);
        }
        self.ctx.manager().cancel(self.agent.as_ref());
    }

    pub fn set_view(&mut self, view: Element) {
        self.view = Some(view);
    }

    pub fn view(&self) -> Option<&Element> {
        self.view.as_ref()
    }

    /// Set the display duration. Markers map to their windows, zero and
    /// negative values to the short window; other values are milliseconds.
    pub fn set_duration(&mut self, duration: i64) {
        self.duration_ms = self.ctx.durations().normalize(duration);
    }

    /// Display duration in milliseconds.
    pub fn duration(&self) -> u64 {
        self.duration_ms
    }

    pub fn set_margin(&self, horizontal: f32, vertical: f32) {
        self.agent.set_margin(horizontal, vertical);
    }

    pub fn horizontal_margin(&self) -> f32 {
        self.agent.placement().horizontal_margin
    }

    pub fn vertical_margin(&self) -> f32 {
        self.agent.placement().vertical_margin
    }

    pub fn set_gravity(&self, gravity: Gravity, x_offset: i32, y_offset: i32) {
        self.agent.set_gravity(gravity, x_offset, y_offset);
    }

    pub fn gravity(&self) -> Gravity {
        self.agent.placement().gravity
    }

    pub fn x_offset(&self) -> i32 {
        self.agent.placement().x
    }

    pub fn y_offset(&self) -> i32 {
        self.agent.placement().y
    }

    /// Surface attachment parameters as of the last attach.
    pub fn placement_params(&self) -> PlacementParams {
        self.agent.params()
    }

    /// Replace the message text of a toast built with `make_text`.
    pub fn set_text(&self, text: impl Into<String>) -> Result<(), ToastError> {
        let view = self.view.as_ref().ok_or(ToastError::NotTextToast)?;
        if view.set_message(text) {
            Ok(())
        } else {
            Err(ToastError::NotTextToast)
        }
    }

    pub fn set_text_res(&self, id: &ResId) -> Result<(), ToastError> {
        let text = self.ctx.text(id)?;
        self.set_text(text)
    }

    pub fn token(&self) -> DisplayToken {
        self.agent.token()
    }

    /// Whether the toast's element is currently on the surface.
    pub fn is_showing(&self) -> bool {
        self.agent.attached().is_some()
    }
}

impl std::fmt::Debug for ToastRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastRequest")
            .field("token", &self.agent.token())
            .field("view", &self.view)
            .field("duration_ms", &self.duration_ms)
            .finish()
    }
}
