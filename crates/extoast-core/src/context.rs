//! Process-scoped toast environment, built once at startup and handed to
//! every toast factory call.

use std::sync::Arc;

use extoast_shared::config::AppConfig;
use extoast_shared::models::{DurationPolicy, Gravity, LayoutDirection, ResId};

use crate::error::ToastError;
use crate::looper::UiHandle;
use crate::manager::ToastManager;
use crate::platform::{
    FixedSurface, LocaleProvider, NoSurface, ResourceResolver, SkinDetector, StaticSkin,
    StringTable, SurfaceHost, SurfaceProvider,
};
use crate::toast::ToastRequest;

/// Collaborators shared by every display agent.
pub(crate) struct Platform {
    pub(crate) surfaces: Arc<dyn SurfaceProvider>,
    pub(crate) skin: Arc<dyn SkinDetector>,
    pub(crate) locale: Arc<dyn LocaleProvider>,
    pub(crate) resources: Arc<dyn ResourceResolver>,
    pub(crate) density: f32,
    pub(crate) platform_level: u32,
}

/// Placement applied to newly created toasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToastDefaults {
    pub gravity: Gravity,
    /// Offset from the anchored edge in density-independent units.
    pub y_offset_dp: f32,
    pub horizontal_margin: f32,
    pub vertical_margin: f32,
}

impl Default for ToastDefaults {
    fn default() -> Self {
        Self {
            gravity: Gravity::BOTTOM_CENTER,
            y_offset_dp: 64.0,
            horizontal_margin: 0.0,
            vertical_margin: 0.0,
        }
    }
}

struct ContextInner {
    platform: Arc<Platform>,
    ui: UiHandle,
    manager: Arc<ToastManager>,
    durations: DurationPolicy,
    defaults: ToastDefaults,
}

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn manager(&self) -> &Arc<ToastManager> {
        &self.inner.manager
    }

    pub fn ui(&self) -> &UiHandle {
        &self.inner.ui
    }

    pub fn durations(&self) -> DurationPolicy {
        self.inner.durations
    }

    pub fn defaults(&self) -> ToastDefaults {
        self.inner.defaults
    }

    pub(crate) fn platform(&self) -> &Arc<Platform> {
        &self.inner.platform
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        self.inner.platform.locale.layout_direction()
    }

    /// Convert density-independent units to pixels, rounding half up.
    pub fn dip_to_px(&self, dp: f32) -> i32 {
        (dp * self.inner.platform.density + 0.5) as i32
    }

    pub fn text(&self, id: &ResId) -> Result<String, ToastError> {
        self.inner
            .platform
            .resources
            .text(id)
            .ok_or_else(|| ToastError::ResourceNotFound(id.clone()))
    }

    pub fn make_text(&self, text: impl Into<String>, duration: i64) -> ToastRequest {
        ToastRequest::make_text(self, text, duration)
    }

    pub fn make_text_res(&self, id: &ResId, duration: i64) -> Result<ToastRequest, ToastError> {
        ToastRequest::make_text_res(self, id, duration)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("durations", &self.inner.durations)
            .field("defaults", &self.inner.defaults)
            .field("density", &self.inner.platform.density)
            .field("platform_level", &self.inner.platform.platform_level)
            .finish_non_exhaustive()
    }
}

pub struct ContextBuilder {
    surfaces: Arc<dyn SurfaceProvider>,
    skin: Arc<dyn SkinDetector>,
    locale: Arc<dyn LocaleProvider>,
    resources: Arc<dyn ResourceResolver>,
    density: f32,
    platform_level: u32,
    durations: DurationPolicy,
    defaults: ToastDefaults,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            surfaces: Arc::new(NoSurface),
            skin: Arc::new(StaticSkin(false)),
            locale: Arc::new(LayoutDirection::Ltr),
            resources: Arc::new(StringTable::new()),
            density: 1.0,
            platform_level: 28,
            durations: DurationPolicy::default(),
            defaults: ToastDefaults::default(),
        }
    }
}

impl ContextBuilder {
    /// Seed durations, placement defaults, display environment and text
    /// resources from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::default()
            .durations(config.toast.duration_policy())
            .defaults(ToastDefaults {
                gravity: config.toast.gravity(),
                y_offset_dp: config.toast.y_offset_dp,
                horizontal_margin: config.toast.horizontal_margin,
                vertical_margin: config.toast.vertical_margin,
            })
            .density(config.display.density)
            .platform_level(config.display.platform_level)
            .skin_detector(Arc::new(StaticSkin(config.display.custom_skin)))
            .locale(Arc::new(config.display.layout_direction()))
            .resources(Arc::new(StringTable::from(config.strings.clone())))
    }

    pub fn surface_host(self, host: Arc<dyn SurfaceHost>) -> Self {
        self.surface_provider(Arc::new(FixedSurface(host)))
    }

    pub fn surface_provider(mut self, provider: Arc<dyn SurfaceProvider>) -> Self {
        self.surfaces = provider;
        self
    }

    pub fn skin_detector(mut self, skin: Arc<dyn SkinDetector>) -> Self {
        self.skin = skin;
        self
    }

    pub fn locale(mut self, locale: Arc<dyn LocaleProvider>) -> Self {
        self.locale = locale;
        self
    }

    pub fn resources(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = resources;
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        if density > 0.0 {
            self.density = density;
        } else {
            log::warn!("Ignoring non-positive display density {}", density);
        }
        self
    }

    pub fn platform_level(mut self, level: u32) -> Self {
        self.platform_level = level;
        self
    }

    pub fn durations(mut self, durations: DurationPolicy) -> Self {
        self.durations = durations;
        self
    }

    pub fn defaults(mut self, defaults: ToastDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Start the UI and timer threads and assemble the context.
    pub fn build(self) -> Result<Context, ToastError> {
        let ui = UiHandle::spawn()?;
        let manager = ToastManager::new()?;
        log::info!(
            "toast context ready (short={}ms long={}ms level={} density={})",
            self.durations.short_ms(),
            self.durations.long_ms(),
            self.platform_level,
            self.density
        );
        Ok(Context {
            inner: Arc::new(ContextInner {
                platform: Arc::new(Platform {
                    surfaces: self.surfaces,
                    skin: self.skin,
                    locale: self.locale,
                    resources: self.resources,
                    density: self.density,
                    platform_level: self.platform_level,
                }),
                ui,
                manager,
                durations: self.durations,
                defaults: self.defaults,
            }),
        })
    }
}
