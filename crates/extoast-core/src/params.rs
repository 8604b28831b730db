//! Low-level surface attachment parameters.

use std::ops::BitOr;

use extoast_shared::models::AbsoluteGravity;

pub const FIRST_SYSTEM_WINDOW: i32 = 2000;

/// Platform level from which the toast window type is rejected for
/// background-originated windows and the phone type is used instead.
pub const PHONE_WINDOW_MIN_LEVEL: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Toast,
    Phone,
    /// System overlay slot the customized skin honours for toasts.
    SkinOverlay,
}

impl WindowType {
    pub fn select(custom_skin: bool, platform_level: u32) -> Self {
        if custom_skin {
            WindowType::SkinOverlay
        } else if platform_level >= PHONE_WINDOW_MIN_LEVEL {
            WindowType::Phone
        } else {
            WindowType::Toast
        }
    }

    pub fn code(self) -> i32 {
        match self {
            WindowType::Phone => FIRST_SYSTEM_WINDOW + 2,
            WindowType::Toast => FIRST_SYSTEM_WINDOW + 5,
            WindowType::SkinOverlay => FIRST_SYSTEM_WINDOW + 37,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindowType::Toast => "toast",
            WindowType::Phone => "phone",
            WindowType::SkinOverlay => "skin-overlay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowFlags(u32);

impl WindowFlags {
    pub const NOT_FOCUSABLE: WindowFlags = WindowFlags(0x0000_0008);
    pub const NOT_TOUCHABLE: WindowFlags = WindowFlags(0x0000_0010);
    pub const KEEP_SCREEN_ON: WindowFlags = WindowFlags(0x0000_0080);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: WindowFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WindowFlags {
    type Output = WindowFlags;

    fn bitor(self, rhs: WindowFlags) -> WindowFlags {
        WindowFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    WrapContent,
    MatchParent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Opaque,
    Translucent,
}

/// Enter/exit animation style applied by the surface host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowAnimation {
    None,
    #[default]
    Toast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementParams {
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub format: PixelFormat,
    pub title: String,
    pub flags: WindowFlags,
    pub animation: WindowAnimation,
    pub window_type: WindowType,
    pub gravity: AbsoluteGravity,
    pub x: i32,
    pub y: i32,
    pub horizontal_weight: f32,
    pub vertical_weight: f32,
    pub horizontal_margin: f32,
    pub vertical_margin: f32,
}

impl PlacementParams {
    /// Translucent, wrap-content, non-interactive window that keeps the screen on
/// and uses the toast animation.
    pub fn for_toast(window_type: WindowType) -> Self {
        Self {
            width: SizeSpec::WrapContent,
            height: SizeSpec::WrapContent,
            format: PixelFormat::Translucent,
            title: "Toast".to_string(),
            flags: WindowFlags::KEEP_SCREEN_ON
                | WindowFlags::NOT_FOCUSABLE
                | WindowFlags::NOT_TOUCHABLE,
            animation: WindowAnimation::Toast,
            window_type,
            gravity: AbsoluteGravity::default(),
            x: 0,
            y: 0,
            horizontal_weight: 0.0,
            vertical_weight: 0.0,
            horizontal_margin: 0.0,
            vertical_margin: 0.0,
        }
    }
}
