use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Duration marker requesting the short display window.
pub const LENGTH_SHORT: i64 = 0;
/// Duration marker requesting the long display window.
pub const LENGTH_LONG: i64 = 1;

pub const DEFAULT_SHORT_MS: u64 = 1500;
pub const DEFAULT_LONG_MS: u64 = 2500;

/// Canonical display windows that raw duration input is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    short_ms: u64,
    long_ms: u64,
}

impl DurationPolicy {
    /// Return `None` unless `0 < short_ms < long_ms`.
    pub fn new(short_ms: u64, long_ms: u64) -> Option<Self> {
        if short_ms > 0 && long_ms > short_ms {
            Some(Self { short_ms, long_ms })
        } else {
            None
        }
    }

    pub fn short_ms(&self) -> u64 {
        self.short_ms
    }

    pub fn long_ms(&self) -> u64 {
        self.long_ms
    }

    /// Factory-path normalization: the long marker maps to the long window,
    /// every other input is clamped to the short window.
    pub fn clamp_marker(&self, raw: i64) -> u64 {
        if raw == LENGTH_LONG {
            self.long_ms
        } else {
            self.short_ms
        }
    }

    /// Setter-path normalization: markers map to their windows, zero and
    /// negative input map to the short window, other values pass through.
    pub fn normalize(&self, raw: i64) -> u64 {
        match raw {
            LENGTH_LONG => self.long_ms,
            r if r <= LENGTH_SHORT => self.short_ms,
            r => r as u64,
        }
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            short_ms: DEFAULT_SHORT_MS,
            long_ms: DEFAULT_LONG_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalGravity {
    Left,
    Right,
    /// Left in LTR layouts, right in RTL layouts.
    Start,
    /// Right in LTR layouts, left in RTL layouts.
    End,
    Center,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalGravity {
    Top,
    Bottom,
    Center,
    Fill,
}

/// Horizontal gravity after `Start`/`End` have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsoluteHorizontal {
    Left,
    Right,
    Center,
    Fill,
}

/// Relative placement of a toast on its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gravity {
    pub horizontal: HorizontalGravity,
    pub vertical: VerticalGravity,
}

impl Gravity {
    pub const BOTTOM_CENTER: Gravity = Gravity {
        horizontal: HorizontalGravity::Center,
        vertical: VerticalGravity::Bottom,
    };

    pub fn new(horizontal: HorizontalGravity, vertical: VerticalGravity) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn resolve(self, direction: LayoutDirection) -> AbsoluteGravity {
        let horizontal = match (self.horizontal, direction) {
            (HorizontalGravity::Left, _) => AbsoluteHorizontal::Left,
            (HorizontalGravity::Right, _) => AbsoluteHorizontal::Right,
            (HorizontalGravity::Center, _) => AbsoluteHorizontal::Center,
            (HorizontalGravity::Fill, _) => AbsoluteHorizontal::Fill,
            (HorizontalGravity::Start, LayoutDirection::Ltr)
            | (HorizontalGravity::End, LayoutDirection::Rtl) => AbsoluteHorizontal::Left,
            (HorizontalGravity::Start, LayoutDirection::Rtl)
            | (HorizontalGravity::End, LayoutDirection::Ltr) => AbsoluteHorizontal::Right,
        };
        AbsoluteGravity {
            horizontal,
            vertical: self.vertical,
        }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::BOTTOM_CENTER
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            VerticalGravity::Top => "top",
            VerticalGravity::Bottom => "bottom",
            VerticalGravity::Center => "center_vertical",
            VerticalGravity::Fill => "fill_vertical",
        };
        let horizontal = match self.horizontal {
            HorizontalGravity::Left => "left",
            HorizontalGravity::Right => "right",
            HorizontalGravity::Start => "start",
            HorizontalGravity::End => "end",
            HorizontalGravity::Center => "center_horizontal",
            HorizontalGravity::Fill => "fill_horizontal",
        };
        write!(f, "{}-{}", vertical, horizontal)
    }
}

const TWO_WORD_TOKENS: [&str; 4] = [
    "center_horizontal",
    "center_vertical",
    "fill_horizontal",
    "fill_vertical",
];

/// Parse gravity strings such as `bottom`, `top-start`, `center`,
/// `fill-horizontal`, `fill_horizontal|bottom`. Tokens are separated by `-`
/// or `|`; the bare `center` and `fill` tokens apply to every axis not named
/// explicitly.
impl FromStr for Gravity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[derive(Clone, Copy)]
        enum Both {
            Center,
            Fill,
        }

        let mut horizontal: Option<HorizontalGravity> = None;
        let mut vertical: Option<VerticalGravity> = None;
        let mut both: Option<Both> = None;

        // Two-word axis tokens may be written with a hyphen, which is also a
        // separator.
        let normalized = TWO_WORD_TOKENS
            .iter()
            .fold(s.to_ascii_lowercase(), |acc, token| {
                acc.replace(&token.replace('_', "-"), token)
            });

        for token in normalized.split(['-', '|']).map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let (h, v) = match token {
                "left" => (Some(HorizontalGravity::Left), None),
                "right" => (Some(HorizontalGravity::Right), None),
                "start" => (Some(HorizontalGravity::Start), None),
                "end" => (Some(HorizontalGravity::End), None),
                "center_horizontal" => (Some(HorizontalGravity::Center), None),
                "fill_horizontal" => (Some(HorizontalGravity::Fill), None),
                "top" => (None, Some(VerticalGravity::Top)),
                "bottom" => (None, Some(VerticalGravity::Bottom)),
                "center_vertical" => (None, Some(VerticalGravity::Center)),
                "fill_vertical" => (None, Some(VerticalGravity::Fill)),
                "center" => {
                    both = Some(Both::Center);
                    (None, None)
                }
                "fill" => {
                    both = Some(Both::Fill);
                    (None, None)
                }
                other => return Err(format!("Invalid gravity token: {}", other)),
            };
            if let Some(h) = h {
                if horizontal.replace(h).is_some() {
                    return Err(format!("Conflicting horizontal gravity in '{}'", s));
                }
            }
            if let Some(v) = v {
                if vertical.replace(v).is_some() {
                    return Err(format!("Conflicting vertical gravity in '{}'", s));
                }
            }
        }

        if horizontal.is_none() && vertical.is_none() && both.is_none() {
            return Err(format!("Invalid gravity: '{}'", s));
        }

        let horizontal = horizontal.unwrap_or(match both {
            Some(Both::Fill) => HorizontalGravity::Fill,
            _ => HorizontalGravity::Center,
        });
        let vertical = vertical.unwrap_or(match both {
            Some(Both::Fill) => VerticalGravity::Fill,
            _ => VerticalGravity::Center,
        });
        Ok(Gravity::new(horizontal, vertical))
    }
}

/// Gravity with the layout direction applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteGravity {
    pub horizontal: AbsoluteHorizontal,
    pub vertical: VerticalGravity,
}

impl AbsoluteGravity {
    pub fn fills_horizontal(&self) -> bool {
        self.horizontal == AbsoluteHorizontal::Fill
    }

    pub fn fills_vertical(&self) -> bool {
        self.vertical == VerticalGravity::Fill
    }
}

impl Default for AbsoluteGravity {
    fn default() -> Self {
        Gravity::BOTTOM_CENTER.resolve(LayoutDirection::Ltr)
    }
}

impl fmt::Display for AbsoluteGravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let horizontal = match self.horizontal {
            AbsoluteHorizontal::Left => HorizontalGravity::Left,
            AbsoluteHorizontal::Right => HorizontalGravity::Right,
            AbsoluteHorizontal::Center => HorizontalGravity::Center,
            AbsoluteHorizontal::Fill => HorizontalGravity::Fill,
        };
        Gravity::new(horizontal, self.vertical).fmt(f)
    }
}

/// Identifier of a text resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResId(pub String);

impl ResId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_marker_zero_and_negative_normalize_to_short() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.normalize(LENGTH_SHORT), 1500);
        assert_eq!(policy.normalize(0), 1500);
        assert_eq!(policy.normalize(-20), 1500);
        assert_eq!(policy.normalize(LENGTH_LONG), 2500);
    }

    #[test]
    fn explicit_positive_duration_passes_through() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.normalize(700), 700);
        assert_eq!(policy.normalize(4000), 4000);
    }

    #[test]
    fn factory_path_clamps_non_markers_to_short() {
        let policy = DurationPolicy::default();
        assert_eq!(policy.clamp_marker(LENGTH_LONG), 2500);
        assert_eq!(policy.clamp_marker(LENGTH_SHORT), 1500);
        assert_eq!(policy.clamp_marker(4000), 1500);
        assert_eq!(policy.clamp_marker(-1), 1500);
    }

    #[test]
    fn policy_rejects_inverted_windows() {
        assert!(DurationPolicy::new(2500, 1500).is_none());
        assert!(DurationPolicy::new(0, 1500).is_none());
        assert!(DurationPolicy::new(1000, 1000).is_none());
        assert_eq!(DurationPolicy::new(800, 1600).unwrap().long_ms(), 1600);
    }

    #[test]
    fn start_and_end_follow_layout_direction() {
        let start = Gravity::new(HorizontalGravity::Start, VerticalGravity::Top);
        assert_eq!(
            start.resolve(LayoutDirection::Ltr).horizontal,
            AbsoluteHorizontal::Left
        );
        assert_eq!(
            start.resolve(LayoutDirection::Rtl).horizontal,
            AbsoluteHorizontal::Right
        );

        let end = Gravity::new(HorizontalGravity::End, VerticalGravity::Top);
        assert_eq!(
            end.resolve(LayoutDirection::Rtl).horizontal,
            AbsoluteHorizontal::Left
        );
    }

    #[test]
    fn absolute_gravity_is_direction_independent() {
        let right = Gravity::new(HorizontalGravity::Right, VerticalGravity::Bottom);
        assert_eq!(
            right.resolve(LayoutDirection::Ltr),
            right.resolve(LayoutDirection::Rtl)
        );
    }

    #[test]
    fn parse_gravity_strings() {
        assert_eq!("bottom".parse::<Gravity>().unwrap(), Gravity::BOTTOM_CENTER);
        assert_eq!(
            "top-start".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Start, VerticalGravity::Top)
        );
        assert_eq!(
            "center".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Center, VerticalGravity::Center)
        );
        assert_eq!(
            "fill_horizontal|bottom".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Fill, VerticalGravity::Bottom)
        );
        assert_eq!(
            "fill".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Fill, VerticalGravity::Fill)
        );
        assert_eq!(
            "fill-horizontal".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Fill, VerticalGravity::Center)
        );
        assert_eq!(
            "center-vertical".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Center, VerticalGravity::Center)
        );
        assert_eq!(
            "top-fill-horizontal".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Fill, VerticalGravity::Top)
        );
        assert_eq!(
            "center-vertical-end".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::End, VerticalGravity::Center)
        );
        assert_eq!(
            "Fill-Vertical|left".parse::<Gravity>().unwrap(),
            Gravity::new(HorizontalGravity::Left, VerticalGravity::Fill)
        );
    }

    #[test]
    fn parse_gravity_rejects_garbage() {
        assert!("".parse::<Gravity>().is_err());
        assert!("sideways".parse::<Gravity>().is_err());
        assert!("left-right".parse::<Gravity>().is_err());
    }

    #[test]
    fn gravity_display_parses_back() {
        let g = Gravity::new(HorizontalGravity::End, VerticalGravity::Fill);
        assert_eq!(g.to_string().parse::<Gravity>().unwrap(), g);
    }

    #[test]
    fn fill_flags() {
        let g = "fill_horizontal-top"
            .parse::<Gravity>()
            .unwrap()
            .resolve(LayoutDirection::Ltr);
        assert!(g.fills_horizontal());
        assert!(!g.fills_vertical());
    }
}
