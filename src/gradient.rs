//! Truecolour gradient mode.
//!
//! Instead of picking from the fixed six-colour ramp, a value normalised to
//! `0.0..=1.0` is mapped onto a hue between green (0.0) and red (1.0) and
//! printed as `#rrggbb`.

use colorsys::{Hsl, Rgb};
use log::warn;

use crate::config::GradientConfig;

const LEFT_STOP: f64 = 0.0; // red
const RIGHT_STOP: f64 = 120.0; // green

/// Hue for `fraction`; 0.0 is green, 1.0 is red. Out-of-range input is clamped.
pub fn fraction_to_hue(fraction: f64) -> f64 {
    let f = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    LEFT_STOP + (1.0 - f) * (RIGHT_STOP - LEFT_STOP)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            saturation: 100.0,
            lightness: 50.0,
        }
    }
}

impl From<&GradientConfig> for Gradient {
    fn from(c: &GradientConfig) -> Self {
        Self {
            saturation: c.saturation,
            lightness: c.lightness,
        }
    }
}

impl Gradient {
    pub fn rgb(&self, fraction: f64) -> [u8; 3] {
        let hsl = Hsl::from((fraction_to_hue(fraction), self.saturation, self.lightness));
        Rgb::from(&hsl).into()
    }

    /// `#rrggbb` for `fraction`.
    pub fn color(&self, fraction: f64) -> String {
        let [r, g, b] = self.rgb(fraction);
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// `true` for percentages tmux-applets accepts for saturation and lightness.
pub fn in_range(v: f64) -> bool {
    (0.0..=100.0).contains(&v)
}

/// Parse `{key}:{val}` where `val` is a float.
pub fn parse_param(arg: &str, key: &str) -> Option<f64> {
    let (k, v) = arg.split_once(':')?;
    if k != key {
        return None;
    }
    v.parse::<f64>().ok()
}

/// Positional arguments with the `s:<sat>` / `l:<light>` parameters split off.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppletArgs {
    pub positional: Vec<String>,
    pub saturation: Option<f64>,
    pub lightness: Option<f64>,
    /// Set by any well-formed `s:` or `l:` argument, even a rejected one.
    pub wants_gradient: bool,
}

impl AppletArgs {
    pub fn parse(args: &[String]) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            if let Some(s) = parse_param(arg, "s") {
                parsed.wants_gradient = true;
                if in_range(s) {
                    parsed.saturation = Some(s);
                } else {
                    warn!("saturation {} out of range [0, 100]", s);
                }
                continue;
            }
            if let Some(l) = parse_param(arg, "l") {
                parsed.wants_gradient = true;
                if in_range(l) {
                    parsed.lightness = Some(l);
                } else {
                    warn!("lightness {} out of range [0, 100]", l);
                }
                continue;
            }
            parsed.positional.push(arg.clone());
        }
        parsed
    }

    /// First positional argument; the rest are ignored.
    pub fn first(&self) -> Option<&str> {
        self.positional.first().map(String::as_str)
    }

    /// The gradient to use, if gradient mode is on either by configuration
    /// or by a colour argument.
    pub fn gradient(&self, config: &GradientConfig, enabled: bool) -> Option<Gradient> {
        if !enabled && !self.wants_gradient {
            return None;
        }
        let mut g = Gradient::from(config);
        if let Some(s) = self.saturation {
            g.saturation = s;
        }
        if let Some(l) = self.lightness {
            g.lightness = l;
        }
        Some(g)
    }
}
