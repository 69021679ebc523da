//! # Editor Configuration
//!
//! Playback speed and snapping tolerances, loaded from YAML.
//!
//! ```yaml
//! speed: 4.0
//! snap:
//!   tick-tolerance: 40
//!   position-tolerance-px: 8.0
//!   lane-divisions: 16
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use crate::error::ChartError;
use serde::Deserialize;

/// Speed used when none is configured or the entered value is unusable.
pub const DEFAULT_SPEED: f64 = 4.0;

/// Raw YAML shape, before range checks.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    speed: Option<f64>,
    snap: Option<RawSnap>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawSnap {
    tick_tolerance: Option<i32>,
    position_tolerance_px: Option<f64>,
    lane_divisions: Option<i32>,
}

/// Snapping behaviour of the drag editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapConfig {
    /// A dragged edge within this many ticks of a grid tick lands on it.
    pub tick_tolerance: i32,
    /// A dragged edge within this many pixels of a lane gridline lands on it.
    pub position_tolerance_px: f64,
    /// Number of lateral gridlines across the full lane width.
    pub lane_divisions: i32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            tick_tolerance: 40,
            position_tolerance_px: 8.0,
            lane_divisions: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub speed: f64,
    pub snap: SnapConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            snap: SnapConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and range-check a YAML configuration document.
    pub fn from_yaml(content: &str) -> Result<Self, ChartError> {
        let raw: Option<RawConfig> =
            serde_yaml::from_str(content).map_err(|e| ChartError::Config(e.to_string()))?;
        let raw = raw.unwrap_or_default();

        let defaults = EditorConfig::default();
        let raw_snap = raw.snap.unwrap_or_default();
        let config = EditorConfig {
            speed: raw.speed.unwrap_or(defaults.speed),
            snap: SnapConfig {
                tick_tolerance: raw_snap.tick_tolerance.unwrap_or(defaults.snap.tick_tolerance),
                position_tolerance_px: raw_snap
                    .position_tolerance_px
                    .unwrap_or(defaults.snap.position_tolerance_px),
                lane_divisions: raw_snap.lane_divisions.unwrap_or(defaults.snap.lane_divisions),
            },
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ChartError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ChartError::Config(format!("speed must be positive, got {}", self.speed)));
        }
        if self.snap.tick_tolerance < 0 {
            return Err(ChartError::Config(format!(
                "snap tick-tolerance must not be negative, got {}",
                self.snap.tick_tolerance
            )));
        }
        if !(self.snap.position_tolerance_px.is_finite() && self.snap.position_tolerance_px >= 0.0) {
            return Err(ChartError::Config(format!(
                "snap position-tolerance-px must not be negative, got {}",
                self.snap.position_tolerance_px
            )));
        }
        if self.snap.lane_divisions < 1 {
            return Err(ChartError::Config(format!(
                "snap lane-divisions must be at least 1, got {}",
                self.snap.lane_divisions
            )));
        }
        Ok(())
    }
}

/// Parse a speed typed by the user.
///
/// Like a browser's `parseFloat`, leading whitespace is skipped and the
/// longest leading decimal number is read, so `"2x"` is 2. Anything that
/// does not start with a positive finite number falls back to
/// [`DEFAULT_SPEED`]; `"Infinity"` is not accepted.
pub fn parse_speed(text: &str) -> f64 {
    let text = text.trim_start();
    let number = &text[..numeric_prefix_len(text)];
    match number.parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => speed,
        _ => DEFAULT_SPEED,
    }
}

/// Byte length of the decimal number `text` starts with, or 0.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return 0;
    }
    // an exponent only counts with at least one digit
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

/// Render a speed for display: whole numbers keep a trailing `.0`.
pub fn format_speed(speed: f64) -> String {
    if speed.fract() == 0.0 {
        format!("{:.1}", speed)
    } else {
        speed.to_string()
    }
}
