// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// The temperature range mapped onto the color palette.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct ScaleRange {
    pub(crate) min: f32,
    pub(crate) max: f32,
}

impl ScaleRange {
    pub(crate) fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The value halfway between the ends of the range.
    pub(crate) fn midpoint(&self) -> f32 {
        ((self.min as f64 + self.max as f64) / 2.0) as f32
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self::new(15.0, 40.0)
    }
}

/// The weight given to each new observation when smoothing the scale, in the range `(0, 1]`.
///
/// Higher values track the scene more quickly, with `1.0` following every frame exactly.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "f32", into = "f32")]
pub(crate) struct Smoothing(f32);

impl Smoothing {
    pub(crate) fn get(self) -> f32 {
        self.0
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Self(0.2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct InvalidSmoothing(f32);

impl fmt::Display for InvalidSmoothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "smoothing factor must be greater than 0 and at most 1, got {}",
            self.0
        )
    }
}

impl StdError for InvalidSmoothing {}

impl TryFrom<f32> for Smoothing {
    type Error = InvalidSmoothing;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(InvalidSmoothing(value))
        }
    }
}

impl From<Smoothing> for f32 {
    fn from(smoothing: Smoothing) -> Self {
        smoothing.0
    }
}

/// How the displayed temperature range is chosen.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub(crate) enum ScaleMode {
    /// Follow the minimum and maximum of each frame, smoothed over time.
    Auto {
        #[serde(default)]
        smoothing: Smoothing,
    },

    /// Use fixed bounds.
    Manual { min: f32, max: f32 },
}

impl Default for ScaleMode {
    fn default() -> Self {
        Self::Auto {
            smoothing: Smoothing::default(),
        }
    }
}

/// Tracks the displayed scale from frame to frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Autoscale {
    current: ScaleRange,
    /// The last smoothed range. Cleared while in manual mode so that the next automatic update
    /// starts from whatever was last displayed.
    previous: Option<ScaleRange>,
}

impl Autoscale {
    pub(crate) fn current(&self) -> ScaleRange {
        self.current
    }

    /// Update the scale with the minimum and maximum temperatures of a new frame.
    pub(crate) fn update(&mut self, t_min: f32, t_max: f32, mode: &ScaleMode) -> ScaleRange {
        match mode {
            ScaleMode::Manual { min, max } => {
                self.previous = None;
                self.current = ScaleRange::new(*min, *max);
            }
            ScaleMode::Auto { smoothing } => {
                let previous = self.previous.unwrap_or(self.current);
                let beta = smoothing.get() as f64;
                let blend = |observed: f32, previous: f32| -> f32 {
                    (beta * observed as f64 + (1.0 - beta) * previous as f64) as f32
                };
                self.current =
                    ScaleRange::new(blend(t_min, previous.min), blend(t_max, previous.max));
                self.previous = Some(self.current);
            }
        }
        trace!(scale = ?self.current, "updated display scale");
        self.current
    }
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use float_cmp::approx_eq;

    use super::{Autoscale, ScaleMode, ScaleRange, Smoothing};

    fn auto(smoothing: f32) -> ScaleMode {
        ScaleMode::Auto {
            smoothing: Smoothing::try_from(smoothing).unwrap(),
        }
    }

    #[test]
    fn initial_range() {
        assert_eq!(Autoscale::default().current(), ScaleRange::new(15.0, 40.0));
    }

    #[test]
    fn converges_monotonically() {
        let mut scale = Autoscale::default();
        let mode = auto(0.5);
        let mut last = scale.current();
        for _ in 0..40 {
            let next = scale.update(20.0, 30.0, &mode);
            assert!(next.min >= last.min && next.min <= 20.0);
            assert!(next.max <= last.max && next.max >= 30.0);
            last = next;
        }
        assert!(approx_eq!(f32, last.min, 20.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, last.max, 30.0, epsilon = 1e-4));
    }

    #[test]
    fn first_step() {
        let mut scale = Autoscale::default();
        let next = scale.update(20.0, 30.0, &auto(0.5));
        assert_eq!(next, ScaleRange::new(17.5, 35.0));
    }

    #[test]
    fn full_weight_is_immediate() {
        let mut scale = Autoscale::default();
        assert_eq!(
            scale.update(20.0, 30.0, &auto(1.0)),
            ScaleRange::new(20.0, 30.0)
        );
    }

    #[test]
    fn manual_passthrough() {
        let mut scale = Autoscale::default();
        let mode = ScaleMode::Manual {
            min: 10.0,
            max: 12.0,
        };
        assert_eq!(scale.update(20.0, 30.0, &mode), ScaleRange::new(10.0, 12.0));
        assert_eq!(scale.update(0.0, 80.0, &mode), ScaleRange::new(10.0, 12.0));
    }

    #[test]
    fn auto_after_manual_seeds_from_manual() {
        let mut scale = Autoscale::default();
        scale.update(20.0, 30.0, &auto(0.5));
        scale.update(
            20.0,
            30.0,
            &ScaleMode::Manual {
                min: 10.0,
                max: 50.0,
            },
        );
        let next = scale.update(20.0, 30.0, &auto(0.5));
        assert_eq!(next, ScaleRange::new(15.0, 40.0));
    }

    #[test]
    fn smoothing_bounds() {
        assert!(Smoothing::try_from(0.0).is_err());
        assert!(Smoothing::try_from(-0.5).is_err());
        assert!(Smoothing::try_from(1.01).is_err());
        assert!(Smoothing::try_from(f32::NAN).is_err());
        assert!(Smoothing::try_from(1.0).is_ok());
        assert!(Smoothing::try_from(0.01).is_ok());
    }

    #[test]
    fn parse_auto() {
        let parsed: Result<ScaleMode, _> = toml::from_str("mode = \"auto\"\nsmoothing = 0.5");
        assert!(
            parsed.is_ok(),
            "Failed to parse auto scale: {}",
            parsed.unwrap_err()
        );
        assert_eq!(parsed.unwrap(), auto(0.5));
    }

    #[test]
    fn parse_auto_default_smoothing() {
        let parsed: Result<ScaleMode, _> = toml::from_str("mode = \"auto\"");
        assert!(
            parsed.is_ok(),
            "Failed to parse auto scale: {}",
            parsed.unwrap_err()
        );
        assert_eq!(parsed.unwrap(), ScaleMode::default());
    }

    #[test]
    fn parse_manual() {
        let parsed: Result<ScaleMode, _> =
            toml::from_str("mode = \"manual\"\nmin = 18.0\nmax = 32.5");
        assert!(
            parsed.is_ok(),
            "Failed to parse manual scale: {}",
            parsed.unwrap_err()
        );
        assert_eq!(
            parsed.unwrap(),
            ScaleMode::Manual {
                min: 18.0,
                max: 32.5
            }
        );
    }

    #[test]
    fn parse_bad_smoothing() {
        let parsed: Result<ScaleMode, _> = toml::from_str("mode = \"auto\"\nsmoothing = 1.5");
        assert!(parsed.is_err(), "Accepted a smoothing factor above 1");
    }

    #[test]
    fn parse_json_command() {
        let parsed: Result<ScaleMode, _> =
            serde_json::from_str(r#"{"mode": "manual", "min": 20, "max": 30}"#);
        assert!(
            parsed.is_ok(),
            "Failed to parse JSON scale mode: {}",
            parsed.unwrap_err()
        );
    }
}
