use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TimelineSettings;

/// Distance unit the goal is expressed in.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Km,
    #[default]
    Mi,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Self::Km => "km",
            Self::Mi => "mi",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Km => Self::Mi,
            Self::Mi => Self::Km,
        }
    }
}

/// Longest goal distance accepted, in either unit.
pub const MAX_GOAL_LENGTH: f64 = 1000.0;
/// Longest goal time accepted: two days.
pub const MAX_GOAL_TIME_MINUTES: f64 = 48.0 * 60.0;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("{field} must be a positive number (got {value})")]
    DegenerateInput { field: &'static str, value: f64 },
    #[error("{field} must be at most {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

/// The user's goal: how far, how fast, and how tall the timeline is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimelineConfig {
    pub unit: Unit,
    /// Goal distance in `unit`.
    pub goal_length: f64,
    pub goal_time_minutes: f64,
    /// Visual zoom, `default_scale` draws at the base rate.
    pub scale: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            unit: Unit::Mi,
            goal_length: 13.1,
            goal_time_minutes: 120.0,
            scale: 50.0,
        }
    }
}

impl TimelineConfig {
    /// Reject goals that would make the derived quantities meaningless.
    pub fn validate(&self) -> Result<(), TimelineError> {
        check_goal_value("goal length", self.goal_length, MAX_GOAL_LENGTH)?;
        check_goal_value("goal time", self.goal_time_minutes, MAX_GOAL_TIME_MINUTES)?;
        Ok(())
    }

    /// `ceil(goal_length)`, or 0 for goals that fail `validate`.
    pub fn segment_count(&self) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        self.goal_length.ceil() as usize
    }

    pub fn minutes_per_unit(&self) -> f64 {
        self.goal_time_minutes / self.goal_length
    }

    pub fn pixels_per_minute(&self, settings: &TimelineSettings) -> f64 {
        settings.base_pixels_per_minute * (self.scale / settings.default_scale)
    }
}

pub fn check_positive(field: &'static str, value: f64) -> Result<(), TimelineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TimelineError::DegenerateInput { field, value })
    }
}

/// `check_positive`, plus an upper bound that keeps the segment and row
/// counts small enough to build.
pub fn check_goal_value(field: &'static str, value: f64, max: f64) -> Result<(), TimelineError> {
    check_positive(field, value)?;
    if value > max {
        return Err(TimelineError::OutOfRange { field, value, max });
    }
    Ok(())
}

/// One unit-long slice of the timeline (the last one may be shorter).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    /// Distance mark at the end of the segment, e.g. `"3 mi"`.
    pub label: String,
    pub distance_covered: f64,
    pub is_final: bool,
    pub pixel_height: f64,
    /// Elapsed goal time when this segment is finished.
    pub cumulative_time_minutes: f64,
}

/// Split the goal into per-unit segments with their heights and split times.
///
/// A 13.1 unit goal yields 13 whole segments and a final 0.1 segment. The final
/// segment always finishes at exactly `goal_time_minutes`.
pub fn compute_segments(config: &TimelineConfig, settings: &TimelineSettings) -> Vec<Segment> {
    let count = config.segment_count();
    if count == 0 {
        return Vec::new();
    }

    let minutes_per_unit = config.minutes_per_unit();
    let pixels_per_minute = config.pixels_per_minute(settings);
    let unit = config.unit.label();

    (0..count)
        .map(|index| {
            let is_final = index + 1 == count;
            let distance_covered = if is_final && config.goal_length.fract() != 0.0 {
                config.goal_length - config.goal_length.floor()
            } else {
                1.0
            };

            let (label, cumulative_time_minutes) = if is_final {
                (
                    format!("{} {}", config.goal_length, unit),
                    config.goal_time_minutes,
                )
            } else {
                (
                    format!("{} {}", index + 1, unit),
                    (index + 1) as f64 * minutes_per_unit,
                )
            };

            Segment {
                index,
                label,
                distance_covered,
                is_final,
                pixel_height: minutes_per_unit * pixels_per_minute * distance_covered,
                cumulative_time_minutes,
            }
        })
        .collect()
}

/// Stacked height of all segments.
pub fn total_height(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.pixel_height).sum()
}
