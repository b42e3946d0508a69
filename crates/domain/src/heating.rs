//! Heating decision table.
//!
//! [`decide`] maps `{now, current temperature, current reservation,
//! upcoming reservation}` to exactly one [`HeatingStatus`]. It keeps no state
//! between calls; the status is a label recomputed on every query.
//!
//! Evaluation order:
//! 1. a current reservation wins over an upcoming one;
//! 2. within each branch the "target reached" check comes first;
//! 3. the upcoming branch then compares lead time against time remaining.

use serde::{Deserialize, Serialize};

use crate::reservation::Reservation;
use crate::time::{Timestamp, minutes_between};

/// Safety margin added to the computed lead time, in minutes.
pub const PREHEAT_MARGIN_MIN: i64 = 10;

/// Tunable constants of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatingPolicy {
    /// Desired room temperature in °C.
    pub target_temp: f64,
    /// Informational lead time shown to operators.
    pub heat_advance_min: i64,
    /// Heating rate in °C per hour.
    pub deg_per_hour: f64,
    /// Readings within this distance below target count as reached.
    pub temp_tolerance: f64,
}

impl Default for HeatingPolicy {
    fn default() -> Self {
        Self {
            target_temp: 20.0,
            heat_advance_min: 60,
            deg_per_hour: 2.5,
            temp_tolerance: 0.5,
        }
    }
}

impl HeatingPolicy {
    /// Whether `temp` is close enough to target to stop heating.
    #[must_use]
    pub fn is_reached(&self, temp: f64) -> bool {
        temp >= self.target_temp - self.temp_tolerance
    }

    /// Minutes of heating needed to bring `temp` up to target.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn minutes_needed(&self, temp: f64) -> i64 {
        ((self.target_temp - temp) / self.deg_per_hour * 60.0).ceil() as i64
    }
}

/// Outcome label of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatingStatus {
    Occupied,
    TargetReached,
    Heating,
    Preheat,
    Wait,
    Standby,
}

impl HeatingStatus {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Occupied => "Occupied",
            Self::TargetReached => "Target reached",
            Self::Heating => "Heating",
            Self::Preheat => "Pre-heating",
            Self::Wait => "Waiting",
            Self::Standby => "Standby",
        }
    }
}

impl std::fmt::Display for HeatingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Occupied => "OCCUPIED",
            Self::TargetReached => "TARGET_REACHED",
            Self::Heating => "HEATING",
            Self::Preheat => "PREHEAT",
            Self::Wait => "WAIT",
            Self::Standby => "STANDBY",
        })
    }
}

/// What the heating actuator should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatingAction {
    HeatOn,
    Wait,
}

/// A fresh decision for one room. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingDecision {
    pub status: HeatingStatus,
    pub label: String,
    pub detail: String,
    pub action: Option<HeatingAction>,
    /// For [`HeatingStatus::Wait`]: minutes until heating should start.
    pub heat_in_min: Option<i64>,
}

impl HeatingDecision {
    fn new(status: HeatingStatus, detail: String, action: Option<HeatingAction>) -> Self {
        Self {
            status,
            label: status.label().to_string(),
            detail,
            action,
            heat_in_min: None,
        }
    }
}

/// Decide what the heating of a room should do at `now`.
///
/// `current` is the reservation running at `now` (if any) and `upcoming` the
/// next reservation within the caller's horizon (if any). A missing
/// temperature is a valid input, not an error.
#[must_use]
pub fn decide(
    policy: &HeatingPolicy,
    now: Timestamp,
    current_temp: Option<f64>,
    current: Option<&Reservation>,
    upcoming: Option<&Reservation>,
) -> HeatingDecision {
    if let Some(reservation) = current {
        return match current_temp {
            None => HeatingDecision::new(
                HeatingStatus::Occupied,
                format!("\"{}\" in progress, no temperature reading", reservation.title),
                None,
            ),
            Some(temp) if policy.is_reached(temp) => HeatingDecision::new(
                HeatingStatus::TargetReached,
                format!("{temp:.1}°C, target {:.1}°C", policy.target_temp),
                None,
            ),
            Some(temp) => HeatingDecision::new(
                HeatingStatus::Heating,
                format!(
                    "\"{}\" in progress, {temp:.1}°C below target {:.1}°C",
                    reservation.title, policy.target_temp
                ),
                Some(HeatingAction::HeatOn),
            ),
        };
    }

    let Some(reservation) = upcoming else {
        return HeatingDecision::new(
            HeatingStatus::Standby,
            "No reservation".to_string(),
            None,
        );
    };

    let minutes_until = minutes_between(now, reservation.start);

    let Some(temp) = current_temp else {
        return HeatingDecision::new(
            HeatingStatus::Preheat,
            format!(
                "\"{}\" starts in {minutes_until} min, no temperature reading",
                reservation.title
            ),
            Some(HeatingAction::HeatOn),
        );
    };

    if policy.is_reached(temp) {
        return HeatingDecision::new(
            HeatingStatus::TargetReached,
            format!(
                "{temp:.1}°C, ready for \"{}\" in {minutes_until} min",
                reservation.title
            ),
            None,
        );
    }

    let minutes_needed = policy.minutes_needed(temp);
    if minutes_until <= minutes_needed + PREHEAT_MARGIN_MIN {
        return HeatingDecision::new(
            HeatingStatus::Preheat,
            format!(
                "\"{}\" starts in {minutes_until} min, {minutes_needed} min of heating needed",
                reservation.title
            ),
            Some(HeatingAction::HeatOn),
        );
    }

    let heat_in = minutes_until - minutes_needed - PREHEAT_MARGIN_MIN;
    HeatingDecision {
        heat_in_min: Some(heat_in),
        ..HeatingDecision::new(
            HeatingStatus::Wait,
            format!("Heating starts in {heat_in} min"),
            Some(HeatingAction::Wait),
        )
    }
}
