//! Deterministic risk score for a single feed record.
//!
//! `score = diameter_km * 25 + velocity_kmh / 12000 - miss_km / 10_000_000`,
//! plus 15 for potentially hazardous objects, clamped to [10, 99] and
//! rounded to one decimal. Records without the inputs score the floor.

use neows_client::RawFeedRecord;

pub const RISK_FLOOR: f64 = 10.0;
pub const RISK_CEILING: f64 = 99.0;
pub const HAZARD_BONUS: f64 = 15.0;

const DIAMETER_WEIGHT: f64 = 25.0;
const VELOCITY_DIVISOR: f64 = 12_000.0;
const DISTANCE_DIVISOR: f64 = 10_000_000.0;

/// The validated inputs of the score. Built only when every required field
/// is present and numeric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskInputs {
    /// Kilometer-scale diameter; the displayed diameter uses meters.
    pub diameter_max_km: f64,
    pub velocity_kmh: f64,
    pub miss_distance_km: f64,
    pub hazardous: bool,
}

impl RiskInputs {
    pub fn from_record(record: &RawFeedRecord) -> Option<Self> {
        let diameter_max_km = record.diameter_max_km().filter(|d| d.is_finite())?;
        let velocity_kmh = record.velocity_kmh()?;
        let miss_distance_km = record.miss_distance_km()?;
        Some(Self {
            diameter_max_km,
            velocity_kmh,
            miss_distance_km,
            hazardous: record.is_hazardous(),
        })
    }

    /// Score before clamping and rounding.
    pub fn raw_score(&self) -> f64 {
        let mut score = self.diameter_max_km * DIAMETER_WEIGHT
            + self.velocity_kmh / VELOCITY_DIVISOR
            - self.miss_distance_km / DISTANCE_DIVISOR;
        if self.hazardous {
            score += HAZARD_BONUS;
        }
        score
    }

    pub fn score(&self) -> f64 {
        round_to_tenth(self.raw_score().clamp(RISK_FLOOR, RISK_CEILING))
    }
}

pub fn risk_score(record: &RawFeedRecord) -> f64 {
    match RiskInputs::from_record(record) {
        Some(inputs) => inputs.score(),
        None => {
            tracing::debug!(neo_id = %record.id, "Insufficient data for risk score, using floor");
            RISK_FLOOR
        }
    }
}

// Half-to-even, matching how the score has always been presented.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
