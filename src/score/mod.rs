/// The scoring engine: `ConditionsRecord` in, 0–10 suitability score out.
///
/// The score is multiplicative — ten times the product of seven [0, 1]
/// sub-scores — so any factor at zero forces the whole score to zero.
/// The engine is a pure function: no I/O, no clock, no shared state;
/// identical input always produces an identical result, and no input
/// (including records with every field null) can make it panic or return
/// a non-finite value.

pub mod factors;
pub mod safety;

use crate::model::{ConditionsRecord, FactorScores, ScoreResult};

/// Rounds to two decimals, the precision of every published score.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the suitability score for one conditions record.
pub fn compute_score(record: &ConditionsRecord) -> ScoreResult {
    let factors = FactorScores {
        temperature: factors::temperature_factor(record.apparent_temp),
        wind: factors::wind_factor(record.wind_speed, record.wind_gust),
        flow: factors::flow_factor(record.discharge),
        water_temp: factors::water_temp_factor(record.water_temp),
        precipitation: factors::precipitation_factor(record.precipitation),
        uv: factors::uv_factor(record.uv_index),
        safety: safety::safety_factor(record),
    };

    let raw = 10.0
        * factors.temperature
        * factors.wind
        * factors.flow
        * factors.water_temp
        * factors.precipitation
        * factors.uv
        * factors.safety;

    ScoreResult {
        score: round2(raw).clamp(0.0, 10.0),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertRecord;

    /// A record describing a textbook rowable morning.
    fn ideal_record() -> ConditionsRecord {
        ConditionsRecord {
            apparent_temp: Some(76.0),
            wind_speed: Some(3.0),
            wind_gust: Some(6.0),
            precipitation: Some(0.0),
            uv_index: Some(2.0),
            discharge: Some(5000.0),
            water_temp: Some(62.0),
            gauge_height: Some(7.2),
            visibility: Some(10.0),
            lightning_prob: Some(0.0),
            precip_prob: Some(5.0),
            alerts: Vec::new(),
        }
    }

    #[test]
    fn test_ideal_conditions_score_ten() {
        let result = compute_score(&ideal_record());
        assert_eq!(result.score, 10.0);
        assert_eq!(result.factors.flow, 1.0);
        assert_eq!(result.factors.safety, 1.0);
    }

    #[test]
    fn test_zero_factor_zeroes_the_whole_score() {
        let mut record = ideal_record();
        record.discharge = Some(13500.0);
        let result = compute_score(&record);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.factors.flow, 0.0);
        // Other factors are still reported for diagnostics.
        assert_eq!(result.factors.wind, 1.0);
    }

    #[test]
    fn test_all_fields_null_is_finite_and_in_range() {
        let result = compute_score(&ConditionsRecord::default());
        assert!(result.score.is_finite());
        assert!((0.0..=10.0).contains(&result.score));
    }

    #[test]
    fn test_garbage_numerics_degrade_to_missing() {
        let record = ConditionsRecord {
            apparent_temp: Some(76.0),
            wind_speed: Some(f64::NAN),
            discharge: Some(f64::INFINITY),
            water_temp: Some(55.0),
            ..Default::default()
        };
        let result = compute_score(&record);
        assert!(result.score.is_finite());
        assert_eq!(result.factors.wind, 1.0); // NaN wind = missing = neutral
        assert_eq!(result.factors.flow, factors::FLOW_MISSING_FACTOR);
    }

    #[test]
    fn test_severe_alert_overrides_perfect_weather() {
        let mut record = ideal_record();
        record.alerts.push(AlertRecord {
            event: "Flash Flood Warning".to_string(),
            severity: "Severe".to_string(),
            urgency: "Immediate".to_string(),
        });
        assert_eq!(compute_score(&record).score, 0.0);
    }

    #[test]
    fn test_determinism_bit_identical_repeat() {
        let record = ConditionsRecord {
            apparent_temp: Some(88.3),
            wind_speed: Some(12.7),
            wind_gust: Some(19.2),
            discharge: Some(9876.0),
            water_temp: Some(47.1),
            precipitation: Some(0.07),
            uv_index: Some(6.5),
            visibility: Some(2.2),
            lightning_prob: Some(35.0),
            precip_prob: Some(55.0),
            ..Default::default()
        };
        let a = compute_score(&record);
        let b = compute_score(&record);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.factors, b.factors);
    }

    #[test]
    fn test_round2_is_idempotent() {
        for raw in [0.0, 1.005, 3.14159, 6.666, 9.999, 10.0] {
            let once = round2(raw);
            assert_eq!(round2(once), once, "round2 not stable for {}", raw);
        }
    }
}
