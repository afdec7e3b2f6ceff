use chrono::NaiveDate;

use neoradar_common::ScoredAsteroid;
use neows_client::{DateGroups, RawFeedRecord};

use crate::risk::risk_score;

/// Strip bracket decoration, e.g. `"(2010 PK9)"` -> `"2010 PK9"`.
pub fn clean_name(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '(' | ')')).collect()
}

/// Score and shape one record. Never fails: missing display metrics come
/// through as `None` and a degraded score is the floor.
pub fn score_record(record: &RawFeedRecord, observed: NaiveDate) -> ScoredAsteroid {
    ScoredAsteroid {
        neo_id: record.id.clone(),
        name: clean_name(&record.name),
        risk_score: risk_score(record),
        is_hazardous: record.is_hazardous(),
        miss_distance: record.miss_distance_km().map(round_to_int),
        velocity: record.velocity_kmh().map(round_to_int),
        diameter: record
            .diameter_max_m()
            .filter(|d| d.is_finite())
            .map(|d| (d * 100.0).round_ties_even() / 100.0),
        last_observed: observed,
    }
}

/// Flatten date groups into one batch, keeping upstream order. Every record
/// is stamped with the same observation date.
pub fn normalize(groups: &DateGroups, observed: NaiveDate) -> Vec<ScoredAsteroid> {
    groups
        .records()
        .map(|record| score_record(record, observed))
        .collect()
}

fn round_to_int(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use neows_client::FeedResponse;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn feed(value: serde_json::Value) -> FeedResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn scenario_feed_maps_single_asteroid() {
        let feed = feed(json!({"near_earth_objects": {"2024-01-01": [{
            "id": "1",
            "name": "(X)",
            "estimated_diameter": {
                "kilometers": {"estimated_diameter_max": 0.1},
                "meters": {"estimated_diameter_max": 100.0}
            },
            "close_approach_data": [{
                "relative_velocity": {"kilometers_per_hour": "36000"},
                "miss_distance": {"kilometers": "5000000"}
            }],
            "is_potentially_hazardous_asteroid": true
        }]}}));

        let batch = normalize(&feed.near_earth_objects, today());
        assert_eq!(batch.len(), 1);
        let a = &batch[0];
        assert_eq!(a.neo_id, "1");
        assert_eq!(a.name, "X");
        assert_eq!(a.risk_score, 20.0);
        assert!(a.is_hazardous);
        assert_eq!(a.miss_distance, Some(5_000_000));
        assert_eq!(a.velocity, Some(36_000));
        assert_eq!(a.diameter, Some(100.0));
        assert_eq!(a.last_observed, today());
    }

    #[test]
    fn preserves_count_and_order_across_dates() {
        let feed = feed(json!({"near_earth_objects": {
            "2024-01-02": [{"id": "d", "name": "D"}, {"id": "e", "name": "E"}],
            "2024-01-01": [{"id": "a", "name": "A"}],
            "2024-01-03": []
        }}));
        let batch = normalize(&feed.near_earth_objects, today());
        let ids: Vec<&str> = batch.iter().map(|a| a.neo_id.as_str()).collect();
        assert_eq!(ids, vec!["d", "e", "a"]);
    }

    #[test]
    fn degraded_records_are_kept_with_floor_score() {
        let feed = feed(json!({"near_earth_objects": {"2024-01-01": [
            {"id": "bare", "name": "Bare"}
        ]}}));
        let batch = normalize(&feed.near_earth_objects, today());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].risk_score, 10.0);
        assert_eq!(batch[0].miss_distance, None);
        assert_eq!(batch[0].velocity, None);
        assert_eq!(batch[0].diameter, None);
    }

    #[test]
    fn odd_hazard_flags_do_not_drop_the_batch() {
        let approach = json!([{
            "relative_velocity": {"kilometers_per_hour": "36000"},
            "miss_distance": {"kilometers": "5000000"}
        }]);
        let diameter = json!({
            "kilometers": {"estimated_diameter_max": 0.1},
            "meters": {"estimated_diameter_max": 100.0}
        });
        let feed = feed(json!({"near_earth_objects": {"2024-01-01": [
            {"id": "good", "name": "Good", "estimated_diameter": diameter,
             "close_approach_data": approach, "is_potentially_hazardous_asteroid": true},
            {"id": "null", "name": "Null", "estimated_diameter": diameter,
             "close_approach_data": approach, "is_potentially_hazardous_asteroid": null},
            {"id": "text", "name": "Text", "estimated_diameter": diameter,
             "close_approach_data": approach, "is_potentially_hazardous_asteroid": "false"}
        ]}}));

        let batch = normalize(&feed.near_earth_objects, today());
        let ids: Vec<&str> = batch.iter().map(|a| a.neo_id.as_str()).collect();
        assert_eq!(ids, vec!["good", "null", "text"]);
        assert_eq!(batch[0].risk_score, 20.0);
        assert!(batch[0].is_hazardous);
        for unflagged in &batch[1..] {
            assert!(!unflagged.is_hazardous);
            assert_eq!(unflagged.risk_score, 10.0);
        }
    }

    #[test]
    fn empty_feed_gives_empty_batch() {
        let batch = normalize(&DateGroups::default(), today());
        assert!(batch.is_empty());
    }

    #[test]
    fn clean_name_removes_only_parentheses() {
        assert_eq!(clean_name("(2010 PK9)"), "2010 PK9");
        assert_eq!(clean_name("433 Eros (A898 PA)"), "433 Eros A898 PA");
        assert_eq!(clean_name("[X] {Y} ((Z))"), "[X] {Y} Z");
        assert_eq!(clean_name("plain"), "plain");
    }

    #[test]
    fn display_metrics_round() {
        let feed = feed(json!({"near_earth_objects": {"2024-01-01": [{
            "id": "1",
            "name": "R",
            "estimated_diameter": {"meters": {"estimated_diameter_max": 123.4567}},
            "close_approach_data": [{
                "relative_velocity": {"kilometers_per_hour": "36000.7"},
                "miss_distance": {"kilometers": "4999999.2"}
            }]
        }]}}));
        let a = &normalize(&feed.near_earth_objects, today())[0];
        assert_eq!(a.velocity, Some(36_001));
        assert_eq!(a.miss_distance, Some(4_999_999));
        assert_eq!(a.diameter, Some(123.46));
    }
}
