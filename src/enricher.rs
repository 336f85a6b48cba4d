//! Response enrichment
//!
//! Augments a raw microservice calculation with the processing-time and
//! trace metadata the relay attaches for observability. The microservice
//! never fills these fields itself.

use crate::models::{CalculationResult, RawCalculation};
use std::time::Duration;
use uuid::Uuid;

/// Copy a raw calculation into an enriched result, stamping the measured
/// elapsed duration and a fresh trace identifier.
///
/// An absent raw result propagates unchanged.
pub fn enrich(raw: Option<RawCalculation>, elapsed: Duration) -> Option<CalculationResult> {
    let raw = raw?;
    Some(CalculationResult {
        activity: raw.activity,
        count: raw.count,
        carbon: raw.carbon,
        equivalents: raw.equivalents,
        timestamp: raw.timestamp,
        calculation_model: raw.calculation_model,
        note: raw.note,
        processing_time_ms: elapsed.as_millis() as u64,
        trace_id: Uuid::new_v4().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarbonMetrics, PhysicalEquivalents};
    use chrono::Utc;

    fn sample_raw() -> RawCalculation {
        RawCalculation {
            activity: "discord_message".to_string(),
            count: 1500,
            carbon: CarbonMetrics {
                grams: 3072.0,
                kilograms: 3.072,
            },
            equivalents: PhysicalEquivalents {
                car_miles: 7.68,
                tree_days: 6.144,
            },
            timestamp: Utc::now(),
            calculation_model: "swd".to_string(),
            note: Some("Estimates are conservative.".to_string()),
        }
    }

    #[test]
    fn test_enrich_copies_all_fields() {
        let raw = sample_raw();
        let enriched = enrich(Some(raw.clone()), Duration::from_millis(250)).unwrap();

        assert_eq!(enriched.activity, raw.activity);
        assert_eq!(enriched.count, raw.count);
        assert_eq!(enriched.carbon, raw.carbon);
        assert_eq!(enriched.equivalents, raw.equivalents);
        assert_eq!(enriched.timestamp, raw.timestamp);
        assert_eq!(enriched.calculation_model, raw.calculation_model);
        assert_eq!(enriched.note, raw.note);
        assert_eq!(enriched.processing_time_ms, 250);
    }

    #[test]
    fn test_enrich_none_propagates() {
        assert!(enrich(None, Duration::from_millis(5)).is_none());
    }

    #[test]
    fn test_trace_ids_are_unique() {
        let a = enrich(Some(sample_raw()), Duration::ZERO).unwrap();
        let b = enrich(Some(sample_raw()), Duration::ZERO).unwrap();
        assert!(!a.trace_id.is_empty());
        assert_ne!(a.trace_id, b.trace_id);
    }

    #[test]
    fn test_sub_millisecond_duration_rounds_down() {
        let enriched = enrich(Some(sample_raw()), Duration::from_micros(800)).unwrap();
        assert_eq!(enriched.processing_time_ms, 0);
    }
}
