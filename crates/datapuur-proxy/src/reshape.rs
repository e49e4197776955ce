//! Adapts backend dashboard payloads to the field names the charts read.
//!
//! The factory backend reports per-machine utilisation under
//! `machine_profile` and omits the derived figures. Missing fields are filled
//! with fixed heuristics:
//!
//! | Field | Rule |
//! |-------|------|
//! | `oee` | `availability × performance × quality / 10 000` |
//! | `downtime_hours` | idle share of a 24 h day |
//! | `trend` | 7 daily points within ±2 % of the current utilisation |
//!
//! Fields the backend does send are never overwritten.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde_json::{Map, Value, json};

/// Number of daily points in a synthesised trend.
pub const TREND_POINTS: i64 = 7;

/// Relative jitter applied to synthesised trend points.
pub const TREND_JITTER: f64 = 0.02;

const DEFAULT_PERFORMANCE: f64 = 90.0;
const DEFAULT_QUALITY: f64 = 98.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Rename `machine_profile` and fill in the derived per-machine fields.
pub fn reshape_factory<R: Rng + ?Sized>(mut payload: Value, today: NaiveDate, rng: &mut R) -> Value {
    let Some(obj) = payload.as_object_mut() else {
        return payload;
    };

    if let Some(profile) = obj.remove("machine_profile") {
        obj.entry("machine_utilization").or_insert(profile);
    }
    if let Some(Value::Array(machines)) = obj.get_mut("machine_utilization") {
        for machine in machines.iter_mut().filter_map(Value::as_object_mut) {
            fill_machine(machine, today, rng);
        }
    }

    payload
}

fn fill_machine<R: Rng + ?Sized>(machine: &mut Map<String, Value>, today: NaiveDate, rng: &mut R) {
    let Some(utilization) = number(machine, "utilization") else {
        return;
    };
    let utilization = utilization.clamp(0.0, 100.0);

    if !machine.contains_key("oee") {
        let availability = number(machine, "availability").unwrap_or(utilization);
        let performance = number(machine, "performance").unwrap_or(DEFAULT_PERFORMANCE);
        let quality = number(machine, "quality").unwrap_or(DEFAULT_QUALITY);
        machine.insert(
            "oee".to_string(),
            json!(round1(availability * performance * quality / 10_000.0)),
        );
    }
    if !machine.contains_key("downtime_hours") {
        let idle = (100.0 - utilization) / 100.0;
        machine.insert("downtime_hours".to_string(), json!(round1(idle * HOURS_PER_DAY)));
    }
    if !machine.contains_key("trend") {
        machine.insert("trend".to_string(), trend(utilization, today, rng));
    }
}

/// Oldest point first; the last point is today's exact value.
fn trend<R: Rng + ?Sized>(utilization: f64, today: NaiveDate, rng: &mut R) -> Value {
    let points: Vec<Value> = (0..TREND_POINTS)
        .rev()
        .map(|days_ago| {
            let value = if days_ago == 0 {
                utilization
            } else {
                let jitter = rng.gen_range(-TREND_JITTER..=TREND_JITTER);
                (utilization * (1.0 + jitter)).clamp(0.0, 100.0)
            };
            let date = today - Duration::days(days_ago);
            json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "utilization": round1(value),
            })
        })
        .collect();
    Value::Array(points)
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
