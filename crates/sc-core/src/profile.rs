//! Source data consumed by widgets.
//!
//! The profile record is fetched once per session from the profile-records
//! service and is read-only inside the editor. Every field is optional on the
//! wire; widgets render a dash for anything missing. A numeric field holding
//! something unusable (a string, a negative value) reads as missing instead
//! of rejecting the whole record.

use serde::{Deserialize, Deserializer, Serialize};

/// Non-negative finite number, or `None` for anything else.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = value
        .as_f64()
        .map(|n| n as f32)
        .filter(|n| n.is_finite() && *n >= 0.0);
    if number.is_none() && !value.is_null() {
        log::debug!("ignoring unusable profile value {value}");
    }
    Ok(number)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthRecord {
    #[serde(deserialize_with = "lenient_number")]
    pub squat_lb: Option<f32>,
    #[serde(deserialize_with = "lenient_number")]
    pub bench_lb: Option<f32>,
    #[serde(deserialize_with = "lenient_number")]
    pub deadlift_lb: Option<f32>,
    #[serde(deserialize_with = "lenient_number")]
    pub bodyweight_lb: Option<f32>,
}

impl StrengthRecord {
    /// Sum of the three lifts, if all are present.
    pub fn total_lb(&self) -> Option<f32> {
        Some(self.squat_lb? + self.bench_lb? + self.deadlift_lb?)
    }

    /// Total as a multiple of bodyweight.
    pub fn bodyweight_multiple(&self) -> Option<f32> {
        let bw = self.bodyweight_lb.filter(|bw| *bw > 0.0)?;
        Some(self.total_lb()? / bw)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningRecord {
    #[serde(deserialize_with = "lenient_number")]
    pub mile_s: Option<f32>,
    #[serde(rename = "5k_s", deserialize_with = "lenient_number")]
    pub five_k_s: Option<f32>,
    #[serde(rename = "10k_s", deserialize_with = "lenient_number")]
    pub ten_k_s: Option<f32>,
    #[serde(deserialize_with = "lenient_number")]
    pub half_s: Option<f32>,
    #[serde(deserialize_with = "lenient_number")]
    pub marathon_s: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileMeta {
    #[serde(deserialize_with = "lenient_number")]
    pub hybrid_score: Option<f32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub strength: StrengthRecord,
    pub running: RunningRecord,
    pub meta: ProfileMeta,
}

impl ProfileRecord {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Fixed stand-in used when the profile fetch fails, so every widget
    /// stays previewable.
    pub fn placeholder() -> Self {
        Self {
            strength: StrengthRecord {
                squat_lb: Some(315.0),
                bench_lb: Some(225.0),
                deadlift_lb: Some(405.0),
                bodyweight_lb: Some(185.0),
            },
            running: RunningRecord {
                mile_s: Some(390.0),
                five_k_s: Some(1335.0),
                ten_k_s: Some(2820.0),
                half_s: Some(6300.0),
                marathon_s: Some(14100.0),
            },
            meta: ProfileMeta {
                hybrid_score: Some(72.0),
                first_name: Some("Hybrid".into()),
                last_name: Some("Athlete".into()),
                display_name: None,
            },
        }
    }

    /// Hybrid score as shown on dials and chips: rounded to a whole number.
    pub fn score_label(&self) -> String {
        match self.meta.hybrid_score {
            Some(score) if score.is_finite() => format!("{}", score.round() as i64),
            _ => "--".to_string(),
        }
    }

    /// Score clamped to 0..=100 as a fraction, for dial sweeps.
    pub fn score_fraction(&self) -> f32 {
        self.meta
            .hybrid_score
            .filter(|s| s.is_finite())
            .map_or(0.0, |s| (s / 100.0).clamp(0.0, 1.0))
    }

    /// Display name, falling back to "First Last", then to a generic label.
    pub fn display_name(&self) -> String {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        if let Some(name) = non_empty(&self.meta.display_name) {
            return name;
        }
        match (non_empty(&self.meta.first_name), non_empty(&self.meta.last_name)) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(one), None) | (None, Some(one)) => one,
            (None, None) => "Hybrid Athlete".to_string(),
        }
    }
}

/// `405 lb`, or a dash when missing.
pub fn format_lb(value: Option<f32>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{} lb", group_thousands(v.round() as i64)),
        _ => "--".to_string(),
    }
}

/// `m:ss` under an hour, `h:mm:ss` otherwise, rounded to the second. A dash
/// when missing, negative, or not finite.
pub fn format_duration(seconds: Option<f32>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return "--".to_string();
    };
    let total = seconds.round() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_wire_record_with_numeric_keys() {
        let json = r#"{
            "strength": {"squat_lb": 405, "bench_lb": 275, "deadlift_lb": 495, "bodyweight_lb": 200},
            "running": {"mile_s": 345, "5k_s": 1200, "10k_s": 2520},
            "meta": {"hybrid_score": 85, "first_name": "Sam", "last_name": "Rivera"}
        }"#;
        let record = ProfileRecord::from_json(json).unwrap();
        assert_eq!(record.running.five_k_s, Some(1200.0));
        assert_eq!(record.running.ten_k_s, Some(2520.0));
        assert_eq!(record.running.half_s, None);
        assert_eq!(record.score_label(), "85");
        assert_eq!(record.display_name(), "Sam Rivera");
        assert_eq!(record.strength.total_lb(), Some(1175.0));
    }

    #[test]
    fn one_bad_number_does_not_sink_the_record() {
        let json = r#"{
            "strength": {"squat_lb": 405, "bench_lb": "n/a"},
            "running": {"mile_s": 345.5, "5k_s": -1, "10k_s": null},
            "meta": {"hybrid_score": 81, "display_name": "Sam"}
        }"#;
        let record = ProfileRecord::from_json(json).unwrap();
        assert_eq!(record.strength.squat_lb, Some(405.0));
        assert_eq!(record.strength.bench_lb, None);
        assert_eq!(record.running.mile_s, Some(345.5));
        assert_eq!(record.running.five_k_s, None);
        assert_eq!(record.running.ten_k_s, None);
        assert_eq!(record.score_label(), "81");
        assert_eq!(record.display_name(), "Sam");
        assert_eq!(format_duration(record.running.mile_s), "5:46");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let record = ProfileRecord::from_json("{}").unwrap();
        assert_eq!(record, ProfileRecord::default());
        assert_eq!(record.score_label(), "--");
        assert_eq!(record.display_name(), "Hybrid Athlete");
    }

    #[test]
    fn display_name_wins_over_first_last() {
        let mut record = ProfileRecord::placeholder();
        record.meta.display_name = Some("  The Engine ".into());
        assert_eq!(record.display_name(), "The Engine");
    }

    #[test]
    fn formats_times_and_weights() {
        assert_eq!(format_duration(Some(345.0)), "5:45");
        assert_eq!(format_duration(Some(345.5)), "5:46");
        assert_eq!(format_duration(Some(11109.0)), "3:05:09");
        assert_eq!(format_duration(None), "--");
        assert_eq!(format_duration(Some(-12.0)), "--");
        assert_eq!(format_duration(Some(f32::NAN)), "--");
        assert_eq!(format_lb(Some(1315.0)), "1,315 lb");
        assert_eq!(format_lb(Some(225.4)), "225 lb");
    }

    #[test]
    fn score_fraction_is_clamped() {
        let mut record = ProfileRecord::placeholder();
        record.meta.hybrid_score = Some(140.0);
        assert_eq!(record.score_fraction(), 1.0);
        record.meta.hybrid_score = None;
        assert_eq!(record.score_fraction(), 0.0);
    }
}
