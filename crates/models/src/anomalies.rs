use serde::{Deserialize, Serialize};
use serde_json::Value;
use superslice::Ext;

use crate::format::{format_date_and_time, format_duration, format_large_number, format_percentage};
use crate::{or_no_data, EntityRef, NO_DATA_MARKER};

/// Feedback type of an anomaly which hasn't received feedback.
pub const NO_FEEDBACK: &str = "NO_FEEDBACK";

/// Anomaly as returned by `GET /api/anomalies`.
/// Times are in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_current_val: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_baseline_val: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnomalyMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<AnomalyFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_labels: Option<Vec<AnomalyLabel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_item: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub feedback_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<bool>,
}

/// Anomaly shaped for display and search. Each displayed value has a
/// `*Val` counterpart holding its raw number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAnomaly {
    pub id: i64,
    pub name: String,
    pub alert_id: i64,
    pub alert_name: String,
    pub metric_id: i64,
    pub metric_name: String,
    pub current: String,
    pub current_val: f64,
    pub predicted: String,
    pub predicted_val: f64,
    pub deviation: String,
    pub deviation_val: f64,
    pub negative_deviation: bool,
    pub duration: String,
    pub duration_val: i64,
    pub start_time: String,
    pub start_time_val: i64,
    pub end_time: String,
    pub end_time_val: i64,
    pub dataset_name: String,
    pub has_feedback: bool,
    pub is_ignored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_id: Option<i64>,
}

impl Default for UiAnomaly {
    fn default() -> Self {
        Self {
            id: -1,
            name: NO_DATA_MARKER.to_string(),
            alert_id: -1,
            alert_name: NO_DATA_MARKER.to_string(),
            metric_id: -1,
            metric_name: NO_DATA_MARKER.to_string(),
            current: NO_DATA_MARKER.to_string(),
            current_val: -1.0,
            predicted: NO_DATA_MARKER.to_string(),
            predicted_val: -1.0,
            deviation: NO_DATA_MARKER.to_string(),
            deviation_val: -1.0,
            negative_deviation: false,
            duration: NO_DATA_MARKER.to_string(),
            duration_val: 0,
            start_time: NO_DATA_MARKER.to_string(),
            start_time_val: -1,
            end_time: NO_DATA_MARKER.to_string(),
            end_time_val: -1,
            dataset_name: NO_DATA_MARKER.to_string(),
            has_feedback: false,
            is_ignored: false,
            enumeration_id: None,
        }
    }
}

impl search::Searchable for UiAnomaly {}

/// Display name of an anomaly, such as "Anomaly #42".
pub fn get_anomaly_name(anomaly: &Anomaly) -> String {
    match anomaly.id {
        Some(id) => format!("Anomaly #{id}"),
        None => "Anomaly".to_string(),
    }
}

/// Shape `anomaly` for display.
pub fn get_ui_anomaly(anomaly: &Anomaly) -> UiAnomaly {
    let mut ui = UiAnomaly {
        id: anomaly.id.unwrap_or(-1),
        name: get_anomaly_name(anomaly),
        ..Default::default()
    };

    if let Some(alert) = &anomaly.alert {
        ui.alert_id = alert.id.unwrap_or(-1);
        ui.alert_name = or_no_data(alert.name.as_deref());
    }
    if let Some(current) = anomaly.avg_current_val {
        ui.current = format_large_number(current);
        ui.current_val = current;
    }
    if let Some(baseline) = anomaly.avg_baseline_val {
        ui.predicted = format_large_number(baseline);
        ui.predicted_val = baseline;
    }
    if let (Some(current), Some(baseline)) = (anomaly.avg_current_val, anomaly.avg_baseline_val) {
        let deviation = (current - baseline) / baseline.abs();

        ui.deviation = if deviation.is_nan() {
            NO_DATA_MARKER.to_string()
        } else if deviation == f64::INFINITY {
            "Large(Infinite)".to_string()
        } else if deviation == f64::NEG_INFINITY {
            "-Large(Infinite)".to_string()
        } else {
            format_percentage(deviation, 2, true)
        };
        ui.deviation_val = deviation;
        ui.negative_deviation = deviation < 0.0;
    }
    if let Some(start) = anomaly.start_time {
        ui.start_time = format_date_and_time(start);
        ui.start_time_val = start;
    }
    if let Some(end) = anomaly.end_time {
        ui.end_time = format_date_and_time(end);
        ui.end_time_val = end;
    }
    if let (Some(start), Some(end)) = (anomaly.start_time, anomaly.end_time) {
        ui.duration = format_duration(start, end);
        ui.duration_val = end.saturating_sub(start);
    }
    if let Some(metric) = &anomaly.metric {
        ui.metric_id = metric.id.unwrap_or(-1);
        ui.metric_name = or_no_data(metric.name.as_deref());
    }
    if let Some(dataset) = anomaly.metadata.as_ref().and_then(|m| m.dataset.as_ref()) {
        ui.dataset_name = or_no_data(dataset.name.as_deref());
    }
    // Listed anomalies carry a feedback ID, while a fetched anomaly
    // carries a type only if it has feedback.
    if let Some(feedback) = &anomaly.feedback {
        ui.has_feedback =
            feedback.id.is_some() || feedback.feedback_type.as_deref() != Some(NO_FEEDBACK);
    }
    ui.is_ignored = is_anomaly_ignored(anomaly);
    ui.enumeration_id = anomaly.enumeration_item.as_ref().and_then(|item| item.id);

    ui
}

/// Shape each of `anomalies` for display, in order.
pub fn get_ui_anomalies(anomalies: &[Anomaly]) -> Vec<UiAnomaly> {
    anomalies.iter().map(get_ui_anomaly).collect()
}

/// An anomaly is ignored if any of its labels is marked to be ignored.
pub fn is_anomaly_ignored(anomaly: &Anomaly) -> bool {
    anomaly
        .anomaly_labels
        .iter()
        .flatten()
        .any(|label| label.ignore == Some(true))
}

/// Anomalies which aren't ignored, in order.
pub fn filter_out_ignored_anomalies(anomalies: &[Anomaly]) -> Vec<&Anomaly> {
    anomalies.iter().filter(|a| !is_anomaly_ignored(a)).collect()
}

/// Anomalies which are accepted by every one of `filters`, in order.
/// All anomalies are returned if there are no `filters`.
pub fn filter_anomalies_by_functions<'a>(
    anomalies: &'a [Anomaly],
    filters: &[&dyn Fn(&Anomaly) -> bool],
) -> Vec<&'a Anomaly> {
    anomalies
        .iter()
        .filter(|anomaly| filters.iter().all(|f| f(anomaly)))
        .collect()
}

/// Anomalies which overlap the inclusive range `[start, end]`, ordered on
/// ascending end time (ties keep their start-time order).
///
/// If either bound is None then all anomalies are returned unchanged.
/// Otherwise, anomalies lacking a start or end time never match.
pub fn filter_anomalies_by_time(
    anomalies: &[Anomaly],
    start: Option<i64>,
    end: Option<i64>,
) -> Vec<&Anomaly> {
    match (start, end) {
        (Some(start), Some(end)) => overlapping(anomalies, start, end),
        _ => anomalies.iter().collect(),
    }
}

/// Anomalies which are underway at `time` (inclusive of their start and
/// end), ordered as in `filter_anomalies_by_time`.
pub fn anomalies_at_time(anomalies: &[Anomaly], time: Option<i64>) -> Vec<&Anomaly> {
    match time {
        Some(time) => overlapping(anomalies, time, time),
        None => anomalies.iter().collect(),
    }
}

fn overlapping(anomalies: &[Anomaly], start: i64, end: i64) -> Vec<&Anomaly> {
    let mut timed: Vec<(i64, i64, &Anomaly)> = anomalies
        .iter()
        .filter_map(|anomaly| Some((anomaly.start_time?, anomaly.end_time?, anomaly)))
        .collect();

    // Drop anomalies which begin after the range ends.
    timed.sort_by_key(|(begin, _, _)| *begin);
    let keep = timed.upper_bound_by_key(&end, |(begin, _, _)| *begin);
    timed.truncate(keep);

    // Drop anomalies which finish before the range starts.
    timed.sort_by_key(|(_, finish, _)| *finish);
    let skip = timed.lower_bound_by_key(&start, |(_, finish, _)| *finish);

    timed
        .into_iter()
        .skip(skip)
        .map(|(_, _, anomaly)| anomaly)
        .collect()
}
