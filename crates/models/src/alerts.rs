use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{active_text, or_no_data, SubscriptionGroup, NO_DATA_MARKER};

/// Type of the template node which performs anomaly detection.
pub const ANOMALY_DETECTOR_NODE: &str = "AnomalyDetector";

/// Alert as returned by `GET /api/alerts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<AlertTemplate>,
    /// Values bound to the properties of the alert's template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_properties: Option<serde_json::Map<String, Value>>,
    /// Fields not otherwise modeled, which are passed through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<AlertNode>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl AlertNode {
    /// Detection type of an anomaly detector node, such as "THRESHOLD".
    fn detection_type(&self) -> Option<&str> {
        if self.node_type.as_deref() != Some(ANOMALY_DETECTOR_NODE) {
            return None;
        }
        self.params.as_ref()?.get("type")?.as_str()
    }
}

/// Alert shaped for display and search.
/// The source alert is retained, but isn't searched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAlert {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub active_text: String,
    pub user_id: i64,
    pub created_by: String,
    pub detection_types: Vec<String>,
    pub dataset_and_metrics: Vec<UiAlertDatasetAndMetric>,
    pub subscription_groups: Vec<UiAlertSubscriptionGroup>,
    pub alert: Option<Alert>,
}

impl Default for UiAlert {
    fn default() -> Self {
        Self {
            id: -1,
            name: NO_DATA_MARKER.to_string(),
            active: false,
            active_text: NO_DATA_MARKER.to_string(),
            user_id: -1,
            created_by: NO_DATA_MARKER.to_string(),
            detection_types: Vec::new(),
            dataset_and_metrics: Vec::new(),
            subscription_groups: Vec::new(),
            alert: None,
        }
    }
}

impl search::Searchable for UiAlert {
    const EXCLUDED_FIELDS: &'static [&'static str] = &["/alert"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAlertDatasetAndMetric {
    pub dataset_id: i64,
    pub dataset_name: String,
    pub metric_id: i64,
    pub metric_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiAlertSubscriptionGroup {
    pub id: i64,
    pub name: String,
}

/// Shape `alert` for display, resolving the subscription groups it belongs to.
pub fn get_ui_alert(alert: &Alert, subscription_groups: &[SubscriptionGroup]) -> UiAlert {
    let groups_by_alert = subscription_groups_by_alert(subscription_groups);
    ui_alert(alert, &groups_by_alert)
}

/// Shape each of `alerts` for display, in order.
pub fn get_ui_alerts(alerts: &[Alert], subscription_groups: &[SubscriptionGroup]) -> Vec<UiAlert> {
    if alerts.is_empty() {
        return Vec::new();
    }
    let groups_by_alert = subscription_groups_by_alert(subscription_groups);

    alerts
        .iter()
        .map(|alert| ui_alert(alert, &groups_by_alert))
        .collect()
}

fn ui_alert(alert: &Alert, groups_by_alert: &HashMap<i64, Vec<UiAlertSubscriptionGroup>>) -> UiAlert {
    let mut ui = UiAlert {
        id: alert.id.unwrap_or(-1),
        name: or_no_data(alert.name.as_deref()),
        active: alert.active.unwrap_or_default(),
        active_text: active_text(alert.active.unwrap_or_default()),
        ..Default::default()
    };

    if let Some(owner) = &alert.owner {
        ui.user_id = owner.id.unwrap_or(-1);
        ui.created_by = or_no_data(owner.principal.as_deref());
    }
    if let Some(groups) = alert.id.and_then(|id| groups_by_alert.get(&id)) {
        ui.subscription_groups = groups.clone();
    }
    if let Some(template) = &alert.template {
        ui.detection_types = template
            .nodes
            .iter()
            .filter_map(AlertNode::detection_type)
            .map(str::to_string)
            .collect();
    }
    ui.dataset_and_metrics = dataset_and_metric(alert).into_iter().collect();
    ui.alert = Some(alert.clone());

    ui
}

// Dataset and metric which are bound as properties of the alert's template.
fn dataset_and_metric(alert: &Alert) -> Option<UiAlertDatasetAndMetric> {
    let properties = alert.template_properties.as_ref()?;
    let dataset = properties.get("dataset").and_then(Value::as_str);
    let metric = properties.get("metric").and_then(Value::as_str);

    if dataset.is_none() && metric.is_none() {
        return None;
    }
    Some(UiAlertDatasetAndMetric {
        dataset_id: -1,
        dataset_name: or_no_data(dataset),
        metric_id: -1,
        metric_name: or_no_data(metric),
    })
}

// Map alert IDs to the distinct subscription groups (ordered on group ID)
// which notify on them.
fn subscription_groups_by_alert(
    subscription_groups: &[SubscriptionGroup],
) -> HashMap<i64, Vec<UiAlertSubscriptionGroup>> {
    let mut by_alert: HashMap<i64, BTreeMap<i64, UiAlertSubscriptionGroup>> = HashMap::new();

    for group in subscription_groups {
        let alert_ids = group.alert_ids();
        if alert_ids.is_empty() {
            continue;
        }
        let ui_group = UiAlertSubscriptionGroup {
            id: group.id.unwrap_or(-1),
            name: or_no_data(group.name.as_deref()),
        };

        for alert_id in alert_ids {
            by_alert
                .entry(alert_id)
                .or_default()
                .insert(ui_group.id, ui_group.clone());
        }
    }

    by_alert
        .into_iter()
        .map(|(alert_id, groups)| (alert_id, groups.into_values().collect()))
        .collect()
}
