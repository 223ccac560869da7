mod alerts;
mod anomalies;
mod datasets;
pub mod format;
mod subscription_groups;

pub use alerts::{
    get_ui_alert, get_ui_alerts, Alert, AlertNode, AlertTemplate, Owner, UiAlert,
    UiAlertDatasetAndMetric, UiAlertSubscriptionGroup, ANOMALY_DETECTOR_NODE,
};
pub use anomalies::{
    anomalies_at_time, filter_anomalies_by_functions, filter_anomalies_by_time,
    filter_out_ignored_anomalies, get_anomaly_name, get_ui_anomalies, get_ui_anomaly,
    is_anomaly_ignored, Anomaly, AnomalyFeedback, AnomalyLabel, AnomalyMetadata, UiAnomaly,
    NO_FEEDBACK,
};
pub use datasets::{
    get_ui_datasets, get_ui_datasources, get_ui_metrics, Dataset, Datasource, Metric, TimeColumn,
    UiDataset, UiDatasource, UiMetric,
};
pub use subscription_groups::{
    get_ui_subscription_group, get_ui_subscription_groups, AlertAssociation, EmailScheme,
    EnumerationItem, NotificationSchemes, SubscriptionGroup, UiSubscriptionGroup,
    UiSubscriptionGroupAlert,
};

use serde::{Deserialize, Serialize};

/// Displayed in place of values which are missing from an entity.
pub const NO_DATA_MARKER: &str = "-";

// Missing and empty values are both displayed as NO_DATA_MARKER.
fn or_no_data(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => NO_DATA_MARKER.to_string(),
    }
}

fn active_text(active: bool) -> String {
    if active { "Active" } else { "Inactive" }.to_string()
}

/// Reference to another entity, by its id and (optionally) its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Entity is a kind of listed entity of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Alerts,
    Anomalies,
    SubscriptionGroups,
    Metrics,
    Datasets,
    Datasources,
}

impl Entity {
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Alerts => "alerts",
            Entity::Anomalies => "anomalies",
            Entity::SubscriptionGroups => "subscription-groups",
            Entity::Metrics => "metrics",
            Entity::Datasets => "datasets",
            Entity::Datasources => "datasources",
        }
    }

    pub fn all() -> &'static [Entity] {
        &[
            Entity::Alerts,
            Entity::Anomalies,
            Entity::SubscriptionGroups,
            Entity::Metrics,
            Entity::Datasets,
            Entity::Datasources,
        ]
    }

    /// REST endpoint from which entities of this kind are listed.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Entity::Alerts => "/api/alerts",
            Entity::Anomalies => "/api/anomalies",
            Entity::SubscriptionGroups => "/api/subscription-groups",
            Entity::Metrics => "/api/metrics",
            Entity::Datasets => "/api/datasets",
            Entity::Datasources => "/api/data-sources",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Entity {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        for entity in Entity::all() {
            if name.eq_ignore_ascii_case(entity.name()) {
                return Ok(*entity);
            }
        }
        Err(Error::UnknownEntity(name.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown entity kind {0:?} (expected one of: alerts, anomalies, subscription-groups, metrics, datasets, datasources)")]
    UnknownEntity(String),
    #[error("failed to parse {entity} payload")]
    Parse {
        entity: Entity,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a list payload of `entity`, as returned by its REST endpoint.
/// A payload of `null` is an empty list.
pub fn parse_list<T>(entity: Entity, payload: &[u8]) -> Result<Vec<T>, Error>
where
    T: serde::de::DeserializeOwned,
{
    let parsed: Option<Vec<T>> =
        serde_json::from_slice(payload).map_err(|source| Error::Parse { entity, source })?;

    let parsed = parsed.unwrap_or_default();
    tracing::debug!(%entity, count = parsed.len(), "parsed entity list");

    Ok(parsed)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_entity_names_round_trip() {
        for entity in Entity::all() {
            assert_eq!(entity.name().parse::<Entity>().unwrap(), *entity);
            assert_eq!(
                serde_json::to_value(entity).unwrap(),
                serde_json::Value::String(entity.name().to_string())
            );
        }
        assert_eq!("ALERTS".parse::<Entity>().unwrap(), Entity::Alerts);
        assert_eq!(Entity::SubscriptionGroups.endpoint(), "/api/subscription-groups");
        assert_eq!(Entity::Datasources.endpoint(), "/api/data-sources");

        let err = "widgets".parse::<Entity>().unwrap_err();
        insta::assert_snapshot!(err, @r###"unknown entity kind "widgets" (expected one of: alerts, anomalies, subscription-groups, metrics, datasets, datasources)"###);
    }

    // Each excluded field must be present in the serialized row, and
    // nulled out of its search view.
    fn assert_excluded<T: search::Searchable>(row: &T) {
        let full = serde_json::to_value(row).unwrap();
        let view = row.search_view().unwrap();

        assert!(!T::EXCLUDED_FIELDS.is_empty());
        for field in T::EXCLUDED_FIELDS {
            assert!(matches!(full.pointer(field), Some(v) if !v.is_null()), "{field}");
            assert_eq!(view.pointer(field), Some(&serde_json::Value::Null), "{field}");
        }
    }

    #[test]
    fn test_view_models_exclude_their_source_entity() {
        assert_excluded(&get_ui_alerts(&[Alert::default()], &[])[0]);
        assert_excluded(&get_ui_subscription_groups(&[SubscriptionGroup::default()], &[], &[])[0]);
        assert_excluded(&get_ui_metrics(&[Metric::default()])[0]);
        assert_excluded(&get_ui_datasets(&[Dataset::default()])[0]);
        assert_excluded(&get_ui_datasources(&[Datasource::default()])[0]);
    }

    #[test]
    fn test_parse_list() {
        let alerts: Vec<Alert> =
            parse_list(Entity::Alerts, br#"[{"id": 1, "name": "a"}, {"id": 2}]"#).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].name.as_deref(), Some("a"));

        let none: Vec<Alert> = parse_list(Entity::Alerts, b"null").unwrap();
        assert!(none.is_empty());

        let err = parse_list::<Alert>(Entity::Metrics, b"{").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse metrics payload");
    }
}
