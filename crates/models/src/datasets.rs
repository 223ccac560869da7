use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{active_text, or_no_data, EntityRef};

/// Metric as returned by `GET /api/metrics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metric {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<EntityRef>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Dataset as returned by `GET /api/datasets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_column: Option<TimeColumn>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeColumn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Datasource as returned by `GET /api/data-sources`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Datasource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub datasource_type: Option<String>,
    /// Connection properties, which may hold credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMetric {
    pub id: i64,
    pub name: String,
    pub dataset_id: i64,
    pub dataset_name: String,
    pub active: bool,
    pub active_text: String,
    pub aggregation_function: String,
    pub metric: Option<Metric>,
}

impl search::Searchable for UiMetric {
    const EXCLUDED_FIELDS: &'static [&'static str] = &["/metric"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiDataset {
    pub id: i64,
    pub name: String,
    pub datasource_name: String,
    pub active: bool,
    pub active_text: String,
    pub time_column: String,
    pub dataset: Option<Dataset>,
}

impl search::Searchable for UiDataset {
    const EXCLUDED_FIELDS: &'static [&'static str] = &["/dataset"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiDatasource {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub datasource_type: String,
    pub datasource: Option<Datasource>,
}

impl search::Searchable for UiDatasource {
    const EXCLUDED_FIELDS: &'static [&'static str] = &["/datasource"];
}

pub fn get_ui_metrics(metrics: &[Metric]) -> Vec<UiMetric> {
    metrics
        .iter()
        .map(|metric| {
            let dataset = metric.dataset.as_ref();
            let active = metric.active.unwrap_or_default();

            UiMetric {
                id: metric.id.unwrap_or(-1),
                name: or_no_data(metric.name.as_deref()),
                dataset_id: dataset.and_then(|d| d.id).unwrap_or(-1),
                dataset_name: or_no_data(dataset.and_then(|d| d.name.as_deref())),
                active,
                active_text: active_text(active),
                aggregation_function: or_no_data(metric.aggregation_function.as_deref()),
                metric: Some(metric.clone()),
            }
        })
        .collect()
}

pub fn get_ui_datasets(datasets: &[Dataset]) -> Vec<UiDataset> {
    datasets
        .iter()
        .map(|dataset| {
            let active = dataset.active.unwrap_or_default();

            UiDataset {
                id: dataset.id.unwrap_or(-1),
                name: or_no_data(dataset.name.as_deref()),
                datasource_name: or_no_data(
                    dataset.data_source.as_ref().and_then(|d| d.name.as_deref()),
                ),
                active,
                active_text: active_text(active),
                time_column: or_no_data(
                    dataset.time_column.as_ref().and_then(|c| c.name.as_deref()),
                ),
                dataset: Some(dataset.clone()),
            }
        })
        .collect()
}

pub fn get_ui_datasources(datasources: &[Datasource]) -> Vec<UiDatasource> {
    datasources
        .iter()
        .map(|datasource| UiDatasource {
            id: datasource.id.unwrap_or(-1),
            name: or_no_data(datasource.name.as_deref()),
            datasource_type: or_no_data(datasource.datasource_type.as_deref()),
            datasource: Some(datasource.clone()),
        })
        .collect()
}
