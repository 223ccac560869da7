use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;
use models::{
    Entity, EnumerationItem, UiAlert, UiAnomaly, UiDataset, UiDatasource, UiMetric,
    UiSubscriptionGroup,
};
use search::{SearchSummary, Searchable};

use crate::output::{self, CliOutput, JsonCell};

/// Exported payloads from which rows are shaped.
#[derive(Debug, Clone, clap::Args)]
pub struct Sources {
    /// Path of the exported entities to list, or "-" for stdin.
    #[clap(long, short)]
    pub input: PathBuf,
    /// Path of exported alerts, used to resolve the alerts of subscription groups.
    #[clap(long)]
    pub alerts: Option<PathBuf>,
    /// Path of exported subscription groups, used to resolve the subscription groups of alerts.
    #[clap(long)]
    pub subscription_groups: Option<PathBuf>,
    /// Path of exported enumeration items, used to resolve the dimensions of subscription groups.
    #[clap(long)]
    pub enumeration_items: Option<PathBuf>,
}

/// Read the payload at `path`, where "-" is stdin.
pub fn read_payload(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Read and parse the list of `entity` at `path`.
pub fn load<T>(entity: Entity, path: &Path) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    let payload = read_payload(path)?;
    let parsed = models::parse_list(entity, &payload)
        .with_context(|| {
            format!(
                "failed to load {}, which must be a listing of GET {}",
                path.display(),
                entity.endpoint()
            )
        })?;
    Ok(parsed)
}

fn load_optional<T>(entity: Entity, path: Option<&Path>) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    match path {
        Some(path) => load(entity, path),
        None => Ok(Vec::new()),
    }
}

fn load_enumeration_items(path: &Path) -> anyhow::Result<Vec<EnumerationItem>> {
    let payload = read_payload(path)?;
    let items: Option<Vec<EnumerationItem>> = serde_json::from_slice(&payload)
        .with_context(|| format!("failed to parse enumeration items of {}", path.display()))?;
    Ok(items.unwrap_or_default())
}

/// Rows of a single entity kind, shaped for display and search.
#[derive(Debug)]
pub enum Rows {
    Alerts(Vec<UiAlert>),
    Anomalies(Vec<UiAnomaly>),
    SubscriptionGroups(Vec<UiSubscriptionGroup>),
    Metrics(Vec<UiMetric>),
    Datasets(Vec<UiDataset>),
    Datasources(Vec<UiDatasource>),
}

impl Rows {
    pub fn load(entity: Entity, sources: &Sources) -> anyhow::Result<Self> {
        let rows = match entity {
            Entity::Alerts => {
                let alerts = load(entity, &sources.input)?;
                let groups = load_optional(
                    Entity::SubscriptionGroups,
                    sources.subscription_groups.as_deref(),
                )?;
                Rows::Alerts(models::get_ui_alerts(&alerts, &groups))
            }
            Entity::Anomalies => {
                let anomalies = load(entity, &sources.input)?;
                Rows::Anomalies(models::get_ui_anomalies(&anomalies))
            }
            Entity::SubscriptionGroups => {
                let groups = load(entity, &sources.input)?;
                let alerts = load_optional(Entity::Alerts, sources.alerts.as_deref())?;
                let items = match &sources.enumeration_items {
                    Some(path) => load_enumeration_items(path)?,
                    None => Vec::new(),
                };
                Rows::SubscriptionGroups(models::get_ui_subscription_groups(
                    &groups, &alerts, &items,
                ))
            }
            Entity::Metrics => {
                Rows::Metrics(models::get_ui_metrics(&load(entity, &sources.input)?))
            }
            Entity::Datasets => {
                Rows::Datasets(models::get_ui_datasets(&load(entity, &sources.input)?))
            }
            Entity::Datasources => {
                Rows::Datasources(models::get_ui_datasources(&load(entity, &sources.input)?))
            }
        };
        tracing::debug!(%entity, rows = rows.len(), "loaded rows");

        Ok(rows)
    }

    pub fn len(&self) -> usize {
        match self {
            Rows::Alerts(rows) => rows.len(),
            Rows::Anomalies(rows) => rows.len(),
            Rows::SubscriptionGroups(rows) => rows.len(),
            Rows::Metrics(rows) => rows.len(),
            Rows::Datasets(rows) => rows.len(),
            Rows::Datasources(rows) => rows.len(),
        }
    }

    /// Write the rows matching every one of `words`, returning a summary
    /// of the matched and total rows.
    pub fn write_matching<W: AsRef<str>>(
        &self,
        ctx: &mut crate::CliContext,
        words: &[W],
    ) -> anyhow::Result<SearchSummary> {
        match self {
            Rows::Alerts(rows) => write_matching(ctx, rows, words),
            Rows::Anomalies(rows) => write_matching(ctx, rows, words),
            Rows::SubscriptionGroups(rows) => write_matching(ctx, rows, words),
            Rows::Metrics(rows) => write_matching(ctx, rows, words),
            Rows::Datasets(rows) => write_matching(ctx, rows, words),
            Rows::Datasources(rows) => write_matching(ctx, rows, words),
        }
    }
}

pub fn write_matching<T, W>(
    ctx: &mut crate::CliContext,
    rows: &[T],
    words: &[W],
) -> anyhow::Result<SearchSummary>
where
    T: Searchable + CliOutput<TableAlt = ()> + Clone,
    W: AsRef<str>,
{
    let filtered = search::filter_entities(rows, words);
    let summary = filtered.summary();

    ctx.write_all(filtered.cloned(), ())?;
    Ok(summary)
}

impl CliOutput for UiAlert {
    type TableAlt = ();
    type CellValue = JsonCell;

    fn table_headers(_alt: Self::TableAlt) -> Vec<&'static str> {
        vec![
            "ID",
            "Name",
            "Status",
            "Created By",
            "Detection Types",
            "Subscription Groups",
        ]
    }

    fn into_table_row(self, _alt: Self::TableAlt) -> Vec<Self::CellValue> {
        let groups = self.subscription_groups.iter().map(|g| &g.name).join("\n");

        let mut row = output::to_table_row(
            self,
            &["/id", "/name", "/activeText", "/createdBy", "/detectionTypes"],
        );
        row.push(JsonCell(Some(groups.into())));
        row
    }
}

impl CliOutput for UiAnomaly {
    type TableAlt = ();
    type CellValue = JsonCell;

    fn table_headers(_alt: Self::TableAlt) -> Vec<&'static str> {
        vec![
            "Name",
            "Alert",
            "Metric",
            "Dataset",
            "Current",
            "Predicted",
            "Deviation",
            "Start",
            "Duration",
        ]
    }

    fn into_table_row(self, _alt: Self::TableAlt) -> Vec<Self::CellValue> {
        output::to_table_row(
            self,
            &[
                "/name",
                "/alertName",
                "/metricName",
                "/datasetName",
                "/current",
                "/predicted",
                "/deviation",
                "/startTime",
                "/duration",
            ],
        )
    }
}

impl CliOutput for UiSubscriptionGroup {
    type TableAlt = ();
    type CellValue = JsonCell;

    fn table_headers(_alt: Self::TableAlt) -> Vec<&'static str> {
        vec!["ID", "Name", "Cron", "Alerts", "Dimensions", "Emails"]
    }

    fn into_table_row(self, _alt: Self::TableAlt) -> Vec<Self::CellValue> {
        output::to_table_row(
            self,
            &[
                "/id",
                "/name",
                "/cron",
                "/alertCount",
                "/dimensionCount",
                "/emails",
            ],
        )
    }
}

impl CliOutput for UiMetric {
    type TableAlt = ();
    type CellValue = JsonCell;

    fn table_headers(_alt: Self::TableAlt) -> Vec<&'static str> {
        vec!["ID", "Name", "Dataset", "Aggregation", "Status"]
    }

    fn into_table_row(self, _alt: Self::TableAlt) -> Vec<Self::CellValue> {
        output::to_table_row(
            self,
            &[
                "/id",
                "/name",
                "/datasetName",
                "/aggregationFunction",
                "/activeText",
            ],
        )
    }
}

impl CliOutput for UiDataset {
    type TableAlt = ();
    type CellValue = JsonCell;

    fn table_headers(_alt: Self::TableAlt) -> Vec<&'static str> {
        vec!["ID", "Name", "Datasource", "Time Column", "Status"]
    }

    fn into_table_row(self, _alt: Self::TableAlt) -> Vec<Self::CellValue> {
        output::to_table_row(
            self,
            &["/id", "/name", "/datasourceName", "/timeColumn", "/activeText"],
        )
    }
}

impl CliOutput for UiDatasource {
    type TableAlt = ();
    type CellValue = JsonCell;

    fn table_headers(_alt: Self::TableAlt) -> Vec<&'static str> {
        vec!["ID", "Name", "Type"]
    }

    fn into_table_row(self, _alt: Self::TableAlt) -> Vec<Self::CellValue> {
        output::to_table_row(self, &["/id", "/name", "/type"])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::{json, Value};

    fn write_fixture(dir: &Path, name: &str, value: Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_alerts_resolve_subscription_groups() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(
            dir.path(),
            "alerts.json",
            json!([
                {"id": 1, "name": "cpu-alert", "active": true, "owner": {"principal": "bob"}},
                {"id": 2, "name": "mem-alert", "active": false},
            ]),
        );
        let groups = write_fixture(
            dir.path(),
            "groups.json",
            json!([{"id": 7, "name": "oncall", "alerts": [{"id": 1}]}]),
        );
        let sources = Sources {
            input,
            alerts: None,
            subscription_groups: Some(groups),
            enumeration_items: None,
        };

        let rows = Rows::load(Entity::Alerts, &sources).unwrap();
        assert_eq!(rows.len(), 2);

        let Rows::Alerts(alerts) = rows else {
            panic!("expected alerts");
        };
        let cells: Vec<Option<Value>> = alerts[0]
            .clone()
            .into_table_row(())
            .into_iter()
            .map(|cell| cell.0)
            .collect();

        assert_eq!(
            cells,
            vec![
                Some(json!(1)),
                Some(json!("cpu-alert")),
                Some(json!("Active")),
                Some(json!("bob")),
                Some(json!([])),
                Some(json!("oncall")),
            ]
        );
    }

    #[test]
    fn test_null_payload_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "metrics.json", Value::Null);
        let sources = Sources {
            input,
            alerts: None,
            subscription_groups: None,
            enumeration_items: None,
        };

        let rows = Rows::load(Entity::Metrics, &sources).unwrap();
        assert_eq!(rows.len(), 0);
    }

    #[test]
    fn test_malformed_payload_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("datasets.json");
        std::fs::write(&input, "{\"not\": \"a list\"}").unwrap();
        let sources = Sources {
            input,
            alerts: None,
            subscription_groups: None,
            enumeration_items: None,
        };

        let err = Rows::load(Entity::Datasets, &sources).unwrap_err();
        assert!(err.to_string().starts_with("failed to load"), "{err}");
        assert!(
            err.to_string().ends_with("datasets.json, which must be a listing of GET /api/datasets"),
            "{err}"
        );
    }
}
