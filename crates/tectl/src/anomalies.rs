use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use models::{Anomaly, Entity, UiAnomaly};

use crate::rows;

#[derive(Debug, clap::Args)]
pub struct Anomalies {
    /// Path of exported anomalies, or "-" for stdin.
    #[clap(long, short)]
    pub input: PathBuf,
    /// List anomalies which end at or after this time.
    ///
    /// Times are milliseconds since the Unix epoch, or RFC 3339
    /// timestamps in UTC such as "2022-05-01 08:00:00".
    #[clap(long, requires = "end", value_parser = parse_time)]
    pub start: Option<i64>,
    /// List anomalies which start at or before this time.
    #[clap(long, requires = "start", value_parser = parse_time)]
    pub end: Option<i64>,
    /// List anomalies which are underway at this time.
    #[clap(long, conflicts_with_all = ["start", "end"], value_parser = parse_time)]
    pub at: Option<i64>,
    /// Only list anomalies of this alert ID.
    #[clap(long)]
    pub alert: Option<i64>,
    /// Only list anomalies of this metric ID.
    #[clap(long)]
    pub metric: Option<i64>,
    /// Omit anomalies which have been labeled to be ignored.
    #[clap(long)]
    pub hide_ignored: bool,
    /// Search words, each of which must be found within a listed anomaly.
    #[clap(long, short)]
    pub search: Vec<String>,
}

impl Anomalies {
    pub async fn run(&self, ctx: &mut crate::CliContext) -> anyhow::Result<()> {
        let anomalies: Vec<Anomaly> = rows::load(Entity::Anomalies, &self.input)?;
        let total = anomalies.len();

        let rows = self.select(anomalies);
        let words = search::search_words(&self.search.join(" "));

        let summary = rows::write_matching(ctx, &rows, &words)?;
        tracing::info!(total, selected = rows.len(), %summary, "listed anomalies");

        if !words.is_empty() {
            eprintln!("{summary}");
        }
        Ok(())
    }

    /// Select and shape anomalies, ordered on ascending end time
    /// if a time was given.
    fn select(&self, mut anomalies: Vec<Anomaly>) -> Vec<UiAnomaly> {
        if self.hide_ignored {
            anomalies = owned(models::filter_out_ignored_anomalies(&anomalies));
        }

        let by_alert = |anomaly: &Anomaly| match self.alert {
            Some(id) => anomaly.alert.as_ref().and_then(|alert| alert.id) == Some(id),
            None => true,
        };
        let by_metric = |anomaly: &Anomaly| match self.metric {
            Some(id) => anomaly.metric.as_ref().and_then(|metric| metric.id) == Some(id),
            None => true,
        };
        let filters: [&dyn Fn(&Anomaly) -> bool; 2] = [&by_alert, &by_metric];
        anomalies = owned(models::filter_anomalies_by_functions(&anomalies, &filters));

        let selected = match self.at {
            Some(at) => models::anomalies_at_time(&anomalies, Some(at)),
            None => models::filter_anomalies_by_time(&anomalies, self.start, self.end),
        };
        selected.into_iter().map(models::get_ui_anomaly).collect()
    }
}

fn owned(anomalies: Vec<&Anomaly>) -> Vec<Anomaly> {
    anomalies.into_iter().cloned().collect()
}

/// Parse milliseconds since the Unix epoch, or an RFC 3339 timestamp.
pub fn parse_time(value: &str) -> Result<i64, String> {
    if let Ok(epoch_ms) = value.parse::<i64>() {
        return Ok(epoch_ms);
    }
    let ts = humantime::parse_rfc3339_weak(value).map_err(|err| err.to_string())?;
    let elapsed = ts
        .duration_since(UNIX_EPOCH)
        .map_err(|_| format!("{value} is before the Unix epoch"))?;

    i64::try_from(elapsed.as_millis()).map_err(|err| err.to_string())
}
