use models::Entity;

use crate::rows::{Rows, Sources};

#[derive(Debug, clap::Args)]
pub struct List {
    /// Kind of entity held by `--input`.
    #[clap(value_parser = parse_entity)]
    pub entity: Entity,
    #[clap(flatten)]
    pub sources: Sources,
    /// Search words, each of which must be found within a listed row.
    #[clap(long, short)]
    pub search: Vec<String>,
}

impl List {
    pub async fn run(&self, ctx: &mut crate::CliContext) -> anyhow::Result<()> {
        let rows = Rows::load(self.entity, &self.sources)?;
        let words = search::search_words(&self.search.join(" "));

        let summary = rows.write_matching(ctx, &words)?;
        tracing::info!(entity = %self.entity, %summary, "listed entities");

        if !words.is_empty() {
            eprintln!("{summary}");
        }
        Ok(())
    }
}

pub fn parse_entity(value: &str) -> Result<Entity, String> {
    value.parse::<Entity>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[derive(Debug, clap::Parser)]
    struct Harness {
        #[clap(flatten)]
        list: List,
    }

    #[test]
    fn test_parse_arguments() {
        let harness = Harness::parse_from([
            "tectl",
            "Subscription-Groups",
            "--input",
            "groups.json",
            "--alerts",
            "alerts.json",
            "-s",
            "cpu  oncall",
            "--search",
            "bob",
        ]);
        let List {
            entity,
            sources,
            search,
        } = harness.list;

        assert_eq!(entity, Entity::SubscriptionGroups);
        assert_eq!(sources.input.to_str(), Some("groups.json"));
        assert_eq!(sources.alerts.as_deref().and_then(|p| p.to_str()), Some("alerts.json"));
        assert_eq!(search::search_words(&search.join(" ")), vec!["cpu", "oncall", "bob"]);
    }

    #[test]
    fn test_unknown_entity() {
        let err = parse_entity("widgets").unwrap_err();
        assert!(err.contains("expected one of: alerts, anomalies"), "{err}");
    }
}
