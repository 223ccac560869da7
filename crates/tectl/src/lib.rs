use std::path::PathBuf;

mod anomalies;
mod browse;
mod config;
mod list;
mod output;
mod rows;

use output::{Output, OutputType};

/// A command-line console for searching ThirdEye alerts, anomalies,
/// subscription groups, metrics, datasets and datasources.
///
/// Entities are read from exported REST payloads: JSON arrays, as returned
/// by listing endpoints such as `GET /api/alerts`.
#[derive(Debug, clap::Parser)]
#[clap(author, version)]
pub struct Cli {
    /// Configuration profile to use.
    ///
    /// Profiles are distinct configurations of the `tectl` tool, and are
    /// completely optional.
    #[clap(long, default_value = "default", env = "TECTL_PROFILE")]
    profile: String,

    /// Directory holding profile configurations.
    #[clap(long, env = "TECTL_CONFIG_DIR", hide = true)]
    config_dir: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Command,

    #[clap(flatten)]
    output: Output,
}

#[derive(Debug, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// List entities of an exported payload, optionally filtered by search words.
    ///
    /// A row is listed if every search word is found, ignoring case, within
    /// at least one of its displayed values.
    List(list::List),
    /// List anomalies within a time range, or underway at an instant.
    Anomalies(anomalies::Anomalies),
    /// Interactively search entities of an exported payload.
    ///
    /// Each line read from stdin replaces the current search words, and
    /// matching rows are re-listed once input has paused.
    Browse(browse::Browse),
    /// Manage the configuration of the current profile.
    Config(config::ConfigCmd),
}

#[derive(Debug)]
pub struct CliContext {
    config: config::Config,
    output: output::Output,
}

impl CliContext {
    pub fn config_mut(&mut self) -> &mut config::Config {
        &mut self.config
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    pub fn write_all<I, T>(&mut self, items: I, table_alt: T::TableAlt) -> anyhow::Result<()>
    where
        T: output::CliOutput,
        I: IntoIterator<Item = T>,
    {
        match self.get_output_type() {
            OutputType::Json => output::print_json(items),
            OutputType::Yaml => output::print_yaml(items),
            OutputType::Table => output::print_table(table_alt, items),
        }
    }

    pub fn get_output_type(&mut self) -> OutputType {
        use crossterm::tty::IsTty;

        if let Some(ty) = self.output.output.or(self.config.output) {
            ty
        } else if std::io::stdout().is_tty() {
            OutputType::Table
        } else {
            OutputType::Yaml
        }
    }
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        let config_dir = config::config_dir(self.config_dir.as_deref())?;
        let config = config::Config::load(&config_dir, &self.profile)?;
        let output = self.output.clone();
        let mut context = CliContext { config, output };

        match &self.cmd {
            Command::List(list) => list.run(&mut context).await,
            Command::Anomalies(anomalies) => anomalies.run(&mut context).await,
            Command::Browse(browse) => browse.run(&mut context).await,
            Command::Config(config) => config.run(&mut context).await,
        }?;

        context.config().write(&config_dir, &self.profile)?;

        Ok(())
    }
}

fn new_table(headers: Vec<&str>) -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .apply_modifier(comfy_table::modifiers::UTF8_SOLID_INNER_BORDERS);

    table.set_header(headers);
    table
}
