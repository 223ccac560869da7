use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::output::OutputType;

/// Delay between the last change of the search words and recomputing
/// the browsed list.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output format used when `--output` isn't given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputType>,
    /// Debounce of `browse` searches.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "humantime_serde")]
    pub debounce: Option<Duration>,
}

impl Config {
    pub fn debounce(&self) -> Duration {
        self.debounce.unwrap_or(DEFAULT_DEBOUNCE)
    }

    /// Load the Config of `profile` from `dir`.
    /// A profile which hasn't been written yet has a default Config.
    pub fn load(dir: &Path, profile: &str) -> anyhow::Result<Self> {
        let path = config_path(dir, profile);

        let config = match std::fs::read(&path) {
            Ok(content) => serde_json::from_slice(&content)
                .with_context(|| format!("failed to parse config at {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config not found; using defaults");
                Config::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config at {}", path.display()))
            }
        };
        Ok(config)
    }

    /// Write the Config of `profile` into `dir`, replacing a prior version.
    pub fn write(&self, dir: &Path, profile: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;

        let path = config_path(dir, profile);
        let tmp = dir.join(format!(".{profile}.json.tmp"));

        let content = serde_json::to_vec_pretty(self)?;
        std::fs::write(&tmp, content)
            .with_context(|| format!("failed to write config to {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to persist config to {}", path.display()))?;

        tracing::debug!(path = %path.display(), "wrote config");
        Ok(())
    }
}

/// Directory of profile configurations, which is `$CONFIG_DIR/tectl`
/// unless otherwise overridden.
pub fn config_dir(overridden: Option<&Path>) -> anyhow::Result<PathBuf> {
    match overridden {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(dirs::config_dir()
            .context("couldn't determine the user configuration directory")?
            .join("tectl")),
    }
}

fn config_path(dir: &Path, profile: &str) -> PathBuf {
    dir.join(format!("{profile}.json"))
}

/// Manage the configuration of the current profile.
#[derive(Debug, clap::Args)]
pub struct ConfigCmd {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
enum Command {
    /// Print the current configuration.
    Show,
    /// Set the output format used when `--output` isn't given.
    SetOutput {
        #[clap(value_enum)]
        output: OutputType,
    },
    /// Set the debounce of `browse` searches, such as "300ms".
    SetDebounce { debounce: humantime::Duration },
}

impl ConfigCmd {
    pub async fn run(&self, ctx: &mut crate::CliContext) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Show => {
                let mut stdout = std::io::stdout().lock();
                serde_yaml::to_writer(&mut stdout, ctx.config())?;
            }
            Command::SetOutput { output } => {
                ctx.config_mut().output = Some(*output);
            }
            Command::SetDebounce { debounce } => {
                ctx.config_mut().debounce = Some(**debounce);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_profile_has_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), "default").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.debounce(), DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_profiles_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");

        let config = Config {
            output: Some(OutputType::Json),
            debounce: Some(Duration::from_millis(1500)),
        };
        config.write(&nested, "staging").unwrap();

        insta::assert_snapshot!(std::fs::read_to_string(nested.join("staging.json")).unwrap(), @r###"
        {
          "output": "json",
          "debounce": "1s 500ms"
        }
        "###);

        assert_eq!(Config::load(&nested, "staging").unwrap(), config);
        assert_eq!(Config::load(&nested, "default").unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.json"), "{not json").unwrap();

        let err = Config::load(dir.path(), "default").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config at"), "{err}");
    }
}
