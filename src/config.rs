// ⚙️ Configuration - one explicit value handed to the engine
// Defaults reproduce the Joint Command group setup

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_GROUP_URL: &str =
    "https://steamcommunity.com/groups/joint-command/memberslistxml/?xml=1";
pub const DEFAULT_PROFILE_URL: &str = "https://steamcommunity.com/profiles/{id}/?xml=1";
pub const DEFAULT_PREFIX: &str = "[(JCom)]";

/// Placeholder used whenever a display name cannot be fetched
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder the profile URL template must contain
pub const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    /// Tag prepended to every display name in the output
    pub prefix: String,

    /// Group roster endpoint (XML member list)
    pub group_url: String,

    /// Profile endpoint, `{id}` is replaced by the member id
    pub profile_url: String,

    pub output_file: PathBuf,
    pub additions_file: PathBuf,
    pub removals_file: PathBuf,

    /// Timeout for the roster request
    pub roster_timeout_secs: u64,

    /// Timeout for each profile name request
    pub name_timeout_secs: u64,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        WhitelistConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            group_url: DEFAULT_GROUP_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            output_file: PathBuf::from("whitelist.txt"),
            additions_file: PathBuf::from("manual_additions.txt"),
            removals_file: PathBuf::from("manual_removals.txt"),
            roster_timeout_secs: 30,
            name_timeout_secs: 5,
        }
    }
}

impl WhitelistConfig {
    /// Load config from a TOML file; relative paths are anchored at the file's directory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_paths(base_dir))
    }

    pub fn from_toml(input: &str) -> Result<Self> {
        let config: WhitelistConfig = toml::from_str(input).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            bail!("prefix must not be empty");
        }

        if self.group_url.trim().is_empty() {
            bail!("group_url must not be empty");
        }

        if !self.profile_url.contains(ID_PLACEHOLDER) {
            bail!("profile_url must contain {}, got {}", ID_PLACEHOLDER, self.profile_url);
        }

        if self.roster_timeout_secs == 0 || self.name_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }

        Ok(())
    }

    /// Anchor relative file paths at `base_dir`
    pub fn resolve_paths(mut self, base_dir: &Path) -> Self {
        let anchor = |p: PathBuf| if p.is_relative() { base_dir.join(p) } else { p };

        self.output_file = anchor(self.output_file);
        self.additions_file = anchor(self.additions_file);
        self.removals_file = anchor(self.removals_file);
        self
    }

    pub fn profile_url_for(&self, id: &str) -> String {
        self.profile_url.replace(ID_PLACEHOLDER, id)
    }

    pub fn roster_timeout(&self) -> Duration {
        Duration::from_secs(self.roster_timeout_secs)
    }

    pub fn name_timeout(&self) -> Duration {
        Duration::from_secs(self.name_timeout_secs)
    }
}
