use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SrtError};

pub const CONFIG_FILE_NAME: &str = "srt.toml";

/// Environment variable naming an extra directory searched first
pub const CONFIG_DIR_ENV: &str = "SRT_CONF";

fn default_localversion() -> String {
    "localversion-rt".to_string()
}

/// Settings for one `<repo>/<upstream-branch>` pair.
///
/// Most keys are only needed by a single stage, so they are optional here
/// and checked with [`ReleaseConfig::require`] where they are used.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// File holding the `-rtN` marker, relative to the work tree
    #[serde(default = "default_localversion")]
    pub localversion: String,

    #[serde(default)]
    pub gpg_key_id: Option<String>,

    #[serde(default)]
    pub gnupghome: Option<String>,

    #[serde(default)]
    pub prj_git_tree: Option<String>,

    #[serde(default)]
    pub prj_dir: Option<String>,

    #[serde(default)]
    pub mail_to: Vec<String>,

    #[serde(default)]
    pub sender: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Template override for the final release announcement
    #[serde(default)]
    pub announce: Option<PathBuf>,

    /// Template override for the release candidate cover letter
    #[serde(default)]
    pub rc_text: Option<PathBuf>,

    #[serde(skip)]
    pub section: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            localversion: default_localversion(),
            gpg_key_id: None,
            gnupghome: None,
            prj_git_tree: None,
            prj_dir: None,
            mail_to: Vec::new(),
            sender: None,
            name: None,
            announce: None,
            rc_text: None,
            section: String::new(),
        }
    }
}

impl ReleaseConfig {
    /// Returns a required string key or a config error naming it
    pub fn require<'a>(&self, key: &str, value: &'a Option<String>) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| {
            SrtError::config(format!(
                "missing key '{}' in section [{}]",
                key, self.section
            ))
        })
    }

    pub fn gpg_key_id(&self) -> Result<&str> {
        self.require("gpg_key_id", &self.gpg_key_id)
    }

    pub fn prj_git_tree(&self) -> Result<&str> {
        self.require("prj_git_tree", &self.prj_git_tree)
    }

    pub fn prj_dir(&self) -> Result<&str> {
        self.require("prj_dir", &self.prj_dir)
    }

    pub fn sender(&self) -> Result<&str> {
        self.require("sender", &self.sender)
    }

    pub fn name(&self) -> Result<&str> {
        self.require("name", &self.name)
    }

    pub fn mail_to(&self) -> Result<&[String]> {
        if self.mail_to.is_empty() {
            return Err(SrtError::config(format!(
                "missing key 'mail_to' in section [{}]",
                self.section
            )));
        }
        Ok(&self.mail_to)
    }

    /// GnuPG home: config value, then `$GNUPGHOME`, then `~/.gnupg`
    pub fn gnupghome(&self) -> String {
        if let Some(home) = &self.gnupghome {
            return home.clone();
        }
        if let Ok(home) = std::env::var("GNUPGHOME") {
            return home;
        }
        dirs::home_dir()
            .map(|h| h.join(".gnupg").to_string_lossy().into_owned())
            .unwrap_or_else(|| "~/.gnupg".to_string())
    }
}

/// All sections of one configuration file, keyed by `<repo>/<branch>`
pub type ConfigFile = HashMap<String, ReleaseConfig>;

/// Parses configuration text
pub fn parse_config(text: &str) -> Result<ConfigFile> {
    let mut sections: ConfigFile =
        toml::from_str(text).map_err(|e| SrtError::config(e.to_string()))?;
    for (name, section) in sections.iter_mut() {
        section.section = name.clone();
    }
    Ok(sections)
}

/// Candidate configuration files in lookup order.
///
/// 1. `$SRT_CONF/srt.toml`
/// 2. `./srt.toml`
/// 3. `<config dir>/srt.toml` (e.g. `~/.config/srt.toml`)
/// 4. `~/srt.toml`
/// 5. `/etc/srt/srt.toml`
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut dirs_list = Vec::new();
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        dirs_list.push(PathBuf::from(dir));
    }
    dirs_list.push(PathBuf::from("."));
    if let Some(dir) = dirs::config_dir() {
        dirs_list.push(dir);
    }
    if let Some(dir) = dirs::home_dir() {
        dirs_list.push(dir);
    }
    dirs_list.push(PathBuf::from("/etc/srt"));

    dirs_list
        .into_iter()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .collect()
}

/// Loads the section `name` (`<repo>/<upstream-branch>`).
///
/// With an explicit `config_path` only that file is read. Otherwise the
/// first file from [`config_search_paths`] that holds the section wins.
pub fn load_config(config_path: Option<&Path>, name: &str) -> Result<ReleaseConfig> {
    let candidates = match config_path {
        Some(path) => vec![path.to_path_buf()],
        None => config_search_paths(),
    };

    for path in &candidates {
        if config_path.is_none() && !path.exists() {
            continue;
        }
        let text = fs::read_to_string(path).map_err(|e| {
            SrtError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut sections = parse_config(&text)?;
        if let Some(section) = sections.remove(name) {
            debug!("Using configuration {} from {}", name, path.display());
            return Ok(section);
        }
    }

    Err(SrtError::config(format!(
        "Could not retrieve configuration {} from {}",
        name, CONFIG_FILE_NAME
    )))
}
