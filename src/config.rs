use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, TriageError};

/// A user-configured severity tier, mapped to an issue label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Priority {
    pub name: String,
    pub label: String,
    /// `#RRGGBB`
    pub color: String,
}

impl Priority {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: format!("Priority: {}", name),
            color: "#532BE3".to_string(),
        }
    }

    /// Color as GitHub's label API expects it.
    pub fn api_color(&self) -> &str {
        self.color.strip_prefix('#').unwrap_or(&self.color)
    }
}

/// Colors used when rendering Markdown bodies
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub code: String,
    pub heading: String,
    pub link: String,
    pub quote: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            code: "#777777".to_string(),
            heading: "#E5C07B".to_string(),
            link: "#61AFEF".to_string(),
            quote: "#555555".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_priorities")]
    pub priorities: Vec<Priority>,
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_priorities() -> Vec<Priority> {
    vec![
        Priority::new("Low"),
        Priority::new("Medium"),
        Priority::new("High"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            priorities: default_priorities(),
            theme: ThemeConfig::default(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("triage").join("config.toml"))
}

impl Config {
    /// Load from an explicit path, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file or
    /// a file that fails to parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Config::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| TriageError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| TriageError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        if config.priorities.is_empty() {
            config.priorities = default_priorities();
        }
        Ok(config)
    }

    pub fn priority(&self, name: &str) -> Option<&Priority> {
        self.priorities.iter().find(|p| p.name == name)
    }
}
