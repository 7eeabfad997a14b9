use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::types::Config;

/// Name of the per-project configuration file.
pub const CONFIG_FILE: &str = ".ansidock";

/// The subset of fields a project file may set. Anything left out keeps
/// its built-in default.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    image: Option<String>,
    docker_timeout: Option<u64>,
    search_depth: Option<usize>,
    playbook: Option<String>,
    inventory: Option<String>,
}

impl FileConfig {
    fn merge_into(self, mut base: Config) -> Config {
        if let Some(image) = self.image {
            base.image = image;
        }
        if let Some(timeout) = self.docker_timeout {
            base.docker_timeout = timeout;
        }
        if let Some(depth) = self.search_depth {
            base.search_depth = depth;
        }
        if self.playbook.is_some() {
            base.playbook = self.playbook;
        }
        if self.inventory.is_some() {
            base.inventory = self.inventory;
        }
        base
    }
}

/// Load the effective configuration for a project directory.
///
/// A missing `.ansidock` file yields pure defaults; a malformed one is an
/// error rather than silently ignored.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: FileConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(file.merge_into(Config::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(dir.path()).unwrap();
        assert_eq!(cfg.image, Config::default().image);
        assert_eq!(cfg.docker_timeout, Config::default().docker_timeout);
    }

    #[test]
    fn file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "image: example/ansible:9\nplaybook: playbooks/site.yml\n",
        )
        .unwrap();

        let cfg = load(dir.path()).unwrap();
        assert_eq!(cfg.image, "example/ansible:9");
        assert_eq!(cfg.playbook.as_deref(), Some("playbooks/site.yml"));
        // Untouched fields keep their defaults.
        assert_eq!(cfg.docker_timeout, Config::default().docker_timeout);
        assert!(cfg.inventory.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), ": not yaml [").unwrap();
        assert!(load(dir.path()).is_err());
    }

    #[test]
    fn timeout_override_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "docker_timeout: 30\n").unwrap();
        let cfg = load(dir.path()).unwrap();
        assert_eq!(cfg.docker_timeout, 30);
    }
}
