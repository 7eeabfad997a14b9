use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base container image the runs start from.
    pub image: String,
    /// Hard limit on a single container run, in seconds.
    pub docker_timeout: u64,
    /// How deep playbook discovery walks the project tree.
    pub search_depth: usize,
    /// Default playbook to run when none is given on the command line.
    pub playbook: Option<String>,
    /// Default inventory path, relative to the project directory.
    pub inventory: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: "alpine/ansible:latest".to_string(),
            docker_timeout: 600,
            search_depth: 4,
            playbook: None,
            inventory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_image_is_the_ansible_alpine_build() {
        let cfg = Config::default();
        assert_eq!(cfg.image, "alpine/ansible:latest");
    }

    #[test]
    fn defaults_have_no_playbook_or_inventory() {
        let cfg = Config::default();
        assert!(cfg.playbook.is_none());
        assert!(cfg.inventory.is_none());
    }
}
