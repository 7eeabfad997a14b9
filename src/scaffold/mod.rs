//! Starter-project scaffolding for `ansidock init`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use include_dir::{Dir, DirEntry, include_dir};

static SCAFFOLD: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/scaffold");

/// Write the embedded starter tree into `target`.
///
/// Refuses to touch anything if any destination file already exists, so a
/// half-initialized project is never left behind. Returns the written paths.
pub fn write_scaffold(target: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(&SCAFFOLD, &mut files);

    for file in &files {
        let dest = target.join(file.path());
        if dest.exists() {
            bail!("refusing to overwrite existing file: {}", dest.display());
        }
    }

    let mut written = Vec::new();
    for file in files {
        let dest = target.join(file.path());
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&dest, file.contents())
            .with_context(|| format!("failed to write {}", dest.display()))?;
        written.push(dest);
    }

    Ok(written)
}

fn collect_files<'a>(dir: &'a Dir<'a>, out: &mut Vec<&'a include_dir::File<'a>>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => collect_files(sub, out),
            DirEntry::File(file) => out.push(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_the_starter_tree() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_scaffold(dir.path()).unwrap();

        assert!(!written.is_empty());
        assert!(dir.path().join("playbooks/simple.yml").is_file());
        assert!(dir.path().join("inventory/hosts.ini").is_file());
        assert!(dir.path().join("requirements.yml").is_file());
        assert!(dir.path().join(".ansidock").is_file());
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        write_scaffold(dir.path()).unwrap();
        assert!(write_scaffold(dir.path()).is_err());
    }

    #[test]
    fn scaffolded_playbook_is_discoverable() {
        let dir = tempfile::tempdir().unwrap();
        write_scaffold(dir.path()).unwrap();
        let playbooks = crate::playbook::discover_playbooks(dir.path(), 4).unwrap();
        assert_eq!(playbooks, vec!["playbooks/simple.yml"]);
    }

    #[test]
    fn scaffolded_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        write_scaffold(dir.path()).unwrap();
        let cfg = crate::config::load(dir.path()).unwrap();
        assert_eq!(cfg.playbook.as_deref(), Some("playbooks/simple.yml"));
        assert_eq!(cfg.inventory.as_deref(), Some("inventory/hosts.ini"));
    }
}
