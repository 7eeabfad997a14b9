use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

/// Resolve a playbook path (from config or CLI) to a relative path within
/// the project root. The container runs with the root as its workdir, so
/// the relative form is what ansible sees.
pub fn normalize_playbook_path(root: &Path, playbook: &str) -> Result<PathBuf> {
    if playbook.trim().is_empty() {
        bail!("Playbook path cannot be blank");
    }
    let playbook_path = PathBuf::from(playbook);
    let absolute = if playbook_path.is_absolute() {
        playbook_path
    } else {
        root.join(&playbook_path)
    };
    if !absolute.exists() {
        bail!("Playbook not found: {}", absolute.display());
    }
    let relative = absolute
        .strip_prefix(root)
        .context("Playbook must be inside the project directory")?;
    Ok(relative.to_path_buf())
}

/// Walk the project tree to find playbooks.
/// Returns a sorted list of relative paths.
pub fn discover_playbooks(root: &Path, max_depth: usize) -> Result<Vec<String>> {
    // Check well-known names first.
    for name in ["site.yml", "site.yaml", "playbook.yml"] {
        if root.join(name).is_file() {
            return Ok(vec![name.to_string()]);
        }
    }

    let mut matches = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_skip(e));

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_yaml(path) && is_playbook(path) {
            if let Ok(rel) = path.strip_prefix(root) {
                matches.push(rel.to_string_lossy().to_string());
            }
        }
    }

    matches.sort();
    Ok(matches)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml" | "YAML" | "YML")
    )
}

/// A playbook is a YAML document whose top level is a sequence of plays,
/// each targeting hosts or importing another playbook. Role task files and
/// variable files parse as mappings and are rejected here.
fn is_playbook(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let mut content = String::new();
    if file.read_to_string(&mut content).is_err() {
        return false;
    }
    let doc: serde_yaml::Value = match serde_yaml::from_str(&content) {
        Ok(v) => v,
        Err(_) => return false,
    };
    match doc {
        serde_yaml::Value::Sequence(plays) => plays.iter().any(|play| {
            play.as_mapping().is_some_and(|m| {
                m.keys()
                    .filter_map(|k| k.as_str())
                    .any(|k| k == "hosts" || k == "import_playbook")
            })
        }),
        _ => false,
    }
}

fn should_skip(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    matches!(
        entry.file_name().to_str().unwrap_or_default(),
        ".git"
            | "roles"
            | "collections"
            | "group_vars"
            | "host_vars"
            | "node_modules"
            | ".idea"
            | ".vscode"
    )
}
