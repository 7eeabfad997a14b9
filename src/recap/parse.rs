use super::{HostRecap, TaskFailure};

/// Parse the per-host counter lines that follow a `PLAY RECAP` header:
///
/// ```text
/// PLAY RECAP *********************************************************
/// localhost    : ok=2  changed=0  unreachable=0  failed=0  skipped=0  rescued=0  ignored=0
/// ```
///
/// Lines that don't look like recap entries are skipped, never fatal.
pub fn parse_recap(raw: &str) -> Vec<HostRecap> {
    let mut hosts = Vec::new();
    let mut in_recap = false;

    for line in raw.lines() {
        if line.starts_with("PLAY RECAP") {
            in_recap = true;
            continue;
        }
        if !in_recap {
            continue;
        }
        // A new play or task section ends the recap block.
        if line.starts_with("PLAY ") || line.starts_with("TASK ") {
            in_recap = false;
            continue;
        }
        if let Some(entry) = parse_recap_line(line) {
            hosts.push(entry);
        }
    }

    hosts
}

/// Parse a single `host : ok=N changed=N ...` line.
fn parse_recap_line(line: &str) -> Option<HostRecap> {
    let (host, counters) = line.split_once(':')?;
    let host = host.trim();
    if host.is_empty() {
        return None;
    }

    let mut recap = HostRecap {
        host: host.to_string(),
        ..Default::default()
    };
    let mut matched = false;

    for token in counters.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let Ok(value) = value.parse::<u32>() else {
            continue;
        };
        matched = true;
        match key {
            "ok" => recap.ok = value,
            "changed" => recap.changed = value,
            "unreachable" => recap.unreachable = value,
            "failed" => recap.failed = value,
            "skipped" => recap.skipped = value,
            "rescued" => recap.rescued = value,
            "ignored" => recap.ignored = value,
            _ => {}
        }
    }

    matched.then_some(recap)
}

/// Pair `fatal:`/`failed:` lines with the preceding `TASK [...]` header.
///
/// Expected shapes:
/// ```text
/// TASK [Install packages] *******************************************
/// fatal: [web1]: FAILED! => {"msg": "No package matching 'foo'"}
/// ```
pub fn parse_failures(raw: &str) -> Vec<TaskFailure> {
    let mut failures = Vec::new();
    let mut current_task = String::new();

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("TASK [")
            && let Some(end) = rest.find(']')
        {
            current_task = rest[..end].to_string();
            continue;
        }

        let trimmed = line.trim_start();
        let entry = trimmed
            .strip_prefix("fatal: [")
            .or_else(|| trimmed.strip_prefix("failed: ["));
        if let Some(rest) = entry
            && let Some(end) = rest.find(']')
        {
            let host = rest[..end].to_string();
            let detail = rest[end + 1..]
                .trim_start_matches(':')
                .trim_start()
                .to_string();
            failures.push(TaskFailure {
                task: current_task.clone(),
                host,
                detail,
            });
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
PLAY [Simple test playbook] ****************************************

TASK [Print a test message] ****************************************
ok: [localhost] => {
    \"msg\": \"Test successful!\"
}

PLAY RECAP *********************************************************
localhost                  : ok=2    changed=1    unreachable=0    failed=0    skipped=3    rescued=0    ignored=0
";

    #[test]
    fn parses_a_single_host_recap() {
        let recap = parse_recap(SAMPLE);
        assert_eq!(recap.len(), 1);
        let host = &recap[0];
        assert_eq!(host.host, "localhost");
        assert_eq!(host.ok, 2);
        assert_eq!(host.changed, 1);
        assert_eq!(host.skipped, 3);
        assert!(host.passed());
    }

    #[test]
    fn parses_multiple_hosts() {
        let raw = "\
PLAY RECAP *****
web1 : ok=4 changed=2 unreachable=0 failed=0 skipped=0 rescued=0 ignored=0
web2 : ok=1 changed=0 unreachable=1 failed=0 skipped=0 rescued=0 ignored=0
";
        let recap = parse_recap(raw);
        assert_eq!(recap.len(), 2);
        assert!(recap[0].passed());
        assert!(!recap[1].passed());
    }

    #[test]
    fn output_without_recap_yields_nothing() {
        assert!(parse_recap("TASK [noop] ****\nok: [localhost]\n").is_empty());
    }

    #[test]
    fn counter_lines_outside_the_recap_block_are_ignored() {
        let raw = "\
something : ok=9 changed=9
PLAY RECAP *****
localhost : ok=1 changed=0 unreachable=0 failed=0
";
        let recap = parse_recap(raw);
        assert_eq!(recap.len(), 1);
        assert_eq!(recap[0].ok, 1);
    }

    #[test]
    fn garbage_inside_the_recap_block_is_skipped() {
        let raw = "\
PLAY RECAP *****
not a recap line
localhost : ok=1 changed=0 unreachable=0 failed=1
";
        let recap = parse_recap(raw);
        assert_eq!(recap.len(), 1);
        assert_eq!(recap[0].failed, 1);
    }

    #[test]
    fn failures_are_paired_with_their_task() {
        let raw = "\
TASK [Install packages] ****
fatal: [web1]: FAILED! => {\"msg\": \"No package matching 'foo'\"}

TASK [Copy files] ****
ok: [web1]
";
        let failures = parse_failures(raw);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].task, "Install packages");
        assert_eq!(failures[0].host, "web1");
        assert!(failures[0].detail.starts_with("FAILED!"));
    }

    #[test]
    fn clean_output_has_no_failures() {
        assert!(parse_failures(SAMPLE).is_empty());
    }
}
