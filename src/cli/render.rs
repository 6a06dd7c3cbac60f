//! Console rendering of lifecycle results.

use crate::container::{DestroyReport, ShellRecord};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ShellRow<'a> {
    #[tabled(rename = "NAME")]
    name: &'a str,
    #[tabled(rename = "STATE")]
    state: &'a str,
    #[tabled(rename = "SSH")]
    ssh: &'a str,
    #[tabled(rename = "VOLUME")]
    volume: &'a str,
}

/// Table of shells, in the order given.
pub fn shells_table(records: &[ShellRecord]) -> String {
    let rows = records.iter().map(|r| ShellRow {
        name: &r.name,
        state: &r.state,
        ssh: &r.connect_hint,
        volume: &r.volume_description,
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

/// One line per name: removals first, then failures and reclaim warnings.
pub fn destroy_lines(report: &DestroyReport) -> Vec<String> {
    let mut lines = Vec::new();
    for name in &report.removed {
        lines.push(format!("✔ {} destroyed", name));
    }
    for warning in &report.reclaim_failures {
        lines.push(format!("! {}: {}", warning.name, warning.error));
    }
    for failure in &report.failures {
        lines.push(format!("✗ {}: {}", failure.name, failure.error));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DestroyFailure, ShellError};

    #[test]
    fn test_table_has_headers_and_rows() {
        let records = vec![ShellRecord {
            name: "alpha".to_string(),
            connect_hint: "ssh -p 3000 root@localhost".to_string(),
            volume_description: "/tmp/x -> /mnt".to_string(),
            state: "running".to_string(),
        }];

        let table = shells_table(&records);

        for needle in ["NAME", "STATE", "SSH", "VOLUME", "alpha", "ssh -p 3000", "/tmp/x -> /mnt"] {
            assert!(table.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn test_destroy_lines() {
        let report = DestroyReport {
            removed: vec!["alpha".to_string()],
            failures: vec![DestroyFailure {
                name: "ghost".to_string(),
                error: ShellError::NotFound("ghost".to_string()),
            }],
            reclaim_failures: Vec::new(),
        };

        assert_eq!(
            destroy_lines(&report),
            vec!["✔ alpha destroyed", "✗ ghost: no shell named ghost"]
        );
    }
}
