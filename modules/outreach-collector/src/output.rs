//! Per-run output files: the JSON snapshot and the generated messages file.
//! Both are overwritten on every run.

use std::path::Path;

use outreach_common::{BusinessRecord, OutreachError, Result};

/// Pretty JSON array of every record from this run.
pub fn write_snapshot(path: &Path, records: &[BusinessRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| OutreachError::io(path, std::io::Error::other(e)))?;
    std::fs::write(path, json).map_err(|e| OutreachError::io(path, e))
}

/// One block per message, numbered from 1.
pub fn render_messages(messages: &[(&BusinessRecord, String)]) -> String {
    let rule = "=".repeat(80);
    let mut content = String::new();
    for (idx, (business, message)) in messages.iter().enumerate() {
        content.push_str(&format!(
            "=== Message {} for {} ({}) ===\n\n",
            idx + 1,
            business.name,
            business.phone
        ));
        content.push_str(message);
        content.push_str("\n\n");
        content.push_str(&rule);
        content.push_str("\n\n");
    }
    content
}

pub fn write_messages(path: &Path, messages: &[(&BusinessRecord, String)]) -> Result<()> {
    std::fs::write(path, render_messages(messages)).map_err(|e| OutreachError::io(path, e))
}
