//! The shared contact file: one business per line,
//! `phone,name,address,category,rating,website`, no quoting or escaping.
//!
//! The file is the only handoff between collector and dispatcher. Writes are
//! whole-file overwrites without locking; a half-written file is read as-is.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{OutreachError, Result};
use crate::types::{
    clean_phone, BusinessRecord, DEFAULT_CATEGORY, NOT_AVAILABLE, NO_WEBSITE, UNKNOWN_ADDRESS,
    UNKNOWN_BUSINESS,
};

/// A contact-file line as the dispatcher sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub phone: String,
    pub name: String,
    pub address: String,
    pub category: String,
    pub rating: String,
    pub website: String,
}

impl Contact {
    /// Split a line on commas. Missing or empty trailing fields fall back to
    /// the sentinel values. Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let parts: Vec<&str> = line.split(',').collect();
        let field = |idx: usize, fallback: &str| -> String {
            parts
                .get(idx)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| fallback.to_string())
        };

        Some(Self {
            phone: parts[0].trim().to_string(),
            name: field(1, UNKNOWN_BUSINESS),
            address: field(2, UNKNOWN_ADDRESS),
            category: field(3, DEFAULT_CATEGORY),
            rating: field(4, NOT_AVAILABLE),
            website: field(5, NO_WEBSITE),
        })
    }
}

/// Result of merging new records into existing contact lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub lines: Vec<String>,
    pub appended: usize,
}

/// Read non-empty trimmed lines. A missing file reads as empty.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| OutreachError::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Set union of existing lines and new records.
///
/// Existing lines keep their order with exact duplicates collapsed. A new
/// record is appended only if its phone is not already present, so each
/// distinct phone appears once and earlier entries always win.
pub fn merge(existing: Vec<String>, records: &[BusinessRecord]) -> MergeOutcome {
    let mut seen_lines = HashSet::new();
    let mut seen_phones = HashSet::new();
    let mut lines = Vec::with_capacity(existing.len() + records.len());

    for line in existing {
        if !seen_lines.insert(line.clone()) {
            continue;
        }
        if let Some(phone) = line.split(',').next() {
            seen_phones.insert(clean_phone(phone));
        }
        lines.push(line);
    }

    let mut appended = 0;
    for record in records {
        if seen_phones.insert(record.phone.clone()) {
            lines.push(record.contact_line());
            appended += 1;
        }
    }

    MergeOutcome { lines, appended }
}

/// Overwrite the file with the given lines and a trailing newline.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).map_err(|e| OutreachError::io(path, e))
}

/// Read, merge and write back in one step.
pub fn append_records(path: &Path, records: &[BusinessRecord]) -> Result<MergeOutcome> {
    let existing = read_lines(path)?;
    let outcome = merge(existing, records);
    write_lines(path, &outcome.lines)?;
    Ok(outcome)
}

/// Load contacts for sending. A missing or empty file is a hard stop.
pub fn load_contacts(path: &Path) -> Result<Vec<Contact>> {
    const GUIDANCE: &str =
        "create it with one business per line: phone,name,address,category,rating,website";

    if !path.exists() {
        return Err(OutreachError::missing_input(path, GUIDANCE));
    }
    let contacts: Vec<Contact> = read_lines(path)?
        .iter()
        .filter_map(|line| Contact::parse(line))
        .collect();
    if contacts.is_empty() {
        return Err(OutreachError::missing_input(
            path,
            format!("file has no contacts; {GUIDANCE}"),
        ));
    }

    tracing::info!(count = contacts.len(), path = %path.display(), "Loaded contacts");
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phone: &str, name: &str) -> BusinessRecord {
        BusinessRecord {
            name: name.into(),
            phone: phone.into(),
            address: "Tokha".into(),
            category: "Cafe".into(),
            rating: "4.5".into(),
            reviews: NOT_AVAILABLE.into(),
            website: NO_WEBSITE.into(),
            email: None,
            hours: None,
            description: None,
        }
    }

    #[test]
    fn parse_fills_missing_fields_with_sentinels() {
        let contact = Contact::parse("9811111111,Cafe A").unwrap();
        assert_eq!(contact.phone, "9811111111");
        assert_eq!(contact.name, "Cafe A");
        assert_eq!(contact.address, UNKNOWN_ADDRESS);
        assert_eq!(contact.category, DEFAULT_CATEGORY);
        assert_eq!(contact.rating, NOT_AVAILABLE);
        assert_eq!(contact.website, NO_WEBSITE);
        assert!(Contact::parse("   ").is_none());
    }

    #[test]
    fn embedded_commas_shift_fields() {
        let contact = Contact::parse("9811111111,Cafe A,Ward 5, Tokha,Cafe,4.5,No website").unwrap();
        assert_eq!(contact.address, "Ward 5");
        assert_eq!(contact.category, " Tokha");
    }

    #[test]
    fn merge_keeps_existing_and_skips_known_phones() {
        let existing = vec![
            "9811111111,Old Cafe,Tokha,Cafe,4.0,No website".to_string(),
            "9811111111,Old Cafe,Tokha,Cafe,4.0,No website".to_string(),
        ];
        let records = vec![record("9811111111", "New Name"), record("9812222222", "Cafe B")];

        let outcome = merge(existing, &records);

        assert_eq!(outcome.appended, 1);
        assert_eq!(
            outcome.lines,
            vec![
                "9811111111,Old Cafe,Tokha,Cafe,4.0,No website".to_string(),
                "9812222222,Cafe B,Tokha,Cafe,4.5,No website".to_string(),
            ]
        );
    }

    #[test]
    fn append_records_writes_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phone_numbers.txt");
        std::fs::write(&path, "9800000000,Existing\n\n").unwrap();

        let outcome = append_records(&path, &[record("9812222222", "Cafe B")]).unwrap();

        assert_eq!(outcome.appended, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "9800000000,Existing\n9812222222,Cafe B,Tokha,Cafe,4.5,No website\n"
        );
    }

    #[test]
    fn load_contacts_requires_a_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phone_numbers.txt");

        let err = load_contacts(&path).unwrap_err();
        assert!(matches!(err, OutreachError::MissingInputFile { .. }));

        std::fs::write(&path, "\n\n").unwrap();
        let err = load_contacts(&path).unwrap_err();
        assert!(matches!(err, OutreachError::MissingInputFile { .. }));

        std::fs::write(&path, "9811111111,Cafe A\n").unwrap();
        assert_eq!(load_contacts(&path).unwrap().len(), 1);
    }
}
