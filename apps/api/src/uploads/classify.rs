//! Upload validation and filename-based document classification.

use serde::Serialize;

pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Contract,
    Financial,
    Legal,
    Market,
    Other,
}

// Checked in order; the first matching group wins.
const KEYWORDS: &[(DocumentType, &[&str])] = &[
    (DocumentType::Contract, &["contract", "договор", "соглашение"]),
    (
        DocumentType::Financial,
        &["financial", "финанс", "balance", "отчет", "ebitda", "p&l"],
    ),
    (DocumentType::Legal, &["legal", "юридич", "law", "правов"]),
    (
        DocumentType::Market,
        &["market", "рынок", "research", "исследование"],
    ),
];

pub fn document_type(file_name: &str) -> DocumentType {
    let lower = file_name.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(kind, _)| *kind)
        .unwrap_or(DocumentType::Other)
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitise_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}
