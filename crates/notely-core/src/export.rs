use thiserror::Error;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::Note;

/// Leading byte-order mark so spreadsheet applications detect UTF-8.
pub const BOM: char = '\u{feff}';
pub const CSV_HEADER: &str = "No,Content,Status,Group,Created At";

const STATUS_COMPLETED: &str = "Completed";
const STATUS_PENDING: &str = "Not completed";
const NO_GROUP_LABEL: &str = "No group";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No notes to export")]
    Empty,
}

/// Serialize the displayed notes, in the given order, as CSV text.
pub fn notes_to_csv(notes: &[Note], offset: UtcOffset) -> Result<String, ExportError> {
    if notes.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut out = String::with_capacity(64 * (notes.len() + 1));
    out.push(BOM);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for (index, note) in notes.iter().enumerate() {
        let status = if note.completed {
            STATUS_COMPLETED
        } else {
            STATUS_PENDING
        };
        let group = note.group.as_deref().unwrap_or(NO_GROUP_LABEL);
        out.push_str(&(index + 1).to_string());
        out.push(',');
        out.push_str(&quote(&note.content));
        out.push(',');
        out.push_str(status);
        out.push(',');
        out.push_str(&quote(group));
        out.push(',');
        out.push_str(&format_created(note.created_at_ms, offset));
        out.push('\n');
    }

    Ok(out)
}

/// Quote a field, doubling embedded quotes and collapsing line breaks to one space.
fn quote(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    let mut in_break = false;
    for ch in field.chars() {
        match ch {
            '\r' | '\n' => {
                if !in_break {
                    out.push(' ');
                }
                in_break = true;
                continue;
            }
            '"' => out.push_str("\"\""),
            _ => out.push(ch),
        }
        in_break = false;
    }
    out.push('"');
    out
}

pub fn format_created(created_at_ms: i64, offset: UtcOffset) -> String {
    let format = format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
    let nanos = (created_at_ms as i128) * 1_000_000i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(offset)
        .format(&format)
        .unwrap_or_else(|_| "01/01/1970 00:00:00".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoteId, OwnerId};

    fn note(id: i64, content: &str, completed: bool, group: Option<&str>) -> Note {
        Note {
            id: NoteId(id),
            author_id: OwnerId::try_new("alice").unwrap(),
            content: content.to_string(),
            completed,
            group: group.map(str::to_string),
            // 2024-03-05 14:07:09 UTC
            created_at_ms: 1_709_647_629_000,
        }
    }

    #[test]
    fn empty_export_is_rejected() {
        assert_eq!(notes_to_csv(&[], UtcOffset::UTC), Err(ExportError::Empty));
    }

    #[test]
    fn export_has_bom_header_and_one_row_per_note() {
        let notes = vec![
            note(1, "buy milk", false, Some("home")),
            note(2, "ship it", true, None),
        ];
        let csv = notes_to_csv(&notes, UtcOffset::UTC).unwrap();
        assert!(csv.starts_with(BOM));

        let lines: Vec<&str> = csv.trim_start_matches(BOM).lines().collect();
        assert_eq!(lines.len(), notes.len() + 1);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "1,\"buy milk\",Not completed,\"home\",05/03/2024 14:07:09"
        );
        assert_eq!(
            lines[2],
            "2,\"ship it\",Completed,\"No group\",05/03/2024 14:07:09"
        );
    }

    #[test]
    fn commas_quotes_and_newlines_are_neutralized() {
        let notes = vec![note(1, "one, two\r\nthree \"four\"", false, None)];
        let csv = notes_to_csv(&notes, UtcOffset::UTC).unwrap();
        let lines: Vec<&str> = csv.trim_start_matches(BOM).lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1,\"one, two three \"\"four\"\"\",Not completed,"));
    }

    #[test]
    fn creation_time_uses_requested_offset() {
        let offset = UtcOffset::from_hms(7, 0, 0).unwrap();
        assert_eq!(format_created(1_709_647_629_000, offset), "05/03/2024 21:07:09");
    }
}
