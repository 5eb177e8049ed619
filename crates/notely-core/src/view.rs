use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::Note;

/// Client-side ordering, applied after server-side filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Creation time, newest first
    #[default]
    Newest,
    /// Creation time, oldest first
    Oldest,
    /// Content A to Z
    ContentAsc,
    /// Content Z to A
    ContentDesc,
}

pub fn sort_notes(notes: &mut [Note], order: SortOrder) {
    match order {
        SortOrder::Newest => notes.sort_by(|a, b| by_creation(b, a)),
        SortOrder::Oldest => notes.sort_by(by_creation),
        SortOrder::ContentAsc => notes.sort_by(|a, b| collate(&a.content, &b.content)),
        SortOrder::ContentDesc => notes.sort_by(|a, b| collate(&b.content, &a.content)),
    }
}

fn by_creation(a: &Note, b: &Note) -> Ordering {
    a.created_at_ms
        .cmp(&b.created_at_ms)
        .then_with(|| a.id.cmp(&b.id))
}

/// Root-locale style comparison in three levels: base letters, then
/// accents, then case and raw text.
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(fold_stroke)
}

fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Letters with a stroke have no canonical decomposition.
fn fold_stroke(c: char) -> char {
    match c {
        'đ' => 'd',
        'ł' => 'l',
        'ø' => 'o',
        'ħ' => 'h',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoteId, OwnerId};

    fn note(id: i64, content: &str, created_at_ms: i64) -> Note {
        Note {
            id: NoteId(id),
            author_id: OwnerId::try_new("alice").unwrap(),
            content: content.to_string(),
            completed: false,
            group: None,
            created_at_ms,
        }
    }

    fn contents(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.content.as_str()).collect()
    }

    #[test]
    fn creation_orders_break_ties_by_id() {
        let mut notes = vec![note(1, "a", 10), note(3, "c", 20), note(2, "b", 10)];
        sort_notes(&mut notes, SortOrder::Oldest);
        assert_eq!(contents(&notes), ["a", "b", "c"]);
        sort_notes(&mut notes, SortOrder::Newest);
        assert_eq!(contents(&notes), ["c", "b", "a"]);
    }

    #[test]
    fn content_order_ignores_case() {
        let mut notes = vec![note(1, "banana", 1), note(2, "Apple", 2), note(3, "cherry", 3)];
        sort_notes(&mut notes, SortOrder::ContentAsc);
        assert_eq!(contents(&notes), ["Apple", "banana", "cherry"]);
        sort_notes(&mut notes, SortOrder::ContentDesc);
        assert_eq!(contents(&notes), ["cherry", "banana", "Apple"]);
    }

    #[test]
    fn accented_letters_sort_with_their_base_letter() {
        let mut words = vec!["zebra", "ăn sáng", "Đi chợ", "apple", "éclair"];
        words.sort_by(|a, b| collate(a, b));
        assert_eq!(words, ["ăn sáng", "apple", "Đi chợ", "éclair", "zebra"]);
    }

    #[test]
    fn accents_break_ties_before_case() {
        assert_eq!(collate("ca", "cá"), Ordering::Less);
        assert_eq!(collate("Cá", "ca"), Ordering::Greater);
        assert_eq!(collate("Ca", "ca"), Ordering::Less);
    }

    #[test]
    fn collate_is_total_for_case_variants() {
        assert_eq!(collate("abc", "ABC"), "abc".cmp("ABC"));
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }
}
