//! Free-form notes with tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::BoardError;
use crate::task::ids::opaque_id;

opaque_id!(
    /// Stable identifier of a note.
    NoteId
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: NoteId,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Notes, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notes {
    notes: Vec<Note>,
}

fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn resolve(&self, prefix: &str) -> Result<NoteId, BoardError> {
        let mut hits = self.notes.iter().filter(|n| n.id.matches_prefix(prefix));
        match (hits.next(), hits.next()) {
            (Some(note), None) => Ok(note.id),
            (Some(_), Some(_)) => Err(BoardError::Ambiguous(prefix.to_string())),
            (None, _) => Err(BoardError::NoMatch(prefix.to_string())),
        }
    }

    /// Every tag in use, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        self.notes
            .iter()
            .flat_map(|n| n.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn filter_by_tag<'a>(&'a self, tag: &str) -> impl Iterator<Item = &'a Note> + 'a {
        let wanted = normalize_tag(tag);
        self.notes
            .iter()
            .filter(move |n| wanted.as_ref().is_some_and(|t| n.tags.contains(t)))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add(&mut self, content: &str, tags: &[String], now: DateTime<Utc>) -> NoteId {
        let mut note = Note {
            id: NoteId::new(),
            content: content.trim().to_string(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        for tag in tags.iter().filter_map(|t| normalize_tag(t)) {
            if !note.tags.contains(&tag) {
                note.tags.push(tag);
            }
        }
        let id = note.id;
        self.notes.insert(0, note);
        id
    }

    pub fn edit(&mut self, id: NoteId, content: &str, now: DateTime<Utc>) -> Option<()> {
        let note = self.get_mut(id)?;
        note.content = content.trim().to_string();
        note.updated_at = now;
        Some(())
    }

    pub fn delete(&mut self, id: NoteId) -> Option<Note> {
        let pos = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(pos))
    }

    /// Returns whether the tag was new on this note.
    pub fn add_tag(&mut self, id: NoteId, tag: &str, now: DateTime<Utc>) -> Option<bool> {
        let note = self.get_mut(id)?;
        let Some(tag) = normalize_tag(tag) else {
            return Some(false);
        };
        if note.tags.contains(&tag) {
            return Some(false);
        }
        note.tags.push(tag);
        note.updated_at = now;
        Some(true)
    }

    pub fn remove_tag(&mut self, id: NoteId, tag: &str, now: DateTime<Utc>) -> Option<bool> {
        let note = self.get_mut(id)?;
        let Some(pos) = normalize_tag(tag).and_then(|t| note.tags.iter().position(|x| *x == t)) else {
            return Some(false);
        };
        note.tags.remove(pos);
        note.updated_at = now;
        Some(true)
    }

    fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, min, 0).unwrap()
    }

    #[test]
    fn newest_first_with_normalized_tags() {
        let mut notes = Notes::new();
        let first = notes.add("first", &[], at(0));
        let second = notes.add("  second ", &[" Work ".into(), "work".into(), "".into()], at(1));

        let ids: Vec<_> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(notes.get(second).unwrap().content, "second");
        assert_eq!(notes.get(second).unwrap().tags, vec!["work"]);
    }

    #[test]
    fn tag_editing_and_filtering() {
        let mut notes = Notes::new();
        let a = notes.add("a", &["zeta".into()], at(0));
        let b = notes.add("b", &[], at(0));

        assert_eq!(notes.add_tag(b, "Alpha", at(5)), Some(true));
        assert_eq!(notes.add_tag(b, "alpha", at(6)), Some(false));
        assert_eq!(notes.get(b).unwrap().updated_at, at(5));
        assert_eq!(notes.all_tags(), vec!["alpha", "zeta"]);
        assert_eq!(notes.filter_by_tag("ZETA").map(|n| n.id).collect::<Vec<_>>(), vec![a]);

        assert_eq!(notes.remove_tag(a, "zeta", at(7)), Some(true));
        assert_eq!(notes.remove_tag(a, "zeta", at(8)), Some(false));
        assert_eq!(notes.all_tags(), vec!["alpha"]);
        assert_eq!(notes.add_tag(NoteId::new(), "x", at(9)), None);
    }

    #[test]
    fn edit_and_delete() {
        let mut notes = Notes::new();
        let id = notes.add("draft", &[], at(0));
        notes.edit(id, "final", at(3)).unwrap();
        let note = notes.get(id).unwrap();
        assert_eq!(note.content, "final");
        assert_eq!(note.created_at, at(0));
        assert_eq!(note.updated_at, at(3));

        assert!(notes.delete(id).is_some());
        assert!(notes.is_empty());
        assert!(notes.delete(id).is_none());
    }
}
