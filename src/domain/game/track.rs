//! Track value objects and the cross-session unavailable-track set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Identity of a song as proposed by the oracle.
///
/// Equality and hashing are case-insensitive so "Kenny Loggins" and
/// "kenny loggins" count as the same track in history and exclusion lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackKey {
    pub artist: String,
    pub title: String,
}

impl TrackKey {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    fn normalized(&self) -> (String, String) {
        (
            self.artist.trim().to_lowercase(),
            self.title.trim().to_lowercase(),
        )
    }
}

impl PartialEq for TrackKey {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for TrackKey {}

impl std::hash::Hash for TrackKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// A track the catalog confirmed as playable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableTrack {
    pub key: TrackKey,
    /// URL of the playable audio preview.
    pub preview_url: String,
}

/// Process-wide, append-only set of tracks the catalog reported unplayable.
///
/// Shared by every session's selector; entries are never removed. Cloning is
/// cheap and clones share the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct UnavailableTracks {
    inner: Arc<RwLock<HashSet<TrackKey>>>,
}

impl UnavailableTracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a track as unplayable. Returns false if it was already known.
    pub fn record(&self, key: TrackKey) -> bool {
        self.inner.write().expect("unavailable set poisoned").insert(key)
    }

    pub fn contains(&self, key: &TrackKey) -> bool {
        self.inner.read().expect("unavailable set poisoned").contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("unavailable set poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the set as a prompt-friendly comma-separated list.
    pub fn as_prompt_list(&self) -> String {
        let set = self.inner.read().expect("unavailable set poisoned");
        let mut entries: Vec<String> = set.iter().map(|k| k.to_string()).collect();
        entries.sort();
        entries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_key_equality_is_case_insensitive() {
        let a = TrackKey::new("Kenny Loggins", "Footloose");
        let b = TrackKey::new("kenny loggins", "FOOTLOOSE");
        assert_eq!(a, b);
    }

    #[test]
    fn track_key_trims_whitespace() {
        let a = TrackKey::new(" Queen", "Radio Ga Ga ");
        let b = TrackKey::new("Queen", "Radio Ga Ga");
        assert_eq!(a, b);
    }

    #[test]
    fn unavailable_set_is_shared_between_clones() {
        let set = UnavailableTracks::new();
        let clone = set.clone();
        assert!(set.record(TrackKey::new("A-ha", "Take On Me")));
        assert!(clone.contains(&TrackKey::new("a-ha", "take on me")));
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn recording_twice_reports_duplicate() {
        let set = UnavailableTracks::new();
        assert!(set.record(TrackKey::new("Toto", "Africa")));
        assert!(!set.record(TrackKey::new("TOTO", "Africa")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn prompt_list_is_sorted_and_joined() {
        let set = UnavailableTracks::new();
        set.record(TrackKey::new("Toto", "Africa"));
        set.record(TrackKey::new("A-ha", "Take On Me"));
        assert_eq!(set.as_prompt_list(), "A-ha - Take On Me, Toto - Africa");
    }
}
