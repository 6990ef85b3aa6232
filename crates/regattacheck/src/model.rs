//! Core domain types for regattacheck.
//!
//! This module defines the records held by the four logical stores: roster
//! entries, check events, dolly entries, and the metadata singleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::normalize_sail;

/// The action recorded when a competitor passes the dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Returned from the water.
    CheckIn,
    /// Left for the water.
    CheckOut,
}

impl EventAction {
    /// Parse the stored wire form (`check_in` / `check_out`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "check_in" => Some(Self::CheckIn),
            "check_out" => Some(Self::CheckOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckIn => write!(f, "check_in"),
            Self::CheckOut => write!(f, "check_out"),
        }
    }
}

/// How a check event entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    /// Typed in by an operator.
    Manual,
    /// Read off a single camera frame.
    Camera,
    /// Produced by the continuous scanning loop.
    LiveScan,
}

impl EventOrigin {
    /// Parse the stored wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "camera" => Some(Self::Camera),
            "live_scan" => Some(Self::LiveScan),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Camera => write!(f, "camera"),
            Self::LiveScan => write!(f, "live_scan"),
        }
    }
}

/// Condition of a boat dolly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DollyStatus {
    /// Present and usable.
    Ok,
    /// Not where it should be.
    Missing,
    /// Present but unusable.
    Broken,
}

impl DollyStatus {
    /// Parse the stored wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ok" => Some(Self::Ok),
            "missing" => Some(Self::Missing),
            "broken" => Some(Self::Broken),
            _ => None,
        }
    }
}

impl std::fmt::Display for DollyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Missing => write!(f, "missing"),
            Self::Broken => write!(f, "broken"),
        }
    }
}

/// One ingestion row as handed over by the parsing collaborator.
///
/// The collaborator is expected to supply only rows with a non-empty sail
/// and crew and a parsed bow number; the core performs no validation beyond
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUpload {
    /// Boat class the row belongs to.
    #[serde(rename = "class")]
    pub class_name: String,
    /// Country code as it appeared in the upload (may be empty).
    #[serde(default)]
    pub country: String,
    /// Raw sail number text.
    pub sail: String,
    /// Bow number.
    pub bow: i64,
    /// Crew name.
    pub crew: String,
    /// Club name.
    #[serde(default)]
    pub club: String,
}

/// A registered competitor.
///
/// The identity key is `class_name` + normalized sail number; one entry per
/// key. The whole set is replaced wholesale on each ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Identity key: `{class_name}::{sail_norm}`.
    pub id: String,
    /// Boat class.
    pub class_name: String,
    /// Optional 2-letter country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Sail number as uploaded.
    pub sail: String,
    /// Bow number.
    pub bow: i64,
    /// Crew name.
    pub crew: String,
    /// Club name.
    pub club: String,
    /// Normalized sail number (derived, the matching key).
    pub sail_norm: String,
}

impl RosterEntry {
    /// Build the identity key for a (class, normalized sail) pair.
    #[must_use]
    pub fn identity_key(class_name: &str, sail_norm: &str) -> String {
        format!("{class_name}::{sail_norm}")
    }

    /// Derive a roster entry from an upload row, normalizing the sail number.
    #[must_use]
    pub fn from_upload(row: &RosterUpload) -> Self {
        let sail_norm = normalize_sail(&row.sail);
        let country = row.country.trim();
        Self {
            id: Self::identity_key(&row.class_name, &sail_norm),
            class_name: row.class_name.clone(),
            country: if country.is_empty() {
                None
            } else {
                Some(country.to_string())
            },
            sail: row.sail.clone(),
            bow: row.bow,
            crew: row.crew.clone(),
            club: row.club.clone(),
            sail_norm,
        }
    }
}

/// An immutable check-in/check-out record.
///
/// Carries a denormalized snapshot of the matched roster entry at action
/// time, so the log stays meaningful after the roster is replaced. Repeated
/// actions by the same competitor each produce a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Collision-resistant id: `ev_{millis}_{random hex}`.
    pub id: String,
    /// When the action was recorded.
    pub ts: DateTime<Utc>,
    /// Check-in or check-out.
    pub action: EventAction,
    /// Snapshot: boat class.
    pub class_name: String,
    /// Snapshot: country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Snapshot: sail number as uploaded.
    pub sail: String,
    /// Snapshot: normalized sail number.
    pub sail_norm: String,
    /// Snapshot: bow number.
    pub bow: i64,
    /// Snapshot: crew name.
    pub crew: String,
    /// Snapshot: club name.
    pub club: String,
    /// How the event entered the system.
    pub origin: EventOrigin,
}

impl EventRecord {
    /// Build a record snapshotting `entry`, stamped with the current time
    /// and a fresh id. Uniqueness relies solely on the id; the store never
    /// deduplicates.
    #[must_use]
    pub fn capture(action: EventAction, entry: &RosterEntry, origin: EventOrigin) -> Self {
        let ts = Utc::now();
        let id = format!("ev_{}_{:08x}", ts.timestamp_millis(), rand::random::<u32>());
        Self {
            id,
            ts,
            action,
            class_name: entry.class_name.clone(),
            country: entry.country.clone(),
            sail: entry.sail.clone(),
            sail_norm: entry.sail_norm.clone(),
            bow: entry.bow,
            crew: entry.crew.clone(),
            club: entry.club.clone(),
            origin,
        }
    }
}

/// Dolly status for one (class, bow) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DollyEntry {
    /// Identity key: `{class_name}::{bow}`.
    pub id: String,
    /// Boat class.
    pub class_name: String,
    /// Bow number.
    pub bow: i64,
    /// Dolly number; defaults to the bow number.
    pub dolly: i64,
    /// Current condition.
    pub status: DollyStatus,
    /// Optional operator note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When the entry was last written.
    pub updated_at: DateTime<Utc>,
}

impl DollyEntry {
    /// Build the identity key for a (class, bow) pair.
    #[must_use]
    pub fn identity_key(class_name: &str, bow: i64) -> String {
        format!("{class_name}::{bow}")
    }
}

/// Singleton readiness record, overwritten atomically with each ingestion.
///
/// Its presence is the sole readiness signal for the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// When the roster was loaded.
    pub loaded_at: DateTime<Utc>,
    /// Sorted distinct class names from the most recent ingestion.
    pub classes: Vec<String>,
    /// Number of rows in the most recent ingestion.
    pub row_count: usize,
}

/// Derived per-class completion counts for one action type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassProgress {
    /// Boat class.
    pub class_name: String,
    /// Roster entries in this class.
    pub total: i64,
    /// Distinct normalized sails in this class with at least one event of
    /// the requested action type.
    pub done: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_upload() -> RosterUpload {
        RosterUpload {
            class_name: "ILCA 6".to_string(),
            country: "USA".to_string(),
            sail: "USA 214567".to_string(),
            bow: 12,
            crew: "A. Sailor".to_string(),
            club: "Club X".to_string(),
        }
    }

    #[test]
    fn test_action_display_round_trip() {
        for action in [EventAction::CheckIn, EventAction::CheckOut] {
            assert_eq!(EventAction::parse(&action.to_string()), Some(action));
        }
        assert_eq!(EventAction::parse("bogus"), None);
    }

    #[test]
    fn test_origin_display_round_trip() {
        for origin in [EventOrigin::Manual, EventOrigin::Camera, EventOrigin::LiveScan] {
            assert_eq!(EventOrigin::parse(&origin.to_string()), Some(origin));
        }
        assert_eq!(EventOrigin::parse(""), None);
    }

    #[test]
    fn test_dolly_status_display_round_trip() {
        for status in [DollyStatus::Ok, DollyStatus::Missing, DollyStatus::Broken] {
            assert_eq!(DollyStatus::parse(&status.to_string()), Some(status));
        }
        assert_eq!(DollyStatus::parse("fine"), None);
    }

    #[test]
    fn test_roster_entry_from_upload() {
        let entry = RosterEntry::from_upload(&sample_upload());
        assert_eq!(entry.id, "ILCA 6::214567");
        assert_eq!(entry.sail_norm, "214567");
        assert_eq!(entry.sail, "USA 214567");
        assert_eq!(entry.country.as_deref(), Some("USA"));
        assert_eq!(entry.bow, 12);
    }

    #[test]
    fn test_roster_entry_blank_country_is_none() {
        let mut row = sample_upload();
        row.country = "  ".to_string();
        let entry = RosterEntry::from_upload(&row);
        assert_eq!(entry.country, None);
    }

    #[test]
    fn test_event_capture_snapshots_entry() {
        let entry = RosterEntry::from_upload(&sample_upload());
        let ev = EventRecord::capture(EventAction::CheckOut, &entry, EventOrigin::Manual);

        assert!(ev.id.starts_with("ev_"));
        assert_eq!(ev.action, EventAction::CheckOut);
        assert_eq!(ev.class_name, entry.class_name);
        assert_eq!(ev.sail_norm, entry.sail_norm);
        assert_eq!(ev.crew, entry.crew);
        assert_eq!(ev.origin, EventOrigin::Manual);
    }

    #[test]
    fn test_event_capture_fresh_ids() {
        let entry = RosterEntry::from_upload(&sample_upload());
        let a = EventRecord::capture(EventAction::CheckIn, &entry, EventOrigin::Camera);
        let b = EventRecord::capture(EventAction::CheckIn, &entry, EventOrigin::Camera);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_upload_deserialize() {
        let json = r#"{"class":"ILCA 6","country":"USA","sail":"USA 214567","bow":12,"crew":"A. Sailor","club":"Club X"}"#;
        let row: RosterUpload = serde_json::from_str(json).unwrap();
        assert_eq!(row, sample_upload());
    }

    #[test]
    fn test_upload_optional_fields_default() {
        let json = r#"{"class":"ILCA 6","sail":"214567","bow":3,"crew":"B. Sailor"}"#;
        let row: RosterUpload = serde_json::from_str(json).unwrap();
        assert_eq!(row.country, "");
        assert_eq!(row.club, "");
    }

    #[test]
    fn test_dolly_identity_key() {
        assert_eq!(DollyEntry::identity_key("ILCA 6", 12), "ILCA 6::12");
    }

    #[test]
    fn test_meta_record_serde_round_trip() {
        let meta = MetaRecord {
            loaded_at: Utc::now(),
            classes: vec!["29er".to_string(), "ILCA 6".to_string()],
            row_count: 42,
        };
        let json = serde_json::to_string(&meta).unwrap();
        let back: MetaRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }
}
