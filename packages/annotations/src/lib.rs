#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Ephemeral user annotation state.
//!
//! Notes, checkpoints, and hand-drawn risk areas live in a [`ScratchStore`]
//! that is serialized to a single JSON scratch file, the prototype's
//! stand-in for browser local storage. The store makes no durability
//! promises beyond "survives a reload": a missing or unreadable file just
//! starts the session empty.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slope_map_geo_models::{Coordinate, PolygonError, RiskArea};
use slope_map_telemetry_models::{RiskLevel, SensorNode};

/// Environment variable overriding the scratch file location.
pub const SCRATCH_PATH_ENV: &str = "SLOPE_MAP_SCRATCH";

/// Default scratch file path, relative to the working directory.
pub const DEFAULT_SCRATCH_PATH: &str = "data/scratch.json";

/// Errors from annotation operations.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// Scratch file I/O error.
    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),

    /// Scratch file (de)serialization error.
    #[error("Scratch serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Drawn polygon failed validation.
    #[error("Invalid drawn polygon: {0}")]
    Polygon(#[from] PolygonError),
}

/// A free-text note pinned to a map coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique note id.
    pub id: String,
    /// Pin longitude.
    pub longitude: f64,
    /// Pin latitude.
    pub latitude: f64,
    /// Free-text body.
    pub body: String,
    /// When the note was created.
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note pinned at the given coordinate, stamped now.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            longitude,
            latitude,
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

/// An in-progress hand-drawn polygon.
///
/// Vertices are pushed one at a time as the user clicks; [`finalize`]
/// converts the draft into a [`RiskArea`], rejecting drafts with fewer than
/// three vertices.
///
/// [`finalize`]: PolygonDraft::finalize
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonDraft {
    /// Vertices in click order.
    pub vertices: Vec<Coordinate>,
}

impl PolygonDraft {
    /// Appends a vertex at the clicked position.
    pub fn push_vertex(&mut self, longitude: f64, latitude: f64) {
        self.vertices.push(Coordinate::new(longitude, latitude));
    }

    /// Removes the most recent vertex (undo).
    pub fn pop_vertex(&mut self) -> Option<Coordinate> {
        self.vertices.pop()
    }

    /// Finalizes the draft into a drawn [`RiskArea`] with a fresh uuid id.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError::Polygon`] if the draft has fewer than
    /// three vertices.
    pub fn finalize(
        self,
        name: impl Into<String>,
        risk: RiskLevel,
    ) -> Result<RiskArea, AnnotationError> {
        let id = format!("draw-{}", uuid::Uuid::new_v4());
        Ok(RiskArea::new(id, name, risk, self.vertices)?)
    }
}

/// The whole annotation state, serialized as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScratchState {
    /// User notes.
    pub notes: Vec<Note>,
    /// User-placed checkpoint nodes (same shape as seed sensors).
    pub checkpoints: Vec<SensorNode>,
    /// User-drawn risk areas.
    pub drawn_areas: Vec<RiskArea>,
}

/// Scratch store backed by a JSON file.
///
/// All mutation methods operate in memory; callers decide when to
/// [`save`](ScratchStore::save) (the server saves after every mutation).
pub struct ScratchStore {
    path: PathBuf,
    state: ScratchState,
}

impl ScratchStore {
    /// Resolves the scratch file path from `SLOPE_MAP_SCRATCH`, falling
    /// back to [`DEFAULT_SCRATCH_PATH`].
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var(SCRATCH_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_SCRATCH_PATH), PathBuf::from)
    }

    /// Loads the store from `path`, starting empty if the file is missing.
    ///
    /// A file that exists but fails to parse is treated as corrupt scratch
    /// state: it is logged and discarded rather than failing startup.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    log::warn!("Discarding unparseable scratch file {}: {e}", path.display());
                    ScratchState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ScratchState::default(),
            Err(e) => {
                log::warn!("Failed to read scratch file {}: {e}", path.display());
                ScratchState::default()
            }
        };
        Self { path, state }
    }

    /// Writes the current state back to the scratch file.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError`] if the parent directory cannot be
    /// created or the file cannot be written.
    pub fn save(&self) -> Result<(), AnnotationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current annotation state.
    #[must_use]
    pub const fn state(&self) -> &ScratchState {
        &self.state
    }

    /// Adds a note and returns it.
    pub fn add_note(&mut self, longitude: f64, latitude: f64, body: impl Into<String>) -> &Note {
        self.state.notes.push(Note::new(longitude, latitude, body));
        self.state.notes.last().expect("note just pushed")
    }

    /// Removes a note by id. Returns `true` if a note was removed.
    pub fn remove_note(&mut self, id: &str) -> bool {
        let before = self.state.notes.len();
        self.state.notes.retain(|n| n.id != id);
        self.state.notes.len() != before
    }

    /// Adds a user checkpoint node.
    pub fn add_checkpoint(&mut self, node: SensorNode) {
        self.state.checkpoints.push(node);
    }

    /// Removes a checkpoint by id. Returns `true` if one was removed.
    pub fn remove_checkpoint(&mut self, id: &str) -> bool {
        let before = self.state.checkpoints.len();
        self.state.checkpoints.retain(|c| c.id != id);
        self.state.checkpoints.len() != before
    }

    /// Finalizes a drawn polygon and appends it to the drawn areas.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError::Polygon`] if the draft has fewer than
    /// three vertices.
    pub fn add_drawn_area(
        &mut self,
        draft: PolygonDraft,
        name: impl Into<String>,
        risk: RiskLevel,
    ) -> Result<&RiskArea, AnnotationError> {
        let area = draft.finalize(name, risk)?;
        self.state.drawn_areas.push(area);
        Ok(self.state.drawn_areas.last().expect("area just pushed"))
    }

    /// Removes a drawn area by id. Returns `true` if one was removed.
    pub fn remove_drawn_area(&mut self, id: &str) -> bool {
        let before = self.state.drawn_areas.len();
        self.state.drawn_areas.retain(|a| a.id != id);
        self.state.drawn_areas.len() != before
    }

    /// Empties all annotation state.
    pub fn clear(&mut self) {
        self.state = ScratchState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_scratch() -> PathBuf {
        std::env::temp_dir().join(format!("slope-map-scratch-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn load_missing_file_starts_empty() {
        let store = ScratchStore::load(temp_scratch());
        assert!(store.state().notes.is_empty());
        assert!(store.state().checkpoints.is_empty());
        assert!(store.state().drawn_areas.is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let path = temp_scratch();
        let mut store = ScratchStore::load(&path);
        store.add_note(137.55, 36.29, "Fresh cracking above the bench");
        let mut draft = PolygonDraft::default();
        draft.push_vertex(0.0, 0.0);
        draft.push_vertex(1.0, 0.0);
        draft.push_vertex(0.5, 1.0);
        store
            .add_drawn_area(draft, "Field sketch", RiskLevel::Warning)
            .unwrap();
        store.save().unwrap();

        let reloaded = ScratchStore::load(&path);
        assert_eq!(reloaded.state().notes.len(), 1);
        assert_eq!(reloaded.state().notes[0].body, "Fresh cracking above the bench");
        assert_eq!(reloaded.state().drawn_areas.len(), 1);
        assert_eq!(reloaded.state().drawn_areas[0].risk, RiskLevel::Warning);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let path = temp_scratch();
        std::fs::write(&path, "not json").unwrap();
        let store = ScratchStore::load(&path);
        assert!(store.state().notes.is_empty());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn draft_finalize_enforces_vertex_minimum() {
        let mut draft = PolygonDraft::default();
        draft.push_vertex(0.0, 0.0);
        draft.push_vertex(1.0, 0.0);
        let err = draft
            .clone()
            .finalize("Too small", RiskLevel::Watch)
            .unwrap_err();
        assert!(matches!(err, AnnotationError::Polygon(_)));

        draft.push_vertex(0.5, 1.0);
        let area = draft.finalize("Big enough", RiskLevel::Watch).unwrap();
        assert!(area.id.starts_with("draw-"));
        assert_eq!(area.vertices.len(), 3);
    }

    #[test]
    fn pop_vertex_undoes_last_click() {
        let mut draft = PolygonDraft::default();
        draft.push_vertex(0.0, 0.0);
        draft.push_vertex(1.0, 1.0);
        let popped = draft.pop_vertex().unwrap();
        assert!((popped.longitude - 1.0).abs() < f64::EPSILON);
        assert_eq!(draft.vertices.len(), 1);
    }

    #[test]
    fn remove_by_id() {
        let mut store = ScratchStore::load(temp_scratch());
        let id = store.add_note(0.0, 0.0, "a").id.clone();
        assert!(store.remove_note(&id));
        assert!(!store.remove_note(&id));
        assert!(!store.remove_checkpoint("missing"));
        assert!(!store.remove_drawn_area("missing"));
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = ScratchStore::load(temp_scratch());
        store.add_note(0.0, 0.0, "a");
        store.clear();
        assert!(store.state().notes.is_empty());
    }
}
