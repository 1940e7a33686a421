//! Note storage - two JSON documents in one directory
//!
//! `settings.json` holds user settings, `notes.json` maps note id to note.
//! The whole collection is held in memory and rewritten after every change.
//! Queries take an optional scope: a repository identifier restricting the
//! result to notes taken in that repository.

mod migrate;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::model::{RepositoryDescriptor, WorkNote};
use crate::settings::{Settings, SettingsPatch};

pub use migrate::{migrate, parse_or_default, Migration, ParsedNotes, StoredNote};

pub const SETTINGS_FILE: &str = "settings.json";
pub const NOTES_FILE: &str = "notes.json";
/// Copy of a notes file that could not be fully loaded
pub const NOTES_BACKUP_FILE: &str = "notes.json.corrupt";

pub struct NoteStore {
    dir: PathBuf,
    settings: Settings,
    notes: BTreeMap<String, WorkNote>,
    migrated: usize,
}

impl NoteStore {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::StoragePath {
            path: dir.to_path_buf(),
            source,
        })?;

        let settings = load_settings(&dir.join(SETTINGS_FILE))?;

        let notes_path = dir.join(NOTES_FILE);
        let parsed = match fs::read_to_string(&notes_path) {
            Ok(content) => {
                let parsed = parse_or_default(&content);
                if parsed.lost_data() {
                    let backup = dir.join(NOTES_BACKUP_FILE);
                    fs::write(&backup, &content)?;
                    warn!(path = %backup.display(), "kept a copy of the unreadable notes file");
                }
                parsed
            }
            Err(e) if e.kind() == ErrorKind::NotFound => ParsedNotes::default(),
            Err(e) => {
                warn!(error = %e, path = %notes_path.display(), "notes file unreadable, starting empty");
                ParsedNotes::default()
            }
        };
        let lost_data = parsed.lost_data();
        let Migration { notes, migrated } = migrate(parsed.notes);

        let store = Self {
            dir: dir.to_path_buf(),
            settings,
            notes,
            migrated,
        };

        if migrated > 0 {
            info!(count = migrated, "migrated notes to repository-scoped storage");
            store.persist_notes()?;
        } else if lost_data || !notes_path.exists() {
            store.persist_notes()?;
        }

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Notes migrated while opening
    pub fn migrated(&self) -> usize {
        self.migrated
    }

    // ============================================
    // SETTINGS
    // ============================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<&Settings, StoreError> {
        self.settings.apply(patch);
        write_json(&self.dir.join(SETTINGS_FILE), &self.settings)?;
        Ok(&self.settings)
    }

    // ============================================
    // NOTES
    // ============================================

    /// Insert or overwrite by id, then persist
    pub fn save_note(&mut self, note: WorkNote) -> Result<(), StoreError> {
        debug!(id = %note.id, repository = %note.repository.identifier, "saving note");
        self.notes.insert(note.id.clone(), note);
        self.persist_notes()
    }

    pub fn get_note(&self, id: &str) -> Option<&WorkNote> {
        self.notes.get(id)
    }

    /// Lookup by full id, falling back to a unique id prefix
    pub fn find_note(&self, query: &str) -> Option<&WorkNote> {
        if let Some(note) = self.notes.get(query) {
            return Some(note);
        }
        let mut matches = self.notes.values().filter(|n| n.id.starts_with(query));
        match (matches.next(), matches.next()) {
            (Some(note), None) => Some(note),
            _ => None,
        }
    }

    pub fn delete_note(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.notes.remove(id).is_none() {
            return Ok(false);
        }
        self.persist_notes()?;
        Ok(true)
    }

    pub fn latest_note(&self, scope: Option<&str>) -> Option<&WorkNote> {
        self.recent_notes(1, scope).into_iter().next()
    }

    /// Newest first
    pub fn recent_notes(&self, count: usize, scope: Option<&str>) -> Vec<&WorkNote> {
        let mut notes = newest_first(self.notes.values().filter(|n| in_scope(n, scope)));
        notes.truncate(count);
        notes
    }

    pub fn notes_for_repository(&self, identifier: &str) -> Vec<&WorkNote> {
        newest_first(
            self.notes
                .values()
                .filter(|n| n.repository.identifier == identifier),
        )
    }

    /// Every note taken on `branch`, in any repository
    pub fn notes_on_branch(&self, branch: &str) -> Vec<&WorkNote> {
        newest_first(self.notes.values().filter(|n| n.git_info.branch == branch))
    }

    pub fn all_notes(&self, scope: Option<&str>) -> Vec<&WorkNote> {
        newest_first(self.notes.values().filter(|n| in_scope(n, scope)))
    }

    /// Distinct repositories with their note counts
    pub fn repositories(&self) -> Vec<(RepositoryDescriptor, usize)> {
        let mut counts: BTreeMap<&RepositoryDescriptor, usize> = BTreeMap::new();
        for note in self.notes.values() {
            *counts.entry(&note.repository).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(repo, count)| (repo.clone(), count))
            .collect()
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut storage_bytes = 0;
        for file in [SETTINGS_FILE, NOTES_FILE] {
            match fs::metadata(self.dir.join(file)) {
                Ok(meta) => storage_bytes += meta.len(),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        let timestamps = self.notes.values().map(|n| n.timestamp);
        Ok(StoreStats {
            total_notes: self.notes.len(),
            repositories: self.repositories().len(),
            storage_bytes,
            oldest: timestamps.clone().min(),
            newest: timestamps.max(),
        })
    }

    fn persist_notes(&self) -> Result<(), StoreError> {
        write_json(&self.dir.join(NOTES_FILE), &self.notes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub total_notes: usize,
    pub repositories: usize,
    /// Combined size of the settings and notes files
    pub storage_bytes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

fn in_scope(note: &WorkNote, scope: Option<&str>) -> bool {
    scope.map_or(true, |identifier| note.repository.identifier == identifier)
}

// Stable sort: equal timestamps keep id order.
fn newest_first<'a>(notes: impl Iterator<Item = &'a WorkNote>) -> Vec<&'a WorkNote> {
    let mut notes: Vec<&WorkNote> = notes.collect();
    notes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    notes
}

/// Missing settings are created with defaults. An unreadable or invalid
/// document is an error and is left untouched on disk.
fn load_settings(path: &Path) -> Result<Settings, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let settings = Settings::default();
            write_json(path, &settings)?;
            return Ok(settings);
        }
        Err(e) => return Err(e.into()),
    };

    let invalid = |reason: String| StoreError::InvalidSettings {
        path: path.to_path_buf(),
        reason,
    };
    let settings: Settings = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    if settings.max_commits == 0 {
        return Err(invalid("maxCommits must be a positive integer".to_string()));
    }
    Ok(settings)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GitSnapshot, WorkingTreeStatus};
    use chrono::TimeZone;

    fn note_at(id: &str, message: &str, repo: &str, branch: &str, secs: i64) -> WorkNote {
        WorkNote {
            id: id.to_string(),
            message: message.to_string(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            git_info: GitSnapshot {
                branch: branch.to_string(),
                commits: vec![],
                status: WorkingTreeStatus::default(),
                repo_path: repo.to_string(),
            },
            repository: RepositoryDescriptor::from_path(repo),
            ai_interpretation: None,
        }
    }

    #[test]
    fn test_open_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store");
        let store = NoteStore::open(&path).unwrap();

        assert!(path.join(SETTINGS_FILE).exists());
        assert!(path.join(NOTES_FILE).exists());
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.migrated(), 0);
        assert!(store.latest_note(None).is_none());
    }

    #[test]
    fn test_uncreatable_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = NoteStore::open(&blocker.join("store")).err().unwrap();
        assert!(matches!(err, StoreError::StoragePath { .. }));
    }

    #[test]
    fn test_save_then_fetch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let note = note_at("n1", "hello", "/a", "main", 100);
        {
            let mut store = NoteStore::open(dir.path()).unwrap();
            store.save_note(note.clone()).unwrap();
            assert_eq!(store.get_note("n1"), Some(&note));
        }
        let store = NoteStore::open(dir.path()).unwrap();
        assert_eq!(store.get_note("n1"), Some(&note));
        assert_eq!(store.migrated(), 0);
    }

    #[test]
    fn test_repository_isolation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        store.save_note(note_at("a1", "in a", "/a", "main", 100)).unwrap();
        store.save_note(note_at("b1", "in b", "/b", "main", 200)).unwrap();

        assert_eq!(store.latest_note(Some("/a")).unwrap().id, "a1");
        assert_eq!(store.latest_note(Some("/b")).unwrap().id, "b1");
        assert!(store.latest_note(Some("/c")).is_none());
        assert_eq!(store.latest_note(None).unwrap().id, "b1");
    }

    #[test]
    fn test_recent_notes_ordering_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        store.save_note(note_at("n1", "first", "/a", "main", 100)).unwrap();
        store.save_note(note_at("n3", "third", "/a", "main", 300)).unwrap();
        store.save_note(note_at("n2", "second", "/a", "main", 200)).unwrap();
        store.save_note(note_at("x1", "other", "/b", "main", 400)).unwrap();

        let ids: Vec<&str> = store
            .recent_notes(2, Some("/a"))
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["n3", "n2"]);

        let ids: Vec<&str> = store.recent_notes(10, None).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["x1", "n3", "n2", "n1"]);

        assert_eq!(store.notes_for_repository("/a").len(), 3);
    }

    #[test]
    fn test_notes_on_branch_ignores_repository() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        store.save_note(note_at("n1", "x", "/a", "feature", 100)).unwrap();
        store.save_note(note_at("n2", "y", "/b", "feature", 200)).unwrap();
        store.save_note(note_at("n3", "z", "/a", "main", 300)).unwrap();

        let ids: Vec<&str> = store
            .notes_on_branch("feature")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["n2", "n1"]);
    }

    #[test]
    fn test_delete_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        store.save_note(note_at("abc-1", "x", "/a", "main", 100)).unwrap();
        store.save_note(note_at("abd-2", "y", "/a", "main", 200)).unwrap();

        assert_eq!(store.find_note("abc").unwrap().id, "abc-1");
        assert!(store.find_note("ab").is_none());

        assert!(store.delete_note("abc-1").unwrap());
        assert!(!store.delete_note("abc-1").unwrap());

        let store = NoteStore::open(dir.path()).unwrap();
        assert!(store.get_note("abc-1").is_none());
        assert!(store.get_note("abd-2").is_some());
    }

    #[test]
    fn test_legacy_data_migrates_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(NOTES_FILE),
            r#"{"old": {
                "id": "old",
                "message": "legacy",
                "timestamp": "2024-01-01T00:00:00Z",
                "gitInfo": {"branch": "main", "commits": [], "status": {"staged": [], "unstaged": [], "untracked": []}}
            }}"#,
        )
        .unwrap();

        let store = NoteStore::open(dir.path()).unwrap();
        assert_eq!(store.migrated(), 1);
        assert_eq!(store.get_note("old").unwrap().repository, RepositoryDescriptor::unknown());
        drop(store);

        let store = NoteStore::open(dir.path()).unwrap();
        assert_eq!(store.migrated(), 0);
        assert_eq!(store.latest_note(Some("unknown")).unwrap().id, "old");
    }

    #[test]
    fn test_corrupt_notes_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(NOTES_FILE), "{{{ definitely not json").unwrap();

        let store = NoteStore::open(dir.path()).unwrap();
        assert!(store.all_notes(None).is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join(NOTES_BACKUP_FILE)).unwrap(),
            "{{{ definitely not json"
        );
    }

    #[test]
    fn test_one_bad_note_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let original = r#"{
            "g1": {
                "id": "g1",
                "message": "good",
                "timestamp": "2024-01-01T00:00:00Z",
                "gitInfo": {"branch": "main", "repoPath": "/a"},
                "repository": {"path": "/a", "identifier": "/a"}
            },
            "b1": {
                "id": "b1",
                "message": "bad",
                "timestamp": "2024-01-02",
                "gitInfo": {"branch": "main"}
            }
        }"#;
        fs::write(dir.path().join(NOTES_FILE), original).unwrap();

        let mut store = NoteStore::open(dir.path()).unwrap();
        assert_eq!(store.all_notes(None).len(), 1);
        store.save_note(note_at("n2", "new", "/a", "main", 500)).unwrap();

        let store = NoteStore::open(dir.path()).unwrap();
        assert_eq!(store.get_note("g1").unwrap().message, "good");
        assert!(store.get_note("n2").is_some());
        let backup = fs::read_to_string(dir.path().join(NOTES_BACKUP_FILE)).unwrap();
        assert!(backup.contains("\"b1\""));
    }

    #[test]
    fn test_invalid_settings_are_fatal_and_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let original = r#"{"apiKey":"sk-keep-me","maxCommits":-1}"#;
        fs::write(dir.path().join(SETTINGS_FILE), original).unwrap();

        let err = NoteStore::open(dir.path()).err().unwrap();
        assert!(matches!(err, StoreError::InvalidSettings { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
            original
        );

        fs::write(dir.path().join(SETTINGS_FILE), r#"{"maxCommits":0}"#).unwrap();
        let err = NoteStore::open(dir.path()).err().unwrap();
        assert!(matches!(err, StoreError::InvalidSettings { .. }));

        fs::write(dir.path().join(SETTINGS_FILE), "nope").unwrap();
        assert!(NoteStore::open(dir.path()).is_err());
    }

    #[test]
    fn test_update_settings_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        store
            .update_settings(SettingsPatch {
                max_commits: Some(3),
                ai_enabled: Some(false),
                ..Default::default()
            })
            .unwrap();

        let store = NoteStore::open(dir.path()).unwrap();
        assert_eq!(store.settings().max_commits, 3);
        assert!(!store.settings().ai_enabled);
        assert_eq!(store.settings().model, crate::settings::DEFAULT_MODEL);
    }

    #[test]
    fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        let empty = store.stats().unwrap();
        assert_eq!(empty.total_notes, 0);
        assert!(empty.oldest.is_none());

        store.save_note(note_at("n1", "x", "/a", "main", 100)).unwrap();
        store.save_note(note_at("n2", "y", "/b", "main", 200)).unwrap();
        store.save_note(note_at("n3", "z", "/b", "main", 300)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.repositories, 2);
        assert!(stats.storage_bytes > 0);
        assert_eq!(stats.oldest, Some(Utc.timestamp_opt(100, 0).unwrap()));
        assert_eq!(stats.newest, Some(Utc.timestamp_opt(300, 0).unwrap()));
    }

    #[test]
    fn test_resume_scenario_across_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = NoteStore::open(dir.path()).unwrap();
        store.save_note(note_at("m1", "m1", "/a", "main", 1_000)).unwrap();
        store.save_note(note_at("m2", "m2", "/b", "main", 2_000)).unwrap();

        assert_eq!(store.latest_note(Some("/a")).unwrap().message, "m1");
        assert_eq!(store.latest_note(None).unwrap().message, "m2");
    }
}
