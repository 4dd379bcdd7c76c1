// Session file: the report session persisted between CLI invocations

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};

use corep_engine::{AuditRecord, BaselineSnapshot, ReportSession, ReportState};

use crate::{IoError, SESSION_FILE_VERSION};

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    #[serde(default)]
    saved_at: Option<String>,
    #[serde(default)]
    state: ReportState,
    #[serde(default)]
    audit: Option<AuditRecord>,
    #[serde(default)]
    baseline: Option<BaselineSnapshot>,
}

/// Load a session. A missing file is an empty session.
pub fn load(path: &Path) -> Result<ReportSession, IoError> {
    if !path.exists() {
        log::debug!("no session at {}, starting empty", path.display());
        return Ok(ReportSession::new());
    }
    let text = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    from_json(path, &text)
}

/// Save a session (atomic: write .tmp then rename).
pub fn save(path: &Path, session: &ReportSession) -> Result<(), IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
    }

    let file = SessionFile {
        version: SESSION_FILE_VERSION,
        saved_at: Some(chrono::Utc::now().to_rfc3339()),
        state: session.state().clone(),
        audit: session.audit().cloned(),
        baseline: session.baseline().cloned(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|e| IoError::file(path, e))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(|e| IoError::file(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| IoError::file(path, e))?;
    log::debug!("saved session to {}", path.display());
    Ok(())
}

/// Exclusive advisory lock on `<session>.lock`. Released on drop.
///
/// Hold it from `load` through `save` so a concurrent writer cannot load
/// the same snapshot and overwrite this event's result.
#[derive(Debug)]
#[must_use = "the lock is released when dropped"]
pub struct SessionLock {
    _file: File,
}

/// Block until the session at `path` is exclusively ours.
pub fn lock(path: &Path) -> Result<SessionLock, IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IoError::file(parent, e))?;
    }
    let lock_path = lock_path(path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| IoError::file(&lock_path, e))?;
    file.lock_exclusive().map_err(|e| IoError::file(&lock_path, e))?;
    log::debug!("locked {}", lock_path.display());
    Ok(SessionLock { _file: file })
}

/// Lock, load, edit, save. Nothing is written when `edit` fails.
pub fn update<T, E>(path: &Path, edit: impl FnOnce(&mut ReportSession) -> Result<T, E>) -> Result<T, E>
where
    E: From<IoError>,
{
    let _lock = lock(path)?;
    let mut session = load(path)?;
    let out = edit(&mut session)?;
    save(path, &session)?;
    Ok(out)
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn from_json(path: &Path, text: &str) -> Result<ReportSession, IoError> {
    let file: SessionFile = serde_json::from_str(text).map_err(|e| IoError::SessionParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if file.version != SESSION_FILE_VERSION {
        return Err(IoError::SessionVersion {
            path: path.to_path_buf(),
            found: file.version,
        });
    }
    Ok(ReportSession::from_parts(file.state, file.audit, file.baseline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corep_engine::{FieldId, FieldUpdate, UpdateSource};
    use tempfile::tempdir;

    fn upload_update(value: f64) -> FieldUpdate {
        FieldUpdate {
            field_id: FieldId::RetailExposure,
            value: Some(value),
            rule_ref: "CRR Art.123".into(),
            reasoning: "Retail mortgage book".into(),
            source_page: Some("p. 3".into()),
            source: UpdateSource::Upload,
        }
    }

    #[test]
    fn test_missing_file_is_empty_session() {
        let dir = tempdir().unwrap();
        let session = load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(session, ReportSession::new());
    }

    #[test]
    fn test_save_then_load_preserves_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        let mut session = ReportSession::new();
        session.apply_manual(FieldId::SovereignExposure, Some(10.0)).unwrap();
        session.lock_baseline();
        session.apply(upload_update(75.0)).unwrap();

        save(&path, &session).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.audit().unwrap().source, UpdateSource::Upload);
        assert_eq!(loaded.diff(FieldId::RetailExposure), 75.0);
    }

    #[test]
    fn test_overlapping_edits_are_serialized() {
        use std::sync::{Arc, Barrier};
        use std::time::Duration;

        let dir = tempdir().unwrap();
        let path = Arc::new(dir.path().join("session.json"));
        let barrier = Arc::new(Barrier::new(2));

        let workers: Vec<_> = [(FieldId::SovereignExposure, 10.0), (FieldId::RetailExposure, 5.0)]
            .into_iter()
            .map(|(field, value)| {
                let path = Arc::clone(&path);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    update(&path, |session| {
                        // Widen the load-to-save window so an unlocked
                        // writer would lose the other thread's event.
                        std::thread::sleep(Duration::from_millis(50));
                        session.apply_manual(field, Some(value)).map_err(|e| IoError::Export(e.to_string()))
                    })
                    .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let session = load(&path).unwrap();
        assert_eq!(session.state().get(FieldId::SovereignExposure), Some(10.0));
        assert_eq!(session.state().get(FieldId::RetailExposure), Some(5.0));
    }

    #[test]
    fn test_lock_blocks_second_writer() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let held = lock(&path).unwrap();
        assert!(dir.path().join("session.json.lock").exists());

        let (tx, rx) = mpsc::channel();
        let contender = {
            let path = path.clone();
            std::thread::spawn(move || {
                let _lock = lock(&path).unwrap();
                tx.send(()).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(held);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        contender.join().unwrap();
    }

    #[test]
    fn test_failed_edit_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let result: Result<(), IoError> = update(&path, |session| {
            session.apply_manual(FieldId::RetailExposure, Some(1.0)).unwrap();
            Err(IoError::Export("abandoned".into()))
        });
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"version":99,"state":{}}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, IoError::SessionVersion { found: 99, .. }));
    }

    #[test]
    fn test_rejects_unknown_field_in_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"version":1,"state":{"row_nonexistent":1.0}}"#).unwrap();
        assert!(matches!(load(&path).unwrap_err(), IoError::SessionParse { .. }));
    }
}
