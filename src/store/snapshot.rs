//! Whole-file JSON snapshots.
//!
//! Every save rewrites the full document: the bytes go to a sibling temp
//! file which is synced and then renamed over the target, so a crash leaves
//! either the previous snapshot or the new one on disk.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads a snapshot. Missing or unreadable files yield an empty mapping,
/// content that does not parse is an error.
pub fn load<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Snapshot {:?} does not exist yet, starting empty", path);
            return Ok(T::default());
        }
        Err(e) => {
            warn!("Snapshot {:?} is unreadable ({}), starting empty", path, e);
            return Ok(T::default());
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        warn!("Snapshot {:?} is empty, starting empty", path);
        return Ok(T::default());
    }

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrites the snapshot at `path` with a pretty-printed `value`.
pub fn save<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })?;
    bytes.push(b'\n');

    write_atomic(path, &bytes).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Snapshot {:?} written ({} bytes)", path, bytes.len());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{MeetingBook, MeetingRecord, MovieBook, MovieEntry};
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let book: MovieBook = load(&dir.path().join("movies.json")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_blank_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(&path, "  \n").unwrap();
        let book: MovieBook = load(&path).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(&path, "{ \"1\": [ { \"title\": ").unwrap();
        let result = load::<MovieBook>(&path);
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let movies_path = dir.path().join("movies.json");
        let meetings_path = dir.path().join("meetings.json");

        let mut movies = MovieBook::new();
        movies.insert(
            10,
            vec![MovieEntry::new("Inception", 1), MovieEntry::new("Heat", 2)],
        );
        movies.insert(20, Vec::new());

        let mut meetings = MeetingBook::new();
        let mut guild = BTreeMap::new();
        guild.insert(
            555,
            MeetingRecord {
                film_title: "Dune".to_string(),
                date: "01/01/2030".to_string(),
                time: "20:00".to_string(),
                channel_id: 7,
            },
        );
        meetings.insert(10, guild);

        save(&movies_path, &movies).unwrap();
        save(&meetings_path, &meetings).unwrap();

        assert_eq!(load::<MovieBook>(&movies_path).unwrap(), movies);
        assert_eq!(load::<MeetingBook>(&meetings_path).unwrap(), meetings);

        // no temp file left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_snapshot_is_pretty_with_string_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        let mut movies = MovieBook::new();
        movies.insert(10, vec![MovieEntry::new("Heat", 2)]);
        save(&path, &movies).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"10\": ["));
        assert!(text.contains("\n  "));
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        let mut movies = MovieBook::new();
        movies.insert(10, vec![MovieEntry::new("Heat", 2)]);
        save(&path, &movies).unwrap();

        let unreachable = dir.path().join("missing").join("movies.json");
        assert!(matches!(
            save(&unreachable, &MovieBook::new()),
            Err(StoreError::Io { .. })
        ));
        assert_eq!(load::<MovieBook>(&path).unwrap(), movies);
    }
}
