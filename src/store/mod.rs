//! In-memory state for every server plus its flat-file persistence.

pub mod models;
pub mod snapshot;

pub use models::{MeetingBook, MeetingRecord, MovieBook, MovieEntry};

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{error, info};

/// One snapshot document and the mapping it holds.
///
/// All access goes through a single async mutex, so mutations (including
/// their disk write) for any server are applied one at a time.
pub struct Collection<T> {
    path: PathBuf,
    state: Mutex<T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + Send + 'static,
{
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = snapshot::load(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.state.lock().await;
        f(&*guard)
    }

    /// Applies `f` and rewrites the snapshot before returning.
    ///
    /// If `f` fails or the write fails, the in-memory mapping is restored to
    /// what it was before the call.
    pub async fn mutate<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.state.lock().await;
        let before = (*guard).clone();

        let out = match f(&mut *guard) {
            Ok(out) => out,
            Err(e) => {
                *guard = before;
                return Err(e);
            }
        };

        if let Err(e) = self.persist((*guard).clone()).await {
            error!("Rolling back change to {:?}: {}", self.path, e);
            *guard = before;
            return Err(e.into());
        }
        Ok(out)
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        let snapshot = self.state.lock().await.clone();
        self.persist(snapshot).await
    }

    async fn persist(&self, snapshot: T) -> Result<(), StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || snapshot::save(&path, &snapshot)).await?
    }
}

/// Both keyed collections the bot owns.
pub struct Store {
    pub movies: Collection<MovieBook>,
    pub meetings: Collection<MeetingBook>,
}

impl Store {
    pub fn open(
        movies_path: impl Into<PathBuf>,
        meetings_path: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let movies = Collection::open(movies_path)?;
        let meetings = Collection::open(meetings_path)?;
        info!(
            "Store: loaded movies from {:?} and meetings from {:?}",
            movies.path(),
            meetings.path()
        );
        Ok(Self { movies, meetings })
    }

    /// Final save of both documents at shutdown.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.movies.flush().await?;
        self.meetings.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mutation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("m.json"), dir.path().join("s.json")).unwrap();

        store
            .movies
            .mutate(|book| {
                book.entry(1).or_default().push(MovieEntry::new("Heat", 9));
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        let reopened = Store::open(dir.path().join("m.json"), dir.path().join("s.json")).unwrap();
        let titles = reopened
            .movies
            .read(|book| book[&1].iter().map(|m| m.title.clone()).collect::<Vec<_>>())
            .await;
        assert_eq!(titles, vec!["Heat"]);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let movies = Collection::<MovieBook>::open(dir.path().join("gone").join("m.json")).unwrap();

        let result = movies
            .mutate(|book| {
                book.entry(1).or_default().push(MovieEntry::new("Heat", 9));
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(movies.read(|book| book.is_empty()).await);
    }

    #[tokio::test]
    async fn test_failed_closure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let movies = Collection::<MovieBook>::open(dir.path().join("m.json")).unwrap();

        let result: Result<(), StoreError> = movies
            .mutate(|book| {
                book.entry(1).or_default();
                Err(StoreError::Io {
                    path: PathBuf::from("x"),
                    source: std::io::Error::other("nope"),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(movies.read(|book| book.is_empty()).await);
        assert!(!dir.path().join("m.json").exists());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("s.json"), "[1, 2").unwrap();
        let result = Store::open(dir.path().join("m.json"), dir.path().join("s.json"));
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }
}
