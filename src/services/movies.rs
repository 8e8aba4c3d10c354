use crate::error::{CommandError, CommandResult};
use crate::services::to_index;
use crate::store::{MovieEntry, Store};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Per-server watch-list operations. Every mutation is on disk before it
/// returns.
#[derive(Clone)]
pub struct MovieListService {
    store: Arc<Store>,
}

impl MovieListService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn add(
        &self,
        guild_id: u64,
        title: &str,
        proposer_id: u64,
    ) -> CommandResult<MovieEntry> {
        let entry = MovieEntry::new(title, proposer_id);
        let position = self
            .store
            .movies
            .mutate(|book| {
                let list = book.entry(guild_id).or_default();
                list.push(entry.clone());
                Ok::<_, CommandError>(list.len())
            })
            .await?;
        info!(
            "Guild {}: user {} added '{}' at #{}",
            guild_id, proposer_id, entry.title, position
        );
        Ok(entry)
    }

    pub async fn remove(&self, guild_id: u64, position: i64) -> CommandResult<MovieEntry> {
        let removed = self
            .store
            .movies
            .mutate(|book| {
                let list = book.entry(guild_id).or_default();
                let idx = to_index(position, list.len())?;
                Ok::<_, CommandError>(list.remove(idx))
            })
            .await?;
        info!("Guild {}: removed '{}' (#{})", guild_id, removed.title, position);
        Ok(removed)
    }

    /// Sets the watched flag; setting it to its current value is a no-op success.
    pub async fn set_watched(
        &self,
        guild_id: u64,
        position: i64,
        watched: bool,
    ) -> CommandResult<MovieEntry> {
        let entry = self
            .store
            .movies
            .mutate(|book| {
                let list = book.entry(guild_id).or_default();
                let idx = to_index(position, list.len())?;
                list[idx].watched = watched;
                Ok::<_, CommandError>(list[idx].clone())
            })
            .await?;
        info!(
            "Guild {}: '{}' marked {}",
            guild_id,
            entry.title,
            if watched { "watched" } else { "unwatched" }
        );
        Ok(entry)
    }

    pub async fn list(&self, guild_id: u64) -> Vec<MovieEntry> {
        self.store
            .movies
            .read(|book| book.get(&guild_id).cloned().unwrap_or_default())
            .await
    }

    /// Picks a uniformly random entry, returned with its 1-based position.
    pub async fn random_pick(&self, guild_id: u64) -> CommandResult<(usize, MovieEntry)> {
        let mut list = self.list(guild_id).await;
        if list.is_empty() {
            return Err(CommandError::EmptyList);
        }
        let idx = rand::thread_rng().gen_range(0..list.len());
        Ok((idx + 1, list.swap_remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service() -> (TempDir, MovieListService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(
            dir.path().join("movies.json"),
            dir.path().join("meetings.json"),
        )
        .unwrap();
        (dir, MovieListService::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_add_appends_unwatched() {
        let (_dir, movies) = service();
        movies.add(1, "Heat", 10).await.unwrap();
        movies.add(1, "Inception", 11).await.unwrap();

        let list = movies.list(1).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], MovieEntry::new("Inception", 11));
        assert!(!list[1].watched);
        assert!(movies.list(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_leaves_list_unchanged() {
        let (_dir, movies) = service();
        movies.add(1, "Heat", 10).await.unwrap();
        let before = movies.list(1).await;

        for bad in [0, -3, 2, 99] {
            assert!(matches!(
                movies.remove(1, bad).await,
                Err(CommandError::IndexOutOfRange { .. })
            ));
            assert!(matches!(
                movies.set_watched(1, bad, true).await,
                Err(CommandError::IndexOutOfRange { .. })
            ));
        }
        assert_eq!(movies.list(1).await, before);
        assert!(matches!(
            movies.remove(7, 1).await,
            Err(CommandError::IndexOutOfRange { index: 1, len: 0 })
        ));
    }

    #[tokio::test]
    async fn test_set_watched_is_idempotent() {
        let (_dir, movies) = service();
        movies.add(1, "Heat", 10).await.unwrap();

        movies.set_watched(1, 1, true).await.unwrap();
        let once = movies.list(1).await;
        movies.set_watched(1, 1, true).await.unwrap();
        assert_eq!(movies.list(1).await, once);
        assert!(once[0].watched);

        movies.set_watched(1, 1, false).await.unwrap();
        assert!(!movies.list(1).await[0].watched);
    }

    #[tokio::test]
    async fn test_remove_returns_entry_and_shifts() {
        let (_dir, movies) = service();
        for title in ["A", "B", "C"] {
            movies.add(1, title, 10).await.unwrap();
        }
        let removed = movies.remove(1, 2).await.unwrap();
        assert_eq!(removed.title, "B");
        let titles: Vec<_> = movies.list(1).await.into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_random_pick() {
        let (_dir, movies) = service();
        assert!(matches!(
            movies.random_pick(1).await,
            Err(CommandError::EmptyList)
        ));

        for title in ["A", "B", "C"] {
            movies.add(1, title, 10).await.unwrap();
        }
        let list = movies.list(1).await;
        for _ in 0..20 {
            let (position, entry) = movies.random_pick(1).await.unwrap();
            assert_eq!(list[position - 1], entry);
        }
    }

    #[tokio::test]
    async fn test_changes_survive_reload() {
        let (dir, movies) = service();
        movies.add(1, "Heat", 10).await.unwrap();
        movies.set_watched(1, 1, true).await.unwrap();

        let reopened = Store::open(
            dir.path().join("movies.json"),
            dir.path().join("meetings.json"),
        )
        .unwrap();
        let reloaded = MovieListService::new(Arc::new(reopened));
        assert_eq!(reloaded.list(1).await, movies.list(1).await);
    }

    #[tokio::test]
    async fn test_persist_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(
            dir.path().join("missing").join("movies.json"),
            dir.path().join("meetings.json"),
        )
        .unwrap();
        let movies = MovieListService::new(Arc::new(store));

        assert!(matches!(
            movies.add(1, "Heat", 10).await,
            Err(CommandError::Persist(_))
        ));
        assert!(movies.list(1).await.is_empty());
    }
}
