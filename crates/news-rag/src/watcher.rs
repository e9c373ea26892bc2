//! Background auto-ingest of newly crawled articles
//!
//! Polls the crawled directory on a fixed interval and ingests only the files
//! that appeared since the last poll. Files present at construction count as
//! already seen.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ingestion::{list_article_files, Ingestor};
use crate::types::IngestReport;

struct WatchTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Incremental ingestion watcher
pub struct AutoIngest {
    ingestor: Arc<Ingestor>,
    seen: Mutex<HashSet<String>>,
    task: Mutex<Option<WatchTask>>,
}

impl AutoIngest {
    /// Create a watcher, seeding the seen set from the current directory listing
    pub fn new(ingestor: Arc<Ingestor>) -> Self {
        let seen = list_article_files(ingestor.crawled_dir())
            .iter()
            .filter_map(|p| file_name(p))
            .collect::<HashSet<_>>();
        tracing::debug!("Auto-ingest seeded with {} known files", seen.len());

        Self {
            ingestor,
            seen: Mutex::new(seen),
            task: Mutex::new(None),
        }
    }

    /// Number of filenames already seen
    pub fn seen_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether the background loop is running
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|t| !t.handle.is_finished())
            .unwrap_or(false)
    }

    /// Start polling every `interval`; no-op if already running
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let mut task = self.task.lock();
        if task.as_ref().map(|t| !t.handle.is_finished()).unwrap_or(false) {
            tracing::debug!("Auto-ingest already running");
            return;
        }

        let interval = interval.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let watcher = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(watcher) = watcher.upgrade() else { break };
                        watcher.poll_once().await;
                    }
                }
            }
            tracing::info!("Auto-ingest stopped");
        });

        tracing::info!("Auto-ingest started (every {}s)", interval.as_secs());
        *task = Some(WatchTask { cancel, handle });
    }

    /// Signal the loop to exit and wait for it
    pub async fn stop(&self) {
        let task = self.task.lock().take();
        let Some(task) = task else {
            return;
        };

        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            tracing::error!("Auto-ingest task ended abnormally: {}", e);
        }
    }

    /// Detect new files and ingest exactly those
    ///
    /// Returns `None` when nothing new appeared. New files are marked seen
    /// whether or not they ingest successfully.
    pub async fn poll_once(&self) -> Option<IngestReport> {
        let new_files = self.detect_new_files();
        if new_files.is_empty() {
            return None;
        }

        tracing::info!("Detected {} new article files", new_files.len());
        let report = self.ingestor.ingest_files(&new_files).await;
        if report.success {
            tracing::info!("Auto-ingest: {}", report.message);
        } else {
            tracing::warn!("Auto-ingest failed: {}", report.message);
        }
        Some(report)
    }

    fn detect_new_files(&self) -> Vec<PathBuf> {
        let current = list_article_files(self.ingestor.crawled_dir());
        let mut seen = self.seen.lock();

        // Listing is sorted, so the new paths are too
        current
            .into_iter()
            .filter(|path| file_name(path).map(|name| seen.insert(name)).unwrap_or(false))
            .collect()
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MemoryVectorStore, VectorStoreProvider};
    use crate::test_support::{test_config, write_article, HashEmbedder};
    use tempfile::TempDir;

    fn watcher(dir: &TempDir) -> (Arc<AutoIngest>, Arc<MemoryVectorStore>) {
        let store = Arc::new(MemoryVectorStore::new("articles"));
        let ingestor = Ingestor::new(
            &test_config(dir.path()),
            Arc::new(HashEmbedder::new(16)),
            store.clone(),
        );
        (Arc::new(AutoIngest::new(Arc::new(ingestor))), store)
    }

    fn seed(dir: &TempDir, n: usize) {
        for i in 0..n {
            write_article(
                dir.path(),
                &format!("old-{}.json", i),
                "Old",
                &format!("https://news.example/old/{}", i),
                "Earlier coverage.",
            );
        }
    }

    #[tokio::test]
    async fn test_only_new_file_ingested() {
        let dir = TempDir::new().unwrap();
        seed(&dir, 3);
        let (watcher, store) = watcher(&dir);
        assert_eq!(watcher.seen_count(), 3);
        assert!(watcher.poll_once().await.is_none());

        write_article(dir.path(), "new.json", "New", "https://news.example/new", "Fresh news.");
        let report = watcher.poll_once().await.unwrap();
        assert!(report.success);
        assert_eq!(report.files_processed, 1);
        assert_eq!(report.vectors_created, 1);
        assert_eq!(store.stats().await.unwrap().count, 1);

        assert!(watcher.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_new_file_is_marked_seen() {
        let dir = TempDir::new().unwrap();
        let (watcher, _store) = watcher(&dir);

        std::fs::write(dir.path().join("bad.json"), "{").unwrap();
        let report = watcher.poll_once().await.unwrap();
        assert!(!report.success);
        assert_eq!(report.message, "No valid articles found");
        assert!(watcher.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_is_prompt() {
        let dir = TempDir::new().unwrap();
        let (watcher, _store) = watcher(&dir);
        assert!(!watcher.is_running());

        watcher.start(Duration::from_secs(3600));
        watcher.start(Duration::from_secs(3600));
        assert!(watcher.is_running());

        tokio::time::timeout(Duration::from_secs(1), watcher.stop())
            .await
            .expect("stop should not wait for the interval");
        assert!(!watcher.is_running());

        // Stopping twice is harmless
        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_background_loop_ingests_new_files() {
        let dir = TempDir::new().unwrap();
        seed(&dir, 2);
        let (watcher, store) = watcher(&dir);
        watcher.start(Duration::from_millis(20));

        write_article(dir.path(), "late.json", "Late", "https://news.example/late", "Late news.");

        let deadline = Instant::now() + Duration::from_secs(5);
        while store.stats().await.map(|s| s.count).unwrap_or(0) == 0 {
            assert!(Instant::now() < deadline, "watcher did not ingest the new file");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        watcher.stop().await;

        assert_eq!(store.stats().await.unwrap().count, 1);
    }
}
