use crate::config::{LeaderboardSettings, SheetSource};
use crate::error::PipelineError;
use crate::models::leaderboard::LeaderboardEntry;
use crate::services::{sheet_fetcher::SheetFetcher, sheet_parser};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Result of one fetch cycle. Never mutated after it is installed.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub entries: Vec<LeaderboardEntry>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    generation: u64,
}

impl Snapshot {
    /// Entries to serve, or why there are none.
    pub fn entries(&self) -> Result<&[LeaderboardEntry], String> {
        match (&self.last_error, self.fetched_at) {
            (Some(e), _) => Err(e.clone()),
            (None, None) => Err("Leaderboard has not been loaded yet".into()),
            (None, Some(_)) => Ok(&self.entries),
        }
    }
}

pub struct LeaderboardStore {
    fetcher: SheetFetcher,
    source: SheetSource,
    pub settings: LeaderboardSettings,
    current: Mutex<Arc<Snapshot>>,
    next_generation: AtomicU64,
}

impl LeaderboardStore {
    pub fn new(fetcher: SheetFetcher, source: SheetSource, settings: LeaderboardSettings) -> Self {
        LeaderboardStore {
            fetcher,
            source,
            settings,
            current: Mutex::new(Arc::new(Snapshot::default())),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.lock().clone()
    }

    /// Fetch and parse the sheet, then install the result.
    ///
    /// A failure replaces the current entries with the error. If a newer
    /// refresh finished first, this one's result is dropped.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, PipelineError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let result = self
            .fetcher
            .fetch(&self.source)
            .await
            .and_then(|raw| sheet_parser::parse(&raw));

        let snapshot = match &result {
            Ok(entries) => {
                tracing::info!(
                    entries = entries.len(),
                    source = %self.source.describe(),
                    "Leaderboard sheet loaded"
                );
                Snapshot {
                    entries: entries.clone(),
                    fetched_at: Some(Utc::now()),
                    last_error: None,
                    generation,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Leaderboard refresh failed");
                Snapshot {
                    entries: Vec::new(),
                    fetched_at: None,
                    last_error: Some(e.to_string()),
                    generation,
                }
            }
        };

        let installed = self.install(snapshot);
        result.map(|_| installed)
    }

    fn install(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let mut current = self.lock();
        if snapshot.generation < current.generation {
            tracing::debug!(
                stale = snapshot.generation,
                current = current.generation,
                "Discarding stale leaderboard fetch"
            );
            return current.clone();
        }
        *current = Arc::new(snapshot);
        current.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Arc<Snapshot>> {
        // Only whole Arcs are ever stored, so a poisoned guard is still consistent.
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn install_entries(&self, entries: Vec<LeaderboardEntry>) {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        self.install(Snapshot {
            entries,
            fetched_at: Some(Utc::now()),
            last_error: None,
            generation,
        });
    }
}
