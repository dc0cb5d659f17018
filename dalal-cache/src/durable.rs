use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dalal_core::{DalalError, ForecastResult};
use serde::{Deserialize, Serialize};

use crate::CachedForecast;

/// On-disk layout: the forecast's own fields plus the write timestamp.
#[derive(Serialize, Deserialize)]
struct DurableRecord {
    #[serde(flatten)]
    forecast: ForecastResult,
    cached_at: DateTime<Utc>,
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// File name for a symbol's record; path separators become `_`.
#[must_use]
pub fn safe_file_name(symbol: &str) -> String {
    format!("{}.json", symbol.replace(['/', '\\'], "_"))
}

/// Per-symbol JSON records under one directory.
///
/// Records are replaced atomically (write to a temporary sibling, then
/// rename), so a reader sees either the old record or the new one, never a
/// partial file.
#[derive(Debug, Clone)]
pub struct DurableTier {
    dir: PathBuf,
    ttl: Duration,
}

impl DurableTier {
    /// Tier rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `symbol`.
    #[must_use]
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(safe_file_name(symbol))
    }

    /// Read the record for `symbol`.
    ///
    /// Returns `Ok(None)` when there is no record, it is older than the TTL,
    /// or it belongs to another symbol sharing the same file name.
    ///
    /// # Errors
    /// [`DalalError::CacheCorrupt`] when the record exists but cannot be parsed,
    /// [`DalalError::Io`] for other read failures.
    pub async fn load(&self, symbol: &str) -> Result<Option<CachedForecast>, DalalError> {
        let path = self.path_for(symbol);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: DurableRecord = serde_json::from_slice(&bytes)
            .map_err(|e| DalalError::cache_corrupt(path.display().to_string(), e.to_string()))?;
        if record.forecast.symbol != symbol {
            #[cfg(feature = "tracing")]
            tracing::debug!(symbol = %symbol, stored = %record.forecast.symbol, "durable record belongs to another symbol");
            return Ok(None);
        }
        let entry = CachedForecast {
            result: Arc::new(record.forecast),
            written_at: record.cached_at,
        };
        Ok(entry.is_fresh(self.ttl, Utc::now()).then_some(entry))
    }

    /// Like [`load`](Self::load), but any failure is a miss.
    pub async fn get(&self, symbol: &str) -> Option<CachedForecast> {
        match self.load(symbol).await {
            Ok(hit) => hit,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol = %symbol, error = %_e, "unreadable durable forecast record; treating as miss");
                None
            }
        }
    }

    /// Write the record for `symbol`, replacing any previous one.
    ///
    /// # Errors
    /// [`DalalError::Io`] when the directory or file cannot be written.
    pub async fn store(&self, symbol: &str, entry: &CachedForecast) -> Result<(), DalalError> {
        let record = DurableRecord {
            forecast: (*entry.result).clone(),
            cached_at: entry.written_at,
        };
        let body = serde_json::to_vec(&record).map_err(|e| DalalError::Io(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(symbol);
        let tmp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            safe_file_name(symbol),
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = tokio::fs::write(&tmp, &body).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
