//! Time-bounded memo of computed report tables.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::report::{ReportKey, ReportTable};
use crate::store::{lock, RepositoryError};

/// Tables are reused until `ttl` elapses; writes elsewhere never invalidate them.
/// Expired entries are swept on every insert, so the map only holds live keys.
#[derive(Debug)]
pub struct MetricCache {
    ttl: Duration,
    entries: Mutex<HashMap<ReportKey, (Instant, ReportTable)>>,
}

impl MetricCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_or_compute<F, E>(&self, key: ReportKey, compute: F) -> Result<ReportTable, E>
    where
        F: FnOnce() -> Result<ReportTable, E>,
        E: From<RepositoryError>,
    {
        self.get_or_compute_at(key, Instant::now(), compute)
    }

    pub(crate) fn get_or_compute_at<F, E>(
        &self,
        key: ReportKey,
        now: Instant,
        compute: F,
    ) -> Result<ReportTable, E>
    where
        F: FnOnce() -> Result<ReportTable, E>,
        E: From<RepositoryError>,
    {
        {
            let guard = lock(&self.entries, "metric cache")?;
            if let Some((stored_at, table)) = guard.get(&key) {
                if now.saturating_duration_since(*stored_at) < self.ttl {
                    return Ok(table.clone());
                }
            }
        }

        let table = compute()?;
        let ttl = self.ttl;
        let mut guard = lock(&self.entries, "metric cache")?;
        guard.retain(|_, (stored_at, _)| now.saturating_duration_since(*stored_at) < ttl);
        if !ttl.is_zero() {
            guard.insert(key, (now, table.clone()));
        }
        Ok(table)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or_default()
    }

    pub fn clear(&self) -> Result<(), RepositoryError> {
        lock(&self.entries, "metric cache")?.clear();
        Ok(())
    }
}
