use crate::model::UsageRecord;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Shared usage accounting and per-user rate limiting.
///
/// Constructed once per process and injected into everything that makes AI
/// calls. The window check and the timestamp insert happen under one lock,
/// so concurrent tasks for the same user cannot both slip past the limit.
pub struct UsageLedger {
    limit: usize,
    window: Duration,
    windows: Mutex<HashMap<u64, VecDeque<Instant>>>,
    records: Mutex<Vec<UsageRecord>>,
}

impl UsageLedger {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Atomic check-and-increment against the user's sliding window.
    /// Returns `false` (and admits nothing) once the user has `limit` calls
    /// inside the trailing window. Expired timestamps are pruned lazily on
    /// each check.
    pub fn try_acquire(&self, user_id: u64) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        let window = windows.entry(user_id).or_default();

        while let Some(front) = window.front() {
            if now.duration_since(*front) > self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.limit {
            return false;
        }

        window.push_back(now);
        true
    }

    /// Append one accounting entry. Called for every attempted AI call,
    /// success or not.
    pub fn record(&self, record: UsageRecord) {
        self.records.lock().unwrap().push(record);
    }

    /// All usage entries for one user, in call order.
    pub fn records_for(&self, user_id: u64) -> Vec<UsageRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Total tokens (input + output) consumed by one user.
    pub fn total_tokens_for(&self, user_id: u64) -> u64 {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.input_tokens as u64 + r.output_tokens as u64)
            .sum()
    }
}
