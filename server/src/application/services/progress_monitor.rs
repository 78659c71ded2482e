//! Progress monitor (C9, §4.9).
//!
//! A guarded, process-wide record describing the currently running
//! background task (the crawler or the enrichment worker), with a bounded
//! event log the admin UI polls via `/api/updater/status`.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

const EVENT_LOG_CAPACITY: usize = 300;

/// Severity tag on a single event-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// One entry in the bounded event ring.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}

/// A read-only snapshot handed to HTTP handlers; safe to serialize directly.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub running: bool,
    pub task_name: Option<String>,
    pub total: u64,
    pub current: u64,
    pub success_count: u64,
    pub fail_count: u64,
    pub current_item: Option<String>,
    pub events: Vec<ProgressEvent>,
}

struct ProgressState {
    running: bool,
    task_name: Option<String>,
    total: u64,
    current: u64,
    success_count: u64,
    fail_count: u64,
    current_item: Option<String>,
    events: VecDeque<ProgressEvent>,
}

impl ProgressState {
    fn new() -> Self {
        Self {
            running: false,
            task_name: None,
            total: 0,
            current: 0,
            success_count: 0,
            fail_count: 0,
            current_item: None,
            events: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        }
    }
}

/// Guarded progress state shared across the crawler, the enrichment worker,
/// and the HTTP handler that serves `/api/updater/status`.
pub struct ProgressMonitor {
    state: Mutex<ProgressState>,
}

impl ProgressMonitor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProgressState::new()),
        }
    }

    /// Starts a new task, resetting counters. Returns `false` (and leaves the
    /// state untouched) if a task is already running — callers use this as
    /// the singleton-worker guard (§5 "concurrent-task-rejected").
    pub fn try_start(&self, task_name: impl Into<String>, total: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.running {
            return false;
        }
        state.running = true;
        state.task_name = Some(task_name.into());
        state.total = total;
        state.current = 0;
        state.success_count = 0;
        state.fail_count = 0;
        state.current_item = None;
        true
    }

    pub fn update(&self, current: u64, current_item: Option<String>) {
        let mut state = self.state.lock().unwrap();
        state.current = current;
        state.current_item = current_item;
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap();
        state.success_count += 1;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_count += 1;
    }

    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        if state.events.len() >= EVENT_LOG_CAPACITY {
            state.events.pop_front();
        }
        state.events.push_back(ProgressEvent {
            timestamp: Utc::now(),
            message: message.into(),
            severity,
        });
    }

    /// Ends the current task. Always succeeds; the event log survives.
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap();
        state.running = false;
        state.current_item = None;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state.lock().unwrap();
        ProgressSnapshot {
            running: state.running,
            task_name: state.task_name.clone(),
            total: state.total,
            current: state.current,
            success_count: state.success_count,
            fail_count: state.fail_count,
            current_item: state.current_item.clone(),
            events: state.events.iter().cloned().collect(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_start_is_rejected_while_running() {
        let monitor = ProgressMonitor::new();
        assert!(monitor.try_start("scan", 100));
        assert!(!monitor.try_start("scan", 50));
        monitor.finish();
        assert!(monitor.try_start("scan", 50));
    }

    #[test]
    fn event_log_is_bounded() {
        let monitor = ProgressMonitor::new();
        for i in 0..(EVENT_LOG_CAPACITY + 10) {
            monitor.log(Severity::Info, format!("event {i}"));
        }
        assert_eq!(monitor.snapshot().events.len(), EVENT_LOG_CAPACITY);
    }

    #[test]
    fn snapshot_reflects_progress_updates() {
        let monitor = ProgressMonitor::new();
        monitor.try_start("enrich", 10);
        monitor.update(3, Some("My Show".to_string()));
        monitor.record_success();
        monitor.record_failure();
        let snap = monitor.snapshot();
        assert_eq!(snap.current, 3);
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.fail_count, 1);
        assert_eq!(snap.current_item.as_deref(), Some("My Show"));
    }
}
