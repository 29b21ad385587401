//! History manager - bounded snapshot log with smart undo/redo.
//!
//! Brush and fill operations are lossy pixel mutations with no inverse, so
//! undo is snapshot-based: every recorded entry carries a full encoded copy
//! of the surface. The log is bounded (`max_entries`) and time-adjacent
//! same-type edits can be merged into one entry, which is what keeps one
//! continuous stroke from producing a snapshot per pointer event.

mod snapshot;

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::core::errors::EngineError;
use crate::surface::Surface;
use snapshot::Snapshot;

const DEFAULT_MAX_ENTRIES: usize = 30;
const DEFAULT_GROUP_THRESHOLD: Duration = Duration::from_millis(500);

/// One step in the history log.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    snapshot: Snapshot,
    action_type: String,
    /// Raw operations folded into this entry by grouping.
    count: u32,
    timestamp: Instant,
    last_updated: Instant,
    ai_parameters: Option<Value>,
    is_ai: bool,
    checkpoint: Option<String>,
}

impl HistoryEntry {
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_ai_operation(&self) -> bool {
        self.is_ai
    }

    pub fn ai_parameters(&self) -> Option<&Value> {
        self.ai_parameters.as_ref()
    }

    pub fn checkpoint(&self) -> Option<&str> {
        self.checkpoint.as_deref()
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn last_updated(&self) -> Instant {
        self.last_updated
    }
}

/// What `record` did with the new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new entry was appended.
    Appended,
    /// The snapshot replaced the current entry's and its count grew.
    Merged,
}

/// What an undo/redo step landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub action_type: String,
    pub is_ai_operation: bool,
}

/// Summary of the log for UI control state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub len: usize,
    /// Index of the entry representing current surface state; `None` when
    /// the log is empty.
    pub cursor: Option<usize>,
    pub last_action_type: Option<String>,
    pub last_action_is_ai: bool,
}

/// Bounded, cursor-based log of surface snapshots.
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    /// Index of the current entry; `-1` iff the log is empty.
    cursor: isize,
    max_entries: usize,
    grouping_enabled: bool,
    group_threshold: Duration,
    last_operation: Option<Instant>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// `max_entries` bounds the log; the oldest entries are evicted past it.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
            max_entries: max_entries.max(1),
            grouping_enabled: false,
            group_threshold: DEFAULT_GROUP_THRESHOLD,
            last_operation: None,
        }
    }

    /// Enable or disable merging of time-adjacent same-type edits.
    pub fn set_grouping(&mut self, enabled: bool, threshold: Duration) {
        self.grouping_enabled = enabled;
        self.group_threshold = threshold;
    }

    /// Record the surface's current state after an edit.
    ///
    /// The snapshot is encoded before the log is touched, so a failed encode
    /// leaves the log exactly as it was and reports the error instead of
    /// silently dropping history.
    pub fn record(
        &mut self,
        surface: &Surface,
        action_type: &str,
    ) -> Result<RecordOutcome, EngineError> {
        self.record_at(surface, action_type, None, false, Instant::now())
    }

    /// Record a whole-frame edit produced by the external effects service.
    ///
    /// AI operations are never merged, in either direction, so each one is
    /// independently undoable.
    pub fn add_ai_operation(
        &mut self,
        surface: &Surface,
        operation_type: &str,
        parameters: Value,
    ) -> Result<RecordOutcome, EngineError> {
        self.record_at(surface, operation_type, Some(parameters), true, Instant::now())
    }

    fn record_at(
        &mut self,
        surface: &Surface,
        action_type: &str,
        ai_parameters: Option<Value>,
        is_ai: bool,
        now: Instant,
    ) -> Result<RecordOutcome, EngineError> {
        // Encode first: nothing below may run if this fails.
        let snapshot = Snapshot::capture(surface)?;

        // Writing after an undo discards the redo tail.
        let len = self.entries.len() as isize;
        if self.cursor < len - 1 {
            self.entries.truncate((self.cursor + 1) as usize);
        }

        let outcome = if self.should_merge(action_type, is_ai, now) {
            let entry = &mut self.entries[self.cursor as usize];
            entry.snapshot = snapshot;
            entry.count += 1;
            entry.last_updated = now;
            if ai_parameters.is_some() {
                entry.ai_parameters = ai_parameters;
            }
            RecordOutcome::Merged
        } else {
            self.entries.push(HistoryEntry {
                snapshot,
                action_type: action_type.to_string(),
                count: 1,
                timestamp: now,
                last_updated: now,
                ai_parameters,
                is_ai,
                checkpoint: None,
            });

            if self.entries.len() > self.max_entries {
                self.entries.remove(0);
                tracing::debug!(max = self.max_entries, "evicted oldest history entry");
            }
            self.cursor = self.entries.len() as isize - 1;
            RecordOutcome::Appended
        };

        self.last_operation = Some(now);
        Ok(outcome)
    }

    fn should_merge(&self, action_type: &str, is_ai: bool, now: Instant) -> bool {
        if !self.grouping_enabled || self.cursor < 0 || is_ai {
            return false;
        }
        let current = &self.entries[self.cursor as usize];
        if current.action_type != action_type || current.is_ai {
            return false;
        }
        match self.last_operation {
            Some(last) => now.saturating_duration_since(last) < self.group_threshold,
            None => false,
        }
    }

    /// Step backward and restore the surface from the entry landed on.
    ///
    /// With `smart` enabled, leaving a non-AI entry also skips the whole run
    /// of preceding entries with the same action type, so one user-perceived
    /// undo reverts an entire burst of like edits. AI entries always move a
    /// single step. Returns `Ok(None)` when there is nothing before the
    /// current entry.
    pub fn undo(
        &mut self,
        surface: &mut Surface,
        smart: bool,
    ) -> Result<Option<StepReport>, EngineError> {
        if self.cursor <= 0 {
            return Ok(None);
        }

        let original = self.cursor;
        self.cursor -= 1;

        let left = &self.entries[original as usize];
        if smart && !left.is_ai {
            let run_type = left.action_type.clone();
            while self.cursor > 0 {
                let candidate = &self.entries[self.cursor as usize];
                if candidate.action_type != run_type || candidate.is_ai {
                    break;
                }
                self.cursor -= 1;
            }
        }

        self.restore_current(surface, original)
            .map(Some)
    }

    /// Step forward, symmetric to [`undo`](Self::undo).
    pub fn redo(
        &mut self,
        surface: &mut Surface,
        smart: bool,
    ) -> Result<Option<StepReport>, EngineError> {
        let last = self.entries.len() as isize - 1;
        if self.cursor >= last {
            return Ok(None);
        }

        let original = self.cursor;
        self.cursor += 1;

        let landed = &self.entries[self.cursor as usize];
        if smart && !landed.is_ai {
            let run_type = landed.action_type.clone();
            while self.cursor < last {
                let next = &self.entries[(self.cursor + 1) as usize];
                if next.action_type != run_type || next.is_ai {
                    break;
                }
                self.cursor += 1;
            }
        }

        self.restore_current(surface, original)
            .map(Some)
    }

    /// Restore `entries[cursor]` onto the surface; on failure roll the
    /// cursor back so the log stays consistent with the visible pixels.
    fn restore_current(
        &mut self,
        surface: &mut Surface,
        rollback_cursor: isize,
    ) -> Result<StepReport, EngineError> {
        let entry = &self.entries[self.cursor as usize];
        if let Err(e) = entry.snapshot.restore(surface) {
            self.cursor = rollback_cursor;
            return Err(e);
        }
        Ok(StepReport {
            action_type: entry.action_type.clone(),
            is_ai_operation: entry.is_ai,
        })
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() as isize - 1
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
        self.last_operation = None;
    }

    /// Tag the current entry so it can be jumped back to by name.
    /// Returns the tagged index, or `None` when the log is empty.
    pub fn save_checkpoint(&mut self, name: &str) -> Option<usize> {
        if self.cursor < 0 {
            return None;
        }
        let idx = self.cursor as usize;
        self.entries[idx].checkpoint = Some(name.to_string());
        Some(idx)
    }

    /// Jump directly to the first entry tagged `name` and restore it.
    /// A missing name fails without touching the surface or the cursor.
    pub fn restore_checkpoint(
        &mut self,
        surface: &mut Surface,
        name: &str,
    ) -> Result<StepReport, EngineError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.checkpoint.as_deref() == Some(name))
            .ok_or_else(|| EngineError::CheckpointNotFound(name.to_string()))?;

        let rollback = self.cursor;
        self.cursor = idx as isize;
        self.restore_current(surface, rollback)
    }

    /// Entry representing the current surface state, if any.
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        if self.cursor < 0 {
            return None;
        }
        self.entries.get(self.cursor as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the log state for UI control wiring.
    pub fn state(&self) -> HistoryState {
        let current = self.current_entry();
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            len: self.entries.len(),
            cursor: (self.cursor >= 0).then_some(self.cursor as usize),
            last_action_type: current.map(|e| e.action_type.clone()),
            last_action_is_ai: current.map(|e| e.is_ai).unwrap_or(false),
        }
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}
