use crate::model::{CountMode, CountdownSet, Snapshot};
use crate::session::Session;
use thiserror::Error;

/// Rejected store operations. Callers are expected to pre-validate;
/// the store re-checks defensively and never panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A set value must be at least 1.
    #[error("set value must be at least 1")]
    InvalidValue,
    /// Index referencing a nonexistent set.
    #[error("no set at index {0}")]
    OutOfRange(usize),
}

/// Owns the set list, the active index and the running flag.
/// The single writer of countdown state; every other component reads
/// snapshots and issues commands. Each operation is atomic: observers
/// see either the pre- or the post-state, never anything partial.
#[derive(Debug, Clone)]
pub struct CountdownStore {
    sets: Vec<CountdownSet>,
    active_index: usize,
    is_running: bool,
    mode: CountMode,
    reached_zero: bool,
}

impl Default for CountdownStore {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            active_index: 0,
            is_running: false,
            mode: CountMode::Single,
            reached_zero: false,
        }
    }
}

impl CountdownStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted session. Out-of-range indices are clamped
    /// and sets that violate the invariants are repaired rather than
    /// rejected; the running flag is never restored (see `Session::restored`).
    pub fn from_session(session: &Session) -> Self {
        let mut sets: Vec<CountdownSet> = session
            .sets
            .iter()
            .copied()
            .filter(|s| s.start_value >= 1)
            .collect();
        for set in &mut sets {
            set.current_value = set.current_value.min(set.start_value);
        }
        let active_index = if sets.is_empty() {
            0
        } else {
            session.active_index.min(sets.len() - 1)
        };
        Self {
            sets,
            active_index,
            is_running: false,
            mode: session.mode,
            reached_zero: false,
        }
    }

    pub fn to_session(&self, theme: &str) -> Session {
        Session {
            sets: self.sets.clone(),
            active_index: self.active_index,
            is_running: self.is_running,
            mode: self.mode,
            theme: theme.to_string(),
        }
    }

    pub fn sets(&self) -> &[CountdownSet] {
        &self.sets
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn mode(&self) -> CountMode {
        self.mode
    }

    pub fn active_set(&self) -> Option<&CountdownSet> {
        self.sets.get(self.active_index)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_value: self.active_set().map(|s| s.current_value).unwrap_or(0),
            is_running: self.is_running,
            reached_zero: self.reached_zero,
        }
    }

    /// Append a new set, full at its start value. Refused with a value of 0;
    /// silently skipped while running (a UI-level guard, re-checked here).
    pub fn add_set(&mut self, start_value: u32) -> Result<(), StoreError> {
        if start_value == 0 {
            return Err(StoreError::InvalidValue);
        }
        if self.is_running {
            return Ok(());
        }
        self.sets.push(CountdownSet::new(start_value));
        Ok(())
    }

    /// Change a set's start value. Paused: the live value follows. Running:
    /// only the template changes, except that the live value clamps down to
    /// the new start so `current_value <= start_value` keeps holding.
    pub fn edit_set(&mut self, index: usize, new_start: u32) -> Result<(), StoreError> {
        if new_start == 0 {
            return Err(StoreError::InvalidValue);
        }
        let running = self.is_running;
        let set = self
            .sets
            .get_mut(index)
            .ok_or(StoreError::OutOfRange(index))?;
        set.start_value = new_start;
        if running {
            set.current_value = set.current_value.min(new_start);
        } else {
            set.current_value = new_start;
        }
        Ok(())
    }

    /// Remove a set and re-clamp the active index into range.
    pub fn remove_set(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.sets.len() {
            return Err(StoreError::OutOfRange(index));
        }
        // Removing at or before the active index changes which set is
        // active, so the zero hint no longer refers to it.
        let identity_changed = index <= self.active_index;
        self.sets.remove(index);
        if self.sets.is_empty() {
            self.active_index = 0;
            self.is_running = false;
            self.reached_zero = false;
        } else {
            self.active_index = self.active_index.min(self.sets.len() - 1);
            if identity_changed {
                self.reached_zero = false;
            }
        }
        Ok(())
    }

    /// Make another set the active one. Disallowed while running.
    pub fn select_set(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.sets.len() {
            return Err(StoreError::OutOfRange(index));
        }
        if self.is_running {
            return Ok(());
        }
        self.active_index = index;
        self.reached_zero = false;
        Ok(())
    }

    pub fn start(&mut self) {
        if self.sets.is_empty() || self.is_running {
            return;
        }
        self.is_running = true;
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    pub fn toggle_running(&mut self) {
        if self.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Take one off the active set. No-op when empty, paused, or already at
    /// the floor. The call that lands on 0 raises the reached-zero hint and
    /// auto-pauses in the same transition.
    pub fn decrement_active(&mut self) {
        if !self.is_running {
            return;
        }
        let Some(set) = self.sets.get_mut(self.active_index) else {
            return;
        };
        if set.at_zero() {
            return;
        }
        set.current_value -= 1;
        if set.at_zero() {
            self.reached_zero = true;
            self.is_running = false;
        }
    }

    /// Refill the active set and pause.
    pub fn reset_active(&mut self) {
        let Some(set) = self.sets.get_mut(self.active_index) else {
            return;
        };
        set.current_value = set.start_value;
        self.is_running = false;
        self.reached_zero = false;
    }

    /// Refill every set and pause. The active index stays put.
    pub fn reset_all(&mut self) {
        for set in &mut self.sets {
            set.current_value = set.start_value;
        }
        self.is_running = false;
        self.reached_zero = false;
    }

    /// Wrap to the next set and resume running. Meaningful after the active
    /// set reached zero, but unconditional here; callers gate on the hint.
    pub fn advance_to_next(&mut self) {
        if self.sets.len() < 2 {
            return;
        }
        self.active_index = (self.active_index + 1) % self.sets.len();
        self.reached_zero = false;
        self.is_running = true;
    }

    pub fn set_mode(&mut self, mode: CountMode) {
        self.mode = mode;
    }
}
