//! Simulated progress for long-running generation and chat calls.
//!
//! The remote endpoints report no progress, so the display walks a fixed list
//! of steps by elapsed time since the call started. Once the last step is
//! reached a bar fills linearly towards 90%, and only [`ProgressTracker::complete`]
//! takes it to 100%.
//!
//! Time comes from a [`Clock`] so tests can advance it deterministically.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const GENERATION_STEPS: [&str; 5] = [
    "Reading the knowledge base",
    "Analysing the source",
    "Drafting the structure",
    "Writing the content",
    "Polishing the final copy",
];

pub const CHAT_STEPS: [&str; 3] = [
    "Reading your message",
    "Revising the content",
    "Preparing the reply",
];

/// Ceiling of the simulated bar before the call actually finishes.
pub const BAR_FILL_CEILING: u32 = 90;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonic millisecond clock.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTiming {
    pub step_duration_ms: u64,
    pub total_estimated_ms: u64,
}

impl ProgressTiming {
    pub fn new(step_duration_ms: u64, total_estimated_ms: u64) -> Self {
        Self {
            step_duration_ms,
            total_estimated_ms,
        }
    }

    /// Time the bar takes to reach the ceiling once the last step starts.
    /// Never zero.
    pub fn fill_duration_ms(&self, steps: usize) -> u64 {
        let stepping = self
            .step_duration_ms
            .saturating_mul(steps.saturating_sub(1) as u64);
        self.total_estimated_ms.saturating_sub(stepping).max(1)
    }
}

// ---------------------------------------------------------------------------
// ProgressState / snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ProgressState {
    Idle,
    Stepping(usize),
    BarFilling(u32),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    pub label: String,
    pub active: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub state: ProgressState,
    pub current_step_index: usize,
    pub progress_value: u32,
    pub steps: Vec<StepView>,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.state == ProgressState::Complete
    }
}

// ---------------------------------------------------------------------------
// ProgressTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { started_at: u64 },
    Complete,
}

pub struct ProgressTracker<C: Clock> {
    steps: Vec<String>,
    timing: ProgressTiming,
    clock: C,
    phase: Phase,
}

impl<C: Clock> ProgressTracker<C> {
    pub fn new(steps: &[&str], timing: ProgressTiming, clock: C) -> Self {
        Self {
            steps: steps.iter().map(|s| s.to_string()).collect(),
            timing,
            clock,
            phase: Phase::Idle,
        }
    }

    pub fn timing(&self) -> ProgressTiming {
        self.timing
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Begin a new cycle at the current clock time, discarding any previous one.
    pub fn start(&mut self) {
        self.phase = Phase::Running {
            started_at: self.clock.now_ms(),
        };
    }

    /// Snap to 100% with every step completed.
    pub fn complete(&mut self) {
        self.phase = Phase::Complete;
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn elapsed_ms(&self) -> u64 {
        match self.phase {
            Phase::Running { started_at } => self.clock.now_ms().saturating_sub(started_at),
            _ => 0,
        }
    }

    fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn current_step_index(&self) -> usize {
        match self.phase {
            Phase::Idle => 0,
            Phase::Complete => self.last_index(),
            Phase::Running { .. } => {
                let step = self.timing.step_duration_ms.max(1);
                let index = (self.elapsed_ms() / step) as usize;
                index.min(self.last_index())
            }
        }
    }

    pub fn state(&self) -> ProgressState {
        match self.phase {
            Phase::Idle => ProgressState::Idle,
            Phase::Complete => ProgressState::Complete,
            Phase::Running { .. } => {
                let index = self.current_step_index();
                if index < self.last_index() {
                    return ProgressState::Stepping(index);
                }
                let last_step_at = self
                    .timing
                    .step_duration_ms
                    .saturating_mul(self.last_index() as u64);
                let filling_for = self.elapsed_ms().saturating_sub(last_step_at);
                let fill = self.timing.fill_duration_ms(self.steps.len());
                let value = (u128::from(BAR_FILL_CEILING) * u128::from(filling_for)
                    / u128::from(fill))
                .min(u128::from(BAR_FILL_CEILING)) as u32;
                ProgressState::BarFilling(value)
            }
        }
    }

    pub fn progress_value(&self) -> u32 {
        match self.state() {
            ProgressState::BarFilling(v) => v,
            ProgressState::Complete => 100,
            _ => 0,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state();
        let current = self.current_step_index();
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let (active, completed) = match state {
                    ProgressState::Idle => (false, false),
                    ProgressState::Complete => (false, true),
                    _ => (i == current, i < current),
                };
                StepView {
                    label: label.clone(),
                    active,
                    completed,
                }
            })
            .collect();
        ProgressSnapshot {
            state,
            current_step_index: current,
            progress_value: self.progress_value(),
            steps,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
