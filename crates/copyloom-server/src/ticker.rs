//! Timer driver for simulated progress.
//!
//! While a remote call is in flight a coarse timer publishes a snapshot at
//! every step boundary. Once the last step is reached it hands over to a fine
//! bar-fill timer. Both timers belong to one [`ProgressTicker`]; dropping it
//! aborts both, so no timer outlives the call that started it.

use copyloom_core::progress::{Clock, ProgressState, ProgressTracker};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::state::SseMessage;

/// Bar-fill publish interval.
pub const FILL_TICK: Duration = Duration::from_millis(250);

#[derive(Default)]
struct FillSlot {
    closed: bool,
    handle: Option<JoinHandle<()>>,
}

pub struct ProgressTicker {
    step_timer: JoinHandle<()>,
    fill_slot: Arc<Mutex<FillSlot>>,
}

fn publish<C: Clock>(
    tracker: &Mutex<ProgressTracker<C>>,
    tx: &broadcast::Sender<SseMessage>,
    run_id: &str,
) -> Option<ProgressState> {
    let snapshot = tracker.lock().ok()?.snapshot();
    let state = snapshot.state;
    let _ = tx.send(SseMessage::Progress {
        run_id: run_id.to_string(),
        snapshot,
    });
    Some(state)
}

impl ProgressTicker {
    /// Start the tracker and its timers. Must be called inside a Tokio runtime.
    pub fn start<C: Clock + 'static>(
        tracker: Arc<Mutex<ProgressTracker<C>>>,
        tx: broadcast::Sender<SseMessage>,
        run_id: String,
    ) -> Self {
        let step = {
            let mut t = match tracker.lock() {
                Ok(t) => t,
                Err(poisoned) => poisoned.into_inner(),
            };
            t.start();
            Duration::from_millis(t.timing().step_duration_ms.max(1))
        };

        let fill_slot = Arc::new(Mutex::new(FillSlot::default()));
        let slot = fill_slot.clone();

        let step_timer = tokio::spawn(async move {
            let mut interval = tokio::time::interval(step);
            loop {
                interval.tick().await;
                match publish(&tracker, &tx, &run_id) {
                    Some(ProgressState::BarFilling(_)) => break,
                    Some(ProgressState::Stepping(_)) => continue,
                    _ => return,
                }
            }

            let Ok(mut slot) = slot.lock() else { return };
            if slot.closed {
                return;
            }
            slot.handle = Some(tokio::spawn(async move {
                let mut interval = tokio::time::interval(FILL_TICK);
                loop {
                    interval.tick().await;
                    match publish(&tracker, &tx, &run_id) {
                        Some(ProgressState::BarFilling(v)) if v < 90 => continue,
                        _ => return,
                    }
                }
            }));
        });

        Self {
            step_timer,
            fill_slot,
        }
    }

    /// True once neither timer can fire again.
    pub fn is_finished(&self) -> bool {
        let fill_done = self
            .fill_slot
            .lock()
            .map(|s| s.handle.as_ref().map_or(true, |h| h.is_finished()))
            .unwrap_or(true);
        self.step_timer.is_finished() && fill_done
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.step_timer.abort();
        let mut slot = match self.fill_slot.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.closed = true;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copyloom_core::progress::{ManualClock, ProgressTiming, GENERATION_STEPS};

    fn tracker(clock: &ManualClock) -> Arc<Mutex<ProgressTracker<ManualClock>>> {
        Arc::new(Mutex::new(ProgressTracker::new(
            &GENERATION_STEPS,
            ProgressTiming::new(20, 120),
            clock.clone(),
        )))
    }

    #[tokio::test]
    async fn publishes_snapshots_for_the_run() {
        let clock = ManualClock::new();
        let (tx, mut rx) = broadcast::channel(64);
        let _ticker = ProgressTicker::start(tracker(&clock), tx, "run-1".into());

        match rx.recv().await.unwrap() {
            SseMessage::Progress { run_id, snapshot } => {
                assert_eq!(run_id, "run-1");
                assert_eq!(snapshot.state, ProgressState::Stepping(0));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn hands_over_to_fill_timer_after_last_step() {
        let clock = ManualClock::new();
        let (tx, mut rx) = broadcast::channel(256);
        let ticker = ProgressTicker::start(tracker(&clock), tx, "run-2".into());
        clock.set(90);

        let saw_fill = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(SseMessage::Progress { snapshot, .. }) = rx.recv().await {
                    if matches!(snapshot.state, ProgressState::BarFilling(_)) {
                        return true;
                    }
                }
            }
        })
        .await
        .unwrap_or(false);
        assert!(saw_fill);
        drop(ticker);
    }

    #[tokio::test]
    async fn drop_stops_every_timer() {
        let clock = ManualClock::new();
        let (tx, mut rx) = broadcast::channel(256);
        let ticker = ProgressTicker::start(tracker(&clock), tx.clone(), "run-3".into());
        clock.set(90);
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(ticker);

        // Let aborted tasks unwind, then drain what was already queued.
        tokio::time::sleep(Duration::from_millis(50)).await;
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_millis(FILL_TICK.as_millis() as u64 * 3)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn completed_tracker_stops_timers_on_its_own() {
        let clock = ManualClock::new();
        let shared = tracker(&clock);
        let (tx, _rx) = broadcast::channel(256);
        let ticker = ProgressTicker::start(shared.clone(), tx, "run-4".into());
        shared.lock().unwrap().complete();

        let finished = tokio::time::timeout(Duration::from_secs(5), async {
            while !ticker.is_finished() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(finished.is_ok());
    }
}
