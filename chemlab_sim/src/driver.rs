//! Async titration driver.
//!
//! Runs one titration cycle as a background task: a frame loop that feeds
//! the lab context timestamps, plus drop-timer ticks on the configured
//! cadence. The lab sits behind a `tokio::sync::Mutex` that is never held
//! across an await.
//!
//! ```text
//!  TitrationTask::start ──► StartTitration ──► ticket
//!          │
//!          └─ spawn ─► loop { sleep(frame) ; lock ; DropTimer* ; TitrationFrame }
//!                          │                                   │
//!                  cancel flag set ──► Cancelled      CycleCompleted ──► Completed
//! ```
//!
//! Cancellation is guarded twice: the task checks a `watch` flag before
//! every frame, and [`TitrationHandle::cancel`] stops the titration inside
//! the lab, which makes the task's ticket stale. Any frame that races the
//! cancel is then a no-op.

use chemlab_core::{CycleRecord, DispatchOutcome, Lab, LabEvent, LabWarning, TitrationTicket};
use chemlab_env::{EnvError, LabContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::{debug, info};

/// Highest frame rate the driver honours.
pub const MAX_FRAME_RATE_HZ: f64 = 1000.0;

/// Lab shared between the driver task and its callers.
pub type SharedLab = Arc<Mutex<Lab>>;

/// How a titration task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The cycle ran to completion and was committed.
    Completed(CycleRecord),
    /// Stopped before the cycle closed; nothing from it was committed.
    Cancelled,
    /// The start was refused. `None` means a cycle was already in flight.
    Refused(Option<LabWarning>),
}

/// Spawns titration cycles onto a [`LabContext`].
pub struct TitrationTask;

impl TitrationTask {
    /// Starts a titration on `lab` and drives it in the background.
    ///
    /// A refused start still returns a handle whose outcome is ready.
    pub async fn start<C: LabContext>(ctx: Arc<C>, lab: SharedLab, frame_rate_hz: f64) -> TitrationHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let (outcome, drop_interval) = {
            let mut guard = lab.lock().await;
            let interval = guard.animator().config().drop_interval();
            (guard.dispatch(LabEvent::StartTitration, ctx.now()), interval)
        };

        let ticket = match outcome {
            DispatchOutcome::Started(ticket) => ticket,
            DispatchOutcome::Refused(warning) => {
                let _ = outcome_tx.send(TaskOutcome::Refused(Some(warning)));
                return TitrationHandle::new(None, lab, cancel_tx, outcome_rx);
            }
            _ => {
                let _ = outcome_tx.send(TaskOutcome::Refused(None));
                return TitrationHandle::new(None, lab, cancel_tx, outcome_rx);
            }
        };

        let frame_interval = frame_interval(frame_rate_hz);
        let task_ctx = Arc::clone(&ctx);
        let task_lab = Arc::clone(&lab);

        ctx.spawn("titration", async move {
            let outcome = run_cycle(task_ctx, task_lab, ticket, cancel_rx, frame_interval, drop_interval).await;
            let _ = outcome_tx.send(outcome);
        });

        TitrationHandle::new(Some(ticket), lab, cancel_tx, outcome_rx)
    }
}

/// Frame period for a rate clamped to `[1, MAX_FRAME_RATE_HZ]`.
///
/// A zero period would never move a virtual clock.
fn frame_interval(frame_rate_hz: f64) -> Duration {
    let hz = if frame_rate_hz.is_finite() {
        frame_rate_hz.clamp(1.0, MAX_FRAME_RATE_HZ)
    } else {
        MAX_FRAME_RATE_HZ
    };
    Duration::from_secs_f64(1.0 / hz)
}

async fn run_cycle<C: LabContext>(
    ctx: Arc<C>,
    lab: SharedLab,
    ticket: TitrationTicket,
    cancel_rx: watch::Receiver<bool>,
    frame_interval: Duration,
    drop_interval: Duration,
) -> TaskOutcome {
    let mut next_drop = ctx.now() + drop_interval;

    loop {
        ctx.sleep(frame_interval).await;
        if *cancel_rx.borrow() {
            debug!(generation = ticket.generation(), "titration task observed cancel");
            return TaskOutcome::Cancelled;
        }

        let now = ctx.now();
        let mut guard = lab.lock().await;

        // zero interval: no drop emitter
        while !drop_interval.is_zero() && now >= next_drop {
            guard.dispatch(LabEvent::DropTimer { ticket }, now);
            next_drop += drop_interval;
        }

        match guard.dispatch(LabEvent::TitrationFrame { ticket }, now) {
            DispatchOutcome::CycleCompleted(record) => {
                info!(cycle = record.cycle, volume_ml = record.final_volume_ml, "titration task completed");
                return TaskOutcome::Completed(record);
            }
            // stopped or reset from outside the handle
            DispatchOutcome::Ignored => return TaskOutcome::Cancelled,
            _ => {}
        }
    }
}

/// Handle to a running titration task.
pub struct TitrationHandle {
    ticket: Option<TitrationTicket>,
    lab: SharedLab,
    cancel_tx: watch::Sender<bool>,
    outcome_rx: oneshot::Receiver<TaskOutcome>,
}

impl TitrationHandle {
    fn new(
        ticket: Option<TitrationTicket>,
        lab: SharedLab,
        cancel_tx: watch::Sender<bool>,
        outcome_rx: oneshot::Receiver<TaskOutcome>,
    ) -> Self {
        Self { ticket, lab, cancel_tx, outcome_rx }
    }

    /// Ticket of the started cycle; `None` if the start was refused.
    pub fn ticket(&self) -> Option<TitrationTicket> {
        self.ticket
    }

    /// Stops the cycle. Idempotent.
    ///
    /// Once this returns, the task makes no further change to the lab.
    pub async fn cancel(&self) {
        if self.cancel_tx.send_replace(true) {
            return;
        }
        let Some(ticket) = self.ticket else {
            return;
        };

        let mut lab = self.lab.lock().await;
        // a later cycle started elsewhere is not ours to stop
        if lab.current_ticket() == Some(ticket) {
            lab.stop_titration();
        }
    }

    /// Waits for the task to finish.
    pub async fn finished(self) -> Result<TaskOutcome, EnvError> {
        self.outcome_rx.await.map_err(|_| EnvError::dropped("titration"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use chemlab_core::chemicals::{HCL, NAOH, PHENOLPHTHALEIN};
    use chemlab_core::equipment::{BURETTE, CONICAL_FLASK};
    use chemlab_core::LabConfig;
    use chemlab_env::RunId;

    fn ready_lab() -> SharedLab {
        ready_lab_with(LabConfig::default())
    }

    fn ready_lab_with(config: LabConfig) -> SharedLab {
        let mut lab = Lab::new(config, RunId::from_seed(3));
        lab.place_equipment(BURETTE, 0.0, 0.0);
        lab.place_equipment(CONICAL_FLASK, 0.0, 100.0);
        lab.drop_chemical(NAOH, BURETTE, Some(50.0));
        lab.drop_chemical(HCL, CONICAL_FLASK, Some(25.0));
        lab.drop_chemical(PHENOLPHTHALEIN, CONICAL_FLASK, Some(1.0));
        Arc::new(Mutex::new(lab))
    }

    #[tokio::test]
    async fn test_task_runs_cycle_to_completion() {
        let ctx = SimContext::shared(1);
        let lab = ready_lab();

        let handle = TitrationTask::start(ctx.clone(), lab.clone(), 60.0).await;
        assert!(handle.ticket().is_some());

        let TaskOutcome::Completed(record) = handle.finished().await.unwrap() else {
            panic!("expected a completed cycle");
        };
        assert!((record.final_volume_ml - 25.0).abs() < 1e-9);

        let lab = lab.lock().await;
        assert!(!lab.is_titrating());
        assert!(lab.drops_emitted() >= 9);
        assert!(ctx.now() >= Duration::from_secs(9));
    }

    #[test]
    fn test_frame_interval_is_clamped() {
        assert_eq!(frame_interval(1e10), Duration::from_millis(1));
        assert_eq!(frame_interval(f64::INFINITY), Duration::from_millis(1));
        assert_eq!(frame_interval(f64::NAN), Duration::from_millis(1));
        assert_eq!(frame_interval(0.0), Duration::from_secs(1));
        assert_eq!(frame_interval(50.0), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_huge_frame_rate_still_completes() {
        let ctx = SimContext::shared(8);
        let lab = ready_lab();

        let handle = TitrationTask::start(ctx.clone(), lab, 1e10).await;
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle.finished()).await;
        assert!(matches!(outcome, Ok(Ok(TaskOutcome::Completed(_)))));
        assert!(ctx.now() >= Duration::from_secs(9));
    }

    #[tokio::test]
    async fn test_zero_drop_interval_emits_no_drops() {
        let ctx = SimContext::shared(9);
        let mut config = LabConfig::default();
        config.titration.drop_interval_ms = 0;
        let lab = ready_lab_with(config);

        let handle = TitrationTask::start(ctx, lab.clone(), 60.0).await;
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle.finished()).await;
        assert!(matches!(outcome, Ok(Ok(TaskOutcome::Completed(_)))));
        assert_eq!(lab.lock().await.drops_emitted(), 0);
    }

    #[tokio::test]
    async fn test_refused_start_reports_warning() {
        let ctx = SimContext::shared(2);
        let lab = Arc::new(Mutex::new(Lab::new(LabConfig::default(), RunId::from_seed(2))));

        let handle = TitrationTask::start(ctx, lab, 60.0).await;
        assert!(handle.ticket().is_none());
        assert_eq!(
            handle.finished().await.unwrap(),
            TaskOutcome::Refused(Some(LabWarning::MissingApparatus))
        );
    }

    #[tokio::test]
    async fn test_cancel_mid_cycle_commits_nothing() {
        let ctx = SimContext::shared(4);
        let lab = ready_lab();

        let handle = TitrationTask::start(ctx.clone(), lab.clone(), 60.0).await;
        while ctx.now() < Duration::from_secs(3) {
            tokio::task::yield_now().await;
        }

        handle.cancel().await;
        handle.cancel().await;

        let drops_at_cancel = lab.lock().await.drops_emitted();
        assert_eq!(handle.finished().await.unwrap(), TaskOutcome::Cancelled);

        let lab = lab.lock().await;
        assert!(!lab.is_titrating());
        assert_eq!(lab.cumulative_volume_ml(), 5.0);
        assert_eq!(lab.cumulative_color_intensity(), 0.0);
        assert_eq!(lab.drops_emitted(), drops_at_cancel);
        assert!(lab.results().is_empty());
    }

    #[tokio::test]
    async fn test_second_start_while_running_is_refused() {
        let ctx = SimContext::shared(5);
        let lab = ready_lab();

        let first = TitrationTask::start(ctx.clone(), lab.clone(), 60.0).await;
        let second = TitrationTask::start(ctx.clone(), lab.clone(), 60.0).await;
        assert_eq!(second.finished().await.unwrap(), TaskOutcome::Refused(None));

        assert!(matches!(first.finished().await.unwrap(), TaskOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_reset_ends_task() {
        let ctx = SimContext::shared(6);
        let lab = ready_lab();

        let handle = TitrationTask::start(ctx.clone(), lab.clone(), 60.0).await;
        while ctx.now() < Duration::from_secs(1) {
            tokio::task::yield_now().await;
        }
        lab.lock().await.reset_experiment();

        assert_eq!(handle.finished().await.unwrap(), TaskOutcome::Cancelled);
        assert_eq!(lab.lock().await.cumulative_volume_ml(), 5.0);
    }
}
