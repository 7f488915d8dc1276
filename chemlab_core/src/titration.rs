//! Titration Animator
//!
//! A time-driven two-state machine (Idle / Titrating). The animator never
//! reads a clock; callers feed it timestamps through [`TitrationAnimator::advance`].
//!
//! # Cycle timeline
//!
//! ```text
//! begin(t0)            t0 + cycle            t0 + cycle + settle
//!   |---- Running -------->|---- Settling ---------->|  commit, Idle
//!   progress 0 ........... 1                         cumulative values updated
//! ```
//!
//! Cumulative volume and color intensity persist across cycles and only
//! reset with [`TitrationAnimator::reset`]. Cancelling discards the in-flight
//! cycle and keeps the last committed values.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants of the titration animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitrationConfig {
    /// Duration of one delivery cycle
    pub cycle_duration_ms: u64,
    /// Pause after progress reaches 1 before the cycle is committed
    pub settle_delay_ms: u64,
    /// Cadence of the visual drop emitter
    pub drop_interval_ms: u64,
    /// Titrant delivered per full cycle
    pub volume_per_cycle_ml: f64,
    /// Burette reading before the first cycle
    pub initial_volume_ml: f64,
    /// Eased progress at which the endpoint is considered identified
    pub endpoint_threshold: f64,
    pub ph_start: f64,
    pub ph_end: f64,
    /// Fraction of the titrant molarity lost to dilution over one cycle
    pub dilution_fraction: f64,
}

impl Default for TitrationConfig {
    fn default() -> Self {
        Self {
            cycle_duration_ms: 8000,
            settle_delay_ms: 1000,
            drop_interval_ms: 800,
            volume_per_cycle_ml: 20.0,
            initial_volume_ml: 5.0,
            endpoint_threshold: 0.3,
            ph_start: 6.5,
            ph_end: 9.3,
            dilution_fraction: 0.05,
        }
    }
}

impl TitrationConfig {
    pub fn cycle_duration(&self) -> Duration {
        Duration::from_millis(self.cycle_duration_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn drop_interval(&self) -> Duration {
        Duration::from_millis(self.drop_interval_ms)
    }

    /// Rejects values a frame loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drop_interval_ms == 0 {
            return Err(ConfigError::Invalid("drop_interval_ms must be positive".into()));
        }
        let volumes = [self.volume_per_cycle_ml, self.initial_volume_ml];
        if volumes.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid("volumes must be finite and non-negative".into()));
        }
        Ok(())
    }
}

/// Cubic ease-in-out on [0, 1].
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Values derived for one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TitrationFrame {
    /// Linear progress of the current cycle in [0, 1]
    pub progress: f64,
    /// Eased progress of the current cycle in [0, 1]
    pub eased: f64,
    /// Cumulative color intensity plus eased progress
    pub color_progress: f64,
    pub volume_ml: f64,
    pub ph: f64,
    pub molarity: f64,
    /// Eased progress has crossed the endpoint threshold
    pub endpoint_reached: bool,
}

/// Summary of a committed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// 1-based cycle number within the run
    pub cycle: u32,
    pub final_volume_ml: f64,
    pub delivered_ml: f64,
    pub color_intensity: f64,
    pub final_ph: f64,
    pub final_molarity: f64,
    pub over_titration: bool,
}

/// Result of advancing the animator to a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Nothing in flight.
    Idle,
    /// A running frame.
    Frame(TitrationFrame),
    /// Progress reached 1; waiting out the settle delay.
    Settling(TitrationFrame),
    /// The cycle closed and its values were committed.
    Completed(CycleRecord),
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Running { started_at: Duration },
    Settling { since: Duration, frame: TitrationFrame },
}

/// The titration state machine.
#[derive(Debug, Clone)]
pub struct TitrationAnimator {
    config: TitrationConfig,
    phase: Phase,
    cumulative_volume_ml: f64,
    cumulative_color_intensity: f64,
    /// Titrant molarity at the start of the current cycle
    base_molarity: f64,
    last_frame: Option<TitrationFrame>,
    cycles_completed: u32,
}

impl TitrationAnimator {
    pub fn new(config: TitrationConfig) -> Self {
        let cumulative_volume_ml = config.initial_volume_ml;
        Self {
            config,
            phase: Phase::Idle,
            cumulative_volume_ml,
            cumulative_color_intensity: 0.0,
            base_molarity: 0.0,
            last_frame: None,
            cycles_completed: 0,
        }
    }

    pub fn config(&self) -> &TitrationConfig {
        &self.config
    }

    pub fn is_titrating(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn is_settling(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    pub fn cumulative_volume_ml(&self) -> f64 {
        self.cumulative_volume_ml
    }

    pub fn cumulative_color_intensity(&self) -> f64 {
        self.cumulative_color_intensity
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Most recent frame of the in-flight cycle.
    pub fn last_frame(&self) -> Option<&TitrationFrame> {
        self.last_frame.as_ref()
    }

    /// Color progress to render right now.
    pub fn color_progress(&self) -> f64 {
        match (&self.phase, &self.last_frame) {
            (Phase::Idle, _) | (_, None) => self.cumulative_color_intensity,
            (_, Some(frame)) => frame.color_progress,
        }
    }

    /// Idle -> Titrating. Returns false (no state change) if already titrating.
    pub fn begin(&mut self, now: Duration, base_molarity: f64) -> bool {
        if self.is_titrating() {
            return false;
        }
        self.base_molarity = base_molarity;
        self.phase = Phase::Running { started_at: now };
        self.last_frame = Some(self.frame_at(0.0));
        true
    }

    /// Force Titrating -> Idle, discarding the in-flight cycle.
    ///
    /// Returns true if a cycle was in flight. Idempotent.
    pub fn cancel(&mut self) -> bool {
        let was = self.is_titrating();
        self.phase = Phase::Idle;
        self.last_frame = None;
        was
    }

    /// Back to the initial state of a fresh run.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Advances the animation to `now`.
    pub fn advance(&mut self, now: Duration) -> Advance {
        match self.phase.clone() {
            Phase::Idle => Advance::Idle,
            Phase::Running { started_at } => {
                let elapsed = now.saturating_sub(started_at).as_secs_f64();
                let cycle = self.config.cycle_duration().as_secs_f64();
                let progress = if cycle > 0.0 { (elapsed / cycle).min(1.0) } else { 1.0 };

                let frame = self.frame_at(progress);
                self.last_frame = Some(frame);

                if progress >= 1.0 {
                    self.phase = Phase::Settling { since: now, frame };
                }
                Advance::Frame(frame)
            }
            Phase::Settling { since, frame } => {
                if now.saturating_sub(since) < self.config.settle_delay() {
                    return Advance::Settling(frame);
                }
                Advance::Completed(self.commit(frame))
            }
        }
    }

    fn frame_at(&self, progress: f64) -> TitrationFrame {
        let progress = progress.clamp(0.0, 1.0);
        let eased = ease_in_out_cubic(progress);
        let c = &self.config;
        TitrationFrame {
            progress,
            eased,
            color_progress: self.cumulative_color_intensity + eased,
            volume_ml: self.cumulative_volume_ml + progress * c.volume_per_cycle_ml,
            ph: c.ph_start + (c.ph_end - c.ph_start) * progress,
            molarity: self.base_molarity * (1.0 - c.dilution_fraction * progress),
            endpoint_reached: eased >= c.endpoint_threshold,
        }
    }

    fn commit(&mut self, frame: TitrationFrame) -> CycleRecord {
        let delivered_ml = frame.volume_ml - self.cumulative_volume_ml;
        self.cumulative_volume_ml = frame.volume_ml;
        self.cumulative_color_intensity = frame.color_progress;
        self.cycles_completed += 1;
        self.phase = Phase::Idle;
        self.last_frame = None;

        CycleRecord {
            cycle: self.cycles_completed,
            final_volume_ml: frame.volume_ml,
            delivered_ml,
            color_intensity: self.cumulative_color_intensity,
            final_ph: frame.ph,
            final_molarity: frame.molarity,
            over_titration: self.cumulative_color_intensity > 1.0,
        }
    }
}

impl Default for TitrationAnimator {
    fn default() -> Self {
        Self::new(TitrationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Runs one full cycle starting at `t0`, returning the record.
    fn run_cycle(anim: &mut TitrationAnimator, t0: u64) -> CycleRecord {
        assert!(anim.begin(ms(t0), 0.1));
        let mut t = t0;
        loop {
            t += 16;
            if let Advance::Completed(record) = anim.advance(ms(t)) {
                return record;
            }
            assert!(t < t0 + 20_000, "cycle never completed");
        }
    }

    #[test]
    fn test_ease_in_out_cubic() {
        assert_relative_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_relative_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_relative_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_relative_eq!(ease_in_out_cubic(0.25), 0.0625);
        assert_relative_eq!(ease_in_out_cubic(0.75), 0.9375);
    }

    #[test]
    fn test_frame_values_mid_cycle() {
        let mut anim = TitrationAnimator::default();
        anim.begin(ms(0), 0.1);

        let Advance::Frame(frame) = anim.advance(ms(4000)) else {
            panic!("expected a running frame");
        };
        assert_relative_eq!(frame.progress, 0.5);
        assert_relative_eq!(frame.eased, 0.5);
        assert_relative_eq!(frame.volume_ml, 15.0);
        assert_relative_eq!(frame.ph, 7.9, epsilon = 1e-12);
        assert_relative_eq!(frame.molarity, 0.0975, epsilon = 1e-12);
        assert!(frame.endpoint_reached);
    }

    #[test]
    fn test_endpoint_threshold_on_eased_progress() {
        let mut anim = TitrationAnimator::default();
        anim.begin(ms(0), 0.1);

        // progress 0.25 -> eased 0.0625
        let Advance::Frame(early) = anim.advance(ms(2000)) else { panic!() };
        assert!(!early.endpoint_reached);

        // progress 0.45 -> eased 0.3645
        let Advance::Frame(later) = anim.advance(ms(3600)) else { panic!() };
        assert!(later.endpoint_reached);
    }

    #[test]
    fn test_settle_delay_before_commit() {
        let mut anim = TitrationAnimator::default();
        anim.begin(ms(0), 0.1);

        assert!(matches!(anim.advance(ms(8000)), Advance::Frame(_)));
        assert!(anim.is_settling());
        assert!(matches!(anim.advance(ms(8500)), Advance::Settling(_)));
        assert_relative_eq!(anim.cumulative_volume_ml(), 5.0);

        let Advance::Completed(record) = anim.advance(ms(9000)) else {
            panic!("expected commit after settle delay");
        };
        assert_eq!(record.cycle, 1);
        assert_relative_eq!(record.final_volume_ml, 25.0);
        assert_relative_eq!(record.delivered_ml, 20.0);
        assert!(!record.over_titration);
        assert!(!anim.is_titrating());
    }

    #[test]
    fn test_two_cycles_accumulate() {
        let mut anim = TitrationAnimator::default();
        let first = run_cycle(&mut anim, 0);
        let after_first = anim.cumulative_volume_ml();
        let second = run_cycle(&mut anim, 20_000);

        assert_relative_eq!(anim.cumulative_volume_ml(), after_first + 20.0, epsilon = 1e-9);
        assert!(anim.cumulative_color_intensity() > 1.0);
        assert!(!first.over_titration);
        assert!(second.over_titration);
        assert_eq!(anim.cycles_completed(), 2);
    }

    #[test]
    fn test_begin_while_titrating_is_noop() {
        let mut anim = TitrationAnimator::default();
        assert!(anim.begin(ms(0), 0.1));
        anim.advance(ms(4000));
        assert!(!anim.begin(ms(4000), 0.1));

        // still measured from the original start
        let Advance::Frame(frame) = anim.advance(ms(6000)) else { panic!() };
        assert_relative_eq!(frame.progress, 0.75);
        assert_relative_eq!(anim.cumulative_volume_ml(), 5.0);
        assert_relative_eq!(anim.cumulative_color_intensity(), 0.0);
    }

    #[test]
    fn test_cancel_keeps_committed_values() {
        let mut anim = TitrationAnimator::default();
        run_cycle(&mut anim, 0);

        anim.begin(ms(10_000), 0.1);
        anim.advance(ms(14_000));
        assert!(anim.cancel());
        assert!(!anim.cancel());

        assert_relative_eq!(anim.cumulative_volume_ml(), 25.0);
        assert_relative_eq!(anim.cumulative_color_intensity(), 1.0);
        assert_eq!(anim.advance(ms(30_000)), Advance::Idle);
        assert_relative_eq!(anim.color_progress(), 1.0);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut anim = TitrationAnimator::default();
        run_cycle(&mut anim, 0);
        run_cycle(&mut anim, 20_000);
        anim.reset();

        assert_relative_eq!(anim.cumulative_volume_ml(), 5.0);
        assert_relative_eq!(anim.cumulative_color_intensity(), 0.0);
        assert_eq!(anim.cycles_completed(), 0);
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: TitrationConfig = serde_json::from_str(r#"{ "cycle_duration_ms": 4000 }"#).unwrap();
        assert_eq!(config.cycle_duration_ms, 4000);
        assert_eq!(config.settle_delay_ms, 1000);
        assert_relative_eq!(config.volume_per_cycle_ml, 20.0);
    }
}
