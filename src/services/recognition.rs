//! The per-frame recognition pipeline: hold/debounce tracking, cooldown
//! gating, and the frame loop that wires tracker output to command dispatch.
//!
//! The loop is single-threaded and frame-synchronous. Frame n+1 is never
//! started before frame n's dispatch decision is finalized, so dispatch
//! attempts are strictly totally ordered. All per-frame failures are logged
//! and swallowed; only source failures terminate the loop.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::metrics::FrameMetrics;
use crate::models::{CommandSlot, GestureSymbol, Handedness, TrackedHand};
use crate::services::classifier::PoseClassifier;
use crate::services::dispatch::CommandDispatcher;

/// How long the same symbol must be observed before it confirms.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(1500);

/// Minimum spacing between two dispatched commands.
pub const COMMAND_COOLDOWN: Duration = Duration::from_secs(3);

/// Minimum spacing between two dispatched pointer clicks. Clicks repeat much
/// faster than ordinary commands, so they get their own, shorter window.
pub const CLICK_COOLDOWN: Duration = Duration::from_millis(800);

/// Emit a periodic metrics line every this many frames.
const PERIODIC_LOG_INTERVAL: u64 = 300;

/// Tunable thresholds for the recognition loop.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    pub hold_threshold: Duration,
    pub command_cooldown: Duration,
    pub click_cooldown: Duration,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            hold_threshold: HOLD_THRESHOLD,
            command_cooldown: COMMAND_COOLDOWN,
            click_cooldown: CLICK_COOLDOWN,
        }
    }
}

/// Everything the tracker reports for one camera frame.
#[derive(Debug, Clone, Default)]
pub struct Observation {
    pub hands: Vec<TrackedHand>,
    /// Raised when the operator pressed the reserved exit key in the preview.
    pub exit_requested: bool,
}

/// Errors from the frame source. All of these are fatal to the loop.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("tracker unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read a frame from the tracker")]
    FrameRead(#[source] std::io::Error),

    #[error("tracker sent an unreadable frame")]
    FrameDecode(#[source] serde_json::Error),
}

/// Per-frame supplier of tracked hands.
///
/// `Ok(None)` means the stream ended cleanly (camera closed, helper exited);
/// errors mean the source broke mid-stream.
pub trait GestureSource {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError>;
}

#[derive(Debug, Clone, Copy)]
enum HoldState {
    Idle,
    Candidate {
        symbol: GestureSymbol,
        since: Instant,
        confirmed: bool,
    },
}

/// Tracks how long the same symbol has been continuously observed and emits
/// a one-shot confirmation when the hold threshold is crossed.
///
/// Purely time-and-input-driven: every transition is a function of the
/// observed symbol and the caller-supplied clock, nothing else.
#[derive(Debug)]
pub struct HoldTracker {
    threshold: Duration,
    state: HoldState,
}

impl HoldTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            state: HoldState::Idle,
        }
    }

    /// Feed one frame's classification result.
    ///
    /// Returns the confirmed symbol exactly once per candidate epoch: on the
    /// first frame where the hold duration reaches the threshold. The state
    /// stays `Candidate` with the timer running; a different symbol (or the
    /// unknown sentinel) restarts the timer.
    pub fn advance(
        &mut self,
        observed: Option<GestureSymbol>,
        now: Instant,
    ) -> Option<GestureSymbol> {
        let Some(s) = observed else {
            self.state = HoldState::Idle;
            return None;
        };

        match self.state {
            HoldState::Idle => {
                self.state = HoldState::Candidate {
                    symbol: s,
                    since: now,
                    confirmed: false,
                };
                None
            }
            HoldState::Candidate {
                symbol,
                since,
                confirmed,
            } if symbol == s => {
                if !confirmed && now.duration_since(since) >= self.threshold {
                    self.state = HoldState::Candidate {
                        symbol,
                        since,
                        confirmed: true,
                    };
                    Some(s)
                } else {
                    None
                }
            }
            HoldState::Candidate { .. } => {
                self.state = HoldState::Candidate {
                    symbol: s,
                    since: now,
                    confirmed: false,
                };
                None
            }
        }
    }

    /// Allow the current candidate to confirm again.
    ///
    /// Called when a confirmation was dropped by a closed cooldown gate, so
    /// the operator can keep holding until the gate opens.
    pub fn rearm(&mut self) {
        if let HoldState::Candidate { confirmed, .. } = &mut self.state {
            *confirmed = false;
        }
    }

    /// The symbol currently being held, if any.
    pub fn candidate(&self) -> Option<GestureSymbol> {
        match self.state {
            HoldState::Candidate { symbol, .. } => Some(symbol),
            HoldState::Idle => None,
        }
    }
}

/// Rate limiter holding the timestamp of the last consumed dispatch.
#[derive(Debug)]
pub struct CooldownGate {
    threshold: Duration,
    last: Option<Instant>,
}

impl CooldownGate {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last: None,
        }
    }

    /// Returns true and records `now` iff the cooldown window has elapsed.
    /// The first consumption always succeeds.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.threshold => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Runtime state owned by the frame loop. Never shared across frames except
/// through these fields; there is no ambient state anywhere else.
#[derive(Debug)]
pub struct RecognitionState {
    pub hold: HoldTracker,
    command_gate: CooldownGate,
    click_gate: CooldownGate,
}

impl RecognitionState {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            hold: HoldTracker::new(config.hold_threshold),
            command_gate: CooldownGate::new(config.command_cooldown),
            click_gate: CooldownGate::new(config.click_cooldown),
        }
    }

    /// Pointer clicks run on their own, shorter cooldown.
    fn gate_for(&mut self, slot: CommandSlot) -> &mut CooldownGate {
        match slot {
            CommandSlot::LeftClick | CommandSlot::RightClick => &mut self.click_gate,
            _ => &mut self.command_gate,
        }
    }
}

/// Fatal loop failures. Per-frame classification and dispatch problems are
/// logged and swallowed instead.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("recognition source failed")]
    Source(#[from] SourceError),
}

/// Totals reported when the loop exits cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub dispatched: u64,
}

/// The frame-synchronous recognition loop.
pub struct RecognitionLoop<S, C> {
    source: S,
    classifier: C,
    dispatcher: CommandDispatcher,
    state: RecognitionState,
    metrics: FrameMetrics,
}

impl<S: GestureSource, C: PoseClassifier> RecognitionLoop<S, C> {
    pub fn new(
        source: S,
        classifier: C,
        dispatcher: CommandDispatcher,
        config: RecognitionConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            dispatcher,
            state: RecognitionState::new(&config),
            metrics: FrameMetrics::new(),
        }
    }

    /// Run until the source ends, the operator requests exit, or the source
    /// fails. The source is dropped (and with it the camera released) on
    /// every exit path.
    pub fn run(mut self) -> Result<LoopSummary, LoopError> {
        tracing::info!(
            "recognition loop started with {} bindings",
            self.dispatcher.bindings().len()
        );

        loop {
            let observation = match self.source.next_observation() {
                Ok(Some(observation)) => observation,
                Ok(None) => {
                    tracing::info!("tracker stream ended");
                    break;
                }
                Err(err) => {
                    tracing::error!("fatal source failure: {}", err);
                    self.metrics.log_summary();
                    return Err(err.into());
                }
            };

            self.metrics.record_frame();
            if self.metrics.frames() % PERIODIC_LOG_INTERVAL == 0 {
                self.metrics.log_periodic();
            }

            let now = Instant::now();
            let symbol = match Self::primary_hand(&observation) {
                Some(hand) => {
                    self.metrics.record_hand();
                    self.classifier.classify(hand)
                }
                None => None,
            };
            if symbol.is_some() {
                self.metrics.record_classified();
            }

            if let Some(confirmed) = self.state.hold.advance(symbol, now) {
                self.metrics.record_hold_confirmed();
                self.handle_confirmed(confirmed, now);
            }

            if observation.exit_requested {
                tracing::info!("exit requested by operator");
                break;
            }
        }

        self.metrics.log_summary();
        Ok(LoopSummary {
            frames: self.metrics.frames(),
            dispatched: self.metrics.dispatched(),
        })
    }

    /// The hand the loop acts on: the right hand when tracked (the original
    /// pointer-control convention), otherwise the first reported.
    fn primary_hand(observation: &Observation) -> Option<&TrackedHand> {
        observation
            .hands
            .iter()
            .find(|hand| hand.handedness == Handedness::Right)
            .or_else(|| observation.hands.first())
    }

    fn handle_confirmed(&mut self, symbol: GestureSymbol, now: Instant) {
        // Resolve first so the right cooldown gate is consulted.
        let Some(slot) = self.dispatcher.resolve(symbol) else {
            self.metrics.record_unbound();
            tracing::debug!("confirmed {} has no bound command", symbol);
            return;
        };

        if !self.state.gate_for(slot).try_consume(now) {
            // Dropped, not queued. Re-arm so a later frame of the same hold
            // can confirm once the gate opens.
            self.metrics.record_gated();
            self.state.hold.rearm();
            return;
        }

        match self.dispatcher.invoke(slot) {
            Ok(()) => {
                self.metrics.record_dispatched();
                tracing::info!("dispatched {} for {}", slot, symbol);
            }
            Err(err) => {
                self.metrics.record_dispatch_failure();
                tracing::warn!("dispatch failed: {}", err);
            }
        }
    }
}
