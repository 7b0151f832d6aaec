//! Integration tests for the recognition pipeline
//!
//! These tests drive the full frame loop with a scripted gesture source and
//! a recording automation backend, verifying:
//! - Exactly-once dispatch per hold, gated by the cooldown
//! - Independent click and command cooldown windows
//! - Per-frame failures (unbound gestures, action errors) never stopping
//!   the loop
//! - Clean exit on operator request and error propagation on source failure

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gesto::models::hand::landmarks;
use gesto::models::{Handedness, Landmark, TrackedHand, LANDMARK_COUNT};
use gesto::services::{
    ActionError, AutomationCapability, GeometricClassifier, GestureSource, LoopError,
    Observation, PoseClassifier, SourceError,
};
use gesto::{BindingStore, CommandDispatcher, CommandSlot, GestureSymbol, RecognitionConfig, RecognitionLoop};

/// A hand whose landmarks do not matter because the classifier is scripted.
fn dummy_hand() -> TrackedHand {
    TrackedHand {
        handedness: Handedness::Right,
        confidence: 0.9,
        landmarks: [Landmark::default(); LANDMARK_COUNT],
    }
}

/// Yields one prepared observation per frame, then ends the stream.
struct ScriptedSource {
    frames: VecDeque<Result<Option<Observation>, SourceError>>,
    frame_delay: Duration,
}

impl ScriptedSource {
    fn new(frames: Vec<Result<Option<Observation>, SourceError>>) -> Self {
        Self {
            frames: frames.into(),
            frame_delay: Duration::ZERO,
        }
    }

    /// Frames each carrying one tracked hand.
    fn with_hands(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|_| {
                    Ok(Some(Observation {
                        hands: vec![dummy_hand()],
                        exit_requested: false,
                    }))
                })
                .collect(),
        )
    }

    fn paced(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }
}

impl GestureSource for ScriptedSource {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError> {
        if !self.frame_delay.is_zero() {
            std::thread::sleep(self.frame_delay);
        }
        self.frames.pop_front().unwrap_or(Ok(None))
    }
}

/// Replays a fixed symbol sequence, one entry per classified frame.
struct ScriptedClassifier {
    symbols: VecDeque<Option<GestureSymbol>>,
}

impl ScriptedClassifier {
    fn new(symbols: Vec<Option<GestureSymbol>>) -> Self {
        Self {
            symbols: symbols.into(),
        }
    }
}

impl PoseClassifier for ScriptedClassifier {
    fn classify(&mut self, _hand: &TrackedHand) -> Option<GestureSymbol> {
        self.symbols.pop_front().flatten()
    }
}

/// Records every invocation; optionally fails them all.
#[derive(Clone)]
struct RecordingAutomation {
    invoked: Arc<Mutex<Vec<CommandSlot>>>,
    fail: bool,
}

impl RecordingAutomation {
    fn new() -> (Self, Arc<Mutex<Vec<CommandSlot>>>) {
        let invoked = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                invoked: invoked.clone(),
                fail: false,
            },
            invoked,
        )
    }

    fn failing() -> (Self, Arc<Mutex<Vec<CommandSlot>>>) {
        let (mut automation, invoked) = Self::new();
        automation.fail = true;
        (automation, invoked)
    }
}

impl AutomationCapability for RecordingAutomation {
    fn invoke(&mut self, slot: CommandSlot) -> Result<(), ActionError> {
        self.invoked.lock().unwrap().push(slot);
        if self.fail {
            Err(ActionError::Unsupported(slot))
        } else {
            Ok(())
        }
    }
}

/// Immediate confirmation (two frames of the same symbol), no cooldown.
fn instant_config() -> RecognitionConfig {
    RecognitionConfig {
        hold_threshold: Duration::ZERO,
        command_cooldown: Duration::ZERO,
        click_cooldown: Duration::ZERO,
    }
}

fn store_with(bindings: &[(GestureSymbol, CommandSlot)]) -> BindingStore {
    let mut store = BindingStore::new();
    for (symbol, slot) in bindings {
        store.bind(*symbol, *slot).unwrap();
    }
    store
}

#[test]
fn test_held_gesture_dispatches_exactly_once() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::OpenPalm, CommandSlot::LockScreen)]),
        Box::new(automation),
    );

    let symbols = vec![Some(GestureSymbol::OpenPalm); 20];
    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(20),
        ScriptedClassifier::new(symbols),
        dispatcher,
        instant_config(),
    );

    let summary = recognition.run().unwrap();

    assert_eq!(summary.frames, 20);
    assert_eq!(summary.dispatched, 1);
    assert_eq!(*invoked.lock().unwrap(), vec![CommandSlot::LockScreen]);
}

#[test]
fn test_alternating_unknown_never_confirms() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::ClosedFist, CommandSlot::Screenshot)]),
        Box::new(automation),
    );

    // unknown, fist, unknown, fist... the timer never spans two frames
    let symbols: Vec<_> = (0..40)
        .map(|i| {
            if i % 2 == 0 {
                None
            } else {
                Some(GestureSymbol::ClosedFist)
            }
        })
        .collect();

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(40),
        ScriptedClassifier::new(symbols),
        dispatcher,
        instant_config(),
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 0);
    assert!(invoked.lock().unwrap().is_empty());
}

#[test]
fn test_cooldown_drops_second_hold() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::Peace, CommandSlot::Copy)]),
        Box::new(automation),
    );

    // Two separate holds of the same gesture, well inside one cooldown window
    let mut symbols = vec![Some(GestureSymbol::Peace); 5];
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::Peace); 5]);

    let config = RecognitionConfig {
        hold_threshold: Duration::ZERO,
        command_cooldown: Duration::from_secs(3600),
        click_cooldown: Duration::ZERO,
    };

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(11),
        ScriptedClassifier::new(symbols),
        dispatcher,
        config,
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(*invoked.lock().unwrap(), vec![CommandSlot::Copy]);
}

#[test]
fn test_cooldown_elapsed_allows_second_dispatch() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::Peace, CommandSlot::Copy)]),
        Box::new(automation),
    );

    // Two holds of the same gesture; frames are paced so the second hold
    // confirms only after the 30ms command cooldown has expired
    let mut symbols = vec![Some(GestureSymbol::Peace); 3];
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::Peace); 3]);

    let config = RecognitionConfig {
        hold_threshold: Duration::ZERO,
        command_cooldown: Duration::from_millis(30),
        click_cooldown: Duration::ZERO,
    };

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(7).paced(Duration::from_millis(10)),
        ScriptedClassifier::new(symbols),
        dispatcher,
        config,
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 2);
    assert_eq!(
        *invoked.lock().unwrap(),
        vec![CommandSlot::Copy, CommandSlot::Copy]
    );
}

#[test]
fn test_continued_hold_dispatches_once_gate_opens() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[
            (GestureSymbol::Peace, CommandSlot::Copy),
            (GestureSymbol::ThumbsUp, CommandSlot::Mute),
        ]),
        Box::new(automation),
    );

    // Copy consumes the command gate; ThumbsUp is then held continuously.
    // Its early confirmations find the gate closed and are dropped, but the
    // hold keeps re-confirming and must fire exactly once when the gate
    // reopens
    let mut symbols = vec![Some(GestureSymbol::Peace); 2];
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::ThumbsUp); 10]);

    let config = RecognitionConfig {
        hold_threshold: Duration::ZERO,
        command_cooldown: Duration::from_millis(50),
        click_cooldown: Duration::ZERO,
    };

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(13).paced(Duration::from_millis(10)),
        ScriptedClassifier::new(symbols),
        dispatcher,
        config,
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 2);
    assert_eq!(
        *invoked.lock().unwrap(),
        vec![CommandSlot::Copy, CommandSlot::Mute]
    );
}

#[test]
fn test_click_cooldown_is_independent() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[
            (GestureSymbol::Peace, CommandSlot::Copy),
            (GestureSymbol::Pinch, CommandSlot::LeftClick),
        ]),
        Box::new(automation),
    );

    // Copy once, then two separate click holds; the long command cooldown
    // must not throttle the clicks
    let mut symbols = vec![Some(GestureSymbol::Peace); 3];
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::Pinch); 3]);
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::Pinch); 3]);

    let config = RecognitionConfig {
        hold_threshold: Duration::ZERO,
        command_cooldown: Duration::from_secs(3600),
        click_cooldown: Duration::ZERO,
    };

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(symbols.len()),
        ScriptedClassifier::new(symbols),
        dispatcher,
        config,
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 3);
    assert_eq!(
        *invoked.lock().unwrap(),
        vec![
            CommandSlot::Copy,
            CommandSlot::LeftClick,
            CommandSlot::LeftClick
        ]
    );
}

#[test]
fn test_unbound_gesture_is_skipped_and_loop_continues() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::ThumbsUp, CommandSlot::Mute)]),
        Box::new(automation),
    );

    // Peace has no binding; ThumbsUp afterwards must still dispatch
    let mut symbols = vec![Some(GestureSymbol::Peace); 4];
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::ThumbsUp); 4]);

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(9),
        ScriptedClassifier::new(symbols),
        dispatcher,
        instant_config(),
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(*invoked.lock().unwrap(), vec![CommandSlot::Mute]);
}

#[test]
fn test_action_failure_does_not_stop_the_loop() {
    let (automation, invoked) = RecordingAutomation::failing();
    let dispatcher = CommandDispatcher::new(
        store_with(&[
            (GestureSymbol::Peace, CommandSlot::Copy),
            (GestureSymbol::Pinch, CommandSlot::Paste),
        ]),
        Box::new(automation),
    );

    let mut symbols = vec![Some(GestureSymbol::Peace); 3];
    symbols.push(None);
    symbols.extend(vec![Some(GestureSymbol::Pinch); 3]);

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(7),
        ScriptedClassifier::new(symbols),
        dispatcher,
        instant_config(),
    );

    let summary = recognition.run().unwrap();

    // Both actions were attempted and failed; the loop survived both
    assert_eq!(summary.frames, 7);
    assert_eq!(summary.dispatched, 0);
    assert_eq!(
        *invoked.lock().unwrap(),
        vec![CommandSlot::Copy, CommandSlot::Paste]
    );
}

#[test]
fn test_exit_request_stops_the_loop() {
    let (automation, _invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(BindingStore::new(), Box::new(automation));

    let frames = vec![
        Ok(Some(Observation {
            hands: vec![dummy_hand()],
            exit_requested: false,
        })),
        Ok(Some(Observation {
            hands: Vec::new(),
            exit_requested: true,
        })),
        // Never reached
        Ok(Some(Observation {
            hands: vec![dummy_hand()],
            exit_requested: false,
        })),
    ];

    let recognition = RecognitionLoop::new(
        ScriptedSource::new(frames),
        ScriptedClassifier::new(vec![None; 3]),
        dispatcher,
        instant_config(),
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.frames, 2);
}

#[test]
fn test_source_failure_terminates_with_error() {
    let (automation, _invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(BindingStore::new(), Box::new(automation));

    let frames = vec![
        Ok(Some(Observation::default())),
        Err(SourceError::FrameRead(std::io::Error::other("camera gone"))),
    ];

    let recognition = RecognitionLoop::new(
        ScriptedSource::new(frames),
        ScriptedClassifier::new(vec![None; 2]),
        dispatcher,
        instant_config(),
    );

    assert!(matches!(
        recognition.run(),
        Err(LoopError::Source(SourceError::FrameRead(_)))
    ));
}

#[test]
fn test_real_clock_hold_confirms_after_threshold() {
    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::OpenPalm, CommandSlot::LockScreen)]),
        Box::new(automation),
    );

    // 30 frames 5ms apart with a 50ms hold: confirmation lands mid-run and
    // must happen exactly once
    let config = RecognitionConfig {
        hold_threshold: Duration::from_millis(50),
        command_cooldown: Duration::from_secs(3600),
        click_cooldown: Duration::ZERO,
    };

    let recognition = RecognitionLoop::new(
        ScriptedSource::with_hands(30).paced(Duration::from_millis(5)),
        ScriptedClassifier::new(vec![Some(GestureSymbol::OpenPalm); 30]),
        dispatcher,
        config,
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(*invoked.lock().unwrap(), vec![CommandSlot::LockScreen]);
}

/// End-to-end through the geometric classifier: synthesized open-palm
/// landmarks drive the bound command.
#[test]
fn test_geometric_classifier_end_to_end() {
    fn open_palm_hand() -> TrackedHand {
        let mut lm = [Landmark::default(); LANDMARK_COUNT];
        lm[landmarks::WRIST] = Landmark { x: 0.5, y: 0.9, z: 0.0 };
        lm[landmarks::MIDDLE_FINGER_MCP] = Landmark { x: 0.5, y: 0.7, z: 0.0 };

        // Thumb raised: tip beyond the IP joint toward smaller x (right hand)
        lm[landmarks::THUMB_IP] = Landmark { x: 0.40, y: 0.75, z: 0.0 };
        lm[landmarks::THUMB_TIP] = Landmark { x: 0.30, y: 0.72, z: 0.0 };

        // All four fingers raised: tips above their PIP joints
        for (pip, tip, x) in [
            (landmarks::INDEX_FINGER_PIP, landmarks::INDEX_FINGER_TIP, 0.55),
            (landmarks::MIDDLE_FINGER_PIP, landmarks::MIDDLE_FINGER_TIP, 0.50),
            (landmarks::RING_FINGER_PIP, landmarks::RING_FINGER_TIP, 0.45),
            (landmarks::PINKY_PIP, landmarks::PINKY_TIP, 0.40),
        ] {
            lm[pip] = Landmark { x, y: 0.6, z: 0.0 };
            lm[tip] = Landmark { x, y: 0.35, z: 0.0 };
        }

        TrackedHand {
            handedness: Handedness::Right,
            confidence: 0.95,
            landmarks: lm,
        }
    }

    let (automation, invoked) = RecordingAutomation::new();
    let dispatcher = CommandDispatcher::new(
        store_with(&[(GestureSymbol::OpenPalm, CommandSlot::LockScreen)]),
        Box::new(automation),
    );

    let frames = (0..5)
        .map(|_| {
            Ok(Some(Observation {
                hands: vec![open_palm_hand()],
                exit_requested: false,
            }))
        })
        .collect();

    let recognition = RecognitionLoop::new(
        ScriptedSource::new(frames),
        GeometricClassifier::new(),
        dispatcher,
        instant_config(),
    );

    let summary = recognition.run().unwrap();
    assert_eq!(summary.dispatched, 1);
    assert_eq!(*invoked.lock().unwrap(), vec![CommandSlot::LockScreen]);
}
