//! Adapter for the external hand-landmark tracker.
//!
//! The tracker runs as a helper process that owns the camera and the
//! landmark model. After printing `READY` it emits one JSON line per camera
//! frame: detected hands (handedness, score, 21 landmarks) and an `exit`
//! flag raised when the operator presses the reserved key in the preview
//! window. Anything satisfying that contract is substitutable.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::Deserialize;

use crate::models::{Handedness, Landmark, TrackedHand, LANDMARK_COUNT};
use crate::services::recognition::{GestureSource, Observation, SourceError};

#[derive(Deserialize, Debug)]
struct WireLandmark {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Deserialize, Debug)]
struct WireHand {
    handedness: String,
    score: f32,
    landmarks: Vec<WireLandmark>,
}

#[derive(Deserialize, Debug)]
struct WireFrame {
    #[serde(default)]
    hands: Vec<WireHand>,
    #[serde(default)]
    exit: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Hand tracker backed by a helper subprocess.
///
/// Killing the child on drop is the guaranteed-release path for the camera,
/// which the helper owns; it runs on every loop exit, normal or not.
pub struct TrackerProcess {
    child: Child,
    reader: BufReader<ChildStdout>,
    confidence_threshold: f32,
}

impl TrackerProcess {
    /// Start the helper and wait for its `READY` handshake.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, SourceError> {
        tracing::info!("starting hand tracker: {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                SourceError::Unavailable(format!("failed to start tracker {program:?}: {err}"))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::Unavailable("tracker stdout missing".to_string()))?;
        let mut reader = BufReader::new(stdout);

        let mut ready = String::new();
        reader
            .read_line(&mut ready)
            .map_err(SourceError::FrameRead)?;
        if ready.trim() != "READY" {
            let _ = child.kill();
            return Err(SourceError::Unavailable(format!(
                "tracker did not signal ready, got {:?}",
                ready.trim()
            )));
        }

        tracing::info!("hand tracker ready");
        Ok(Self {
            child,
            reader,
            confidence_threshold: 0.5,
        })
    }

    /// Minimum detection score a hand needs to be passed on.
    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
    }

    fn convert(hand: WireHand) -> Option<TrackedHand> {
        if hand.landmarks.len() != LANDMARK_COUNT {
            tracing::warn!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                hand.landmarks.len()
            );
            return None;
        }

        let handedness = match hand.handedness.as_str() {
            "Left" => Handedness::Left,
            "Right" => Handedness::Right,
            other => {
                tracing::warn!("unknown handedness label {:?}", other);
                return None;
            }
        };

        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (slot, wire) in landmarks.iter_mut().zip(&hand.landmarks) {
            *slot = Landmark {
                x: wire.x,
                y: wire.y,
                z: wire.z,
            };
        }

        Some(TrackedHand {
            handedness,
            confidence: hand.score,
            landmarks,
        })
    }
}

impl GestureSource for TrackerProcess {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(SourceError::FrameRead)?;
        if read == 0 {
            // EOF: the helper closed its end, stream over
            return Ok(None);
        }

        let frame: WireFrame =
            serde_json::from_str(&line).map_err(SourceError::FrameDecode)?;

        if let Some(error) = frame.error {
            tracing::warn!("tracker reported: {}", error);
            return Ok(Some(Observation {
                hands: Vec::new(),
                exit_requested: frame.exit,
            }));
        }

        let threshold = self.confidence_threshold;
        let hands = frame
            .hands
            .into_iter()
            .filter(|hand| hand.score >= threshold)
            .filter_map(Self::convert)
            .collect();

        Ok(Some(Observation {
            hands,
            exit_requested: frame.exit,
        }))
    }
}

impl Drop for TrackerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        tracing::debug!("tracker process stopped");
    }
}
