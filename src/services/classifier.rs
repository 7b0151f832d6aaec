//! Pose classification from tracked hand landmarks.
//!
//! Two interchangeable classifiers feed the recognition loop:
//! [`GeometricClassifier`] derives a symbol from finger up/down flags with a
//! fixed, auditable decision list, and [`LearnedClassifier`] adapts an
//! external image model behind the [`HandModel`] boundary. Both report the
//! "unknown" sentinel as `None`.

use thiserror::Error;

use crate::models::hand::landmarks::*;
use crate::models::{GestureSymbol, HandRegion, Handedness, TrackedHand};

/// Turns one tracked hand into a gesture symbol, or `None` for "unknown".
pub trait PoseClassifier {
    fn classify(&mut self, hand: &TrackedHand) -> Option<GestureSymbol>;
}

/// Per-finger raised/curled flags derived from landmark geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FingerFlags {
    thumb: bool,
    index: bool,
    middle: bool,
    ring: bool,
    pinky: bool,
}

impl FingerFlags {
    fn raised_count(self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|up| **up)
            .count()
    }
}

/// Rule-based classifier over landmark geometry.
///
/// No learned parameters; the decision list below is checked top to bottom
/// and must keep its order to stay behaviorally stable:
///
/// 1. all five fingers raised -> open palm
/// 2. all five curled -> closed fist
/// 3. exact flag patterns -> thumbs up, peace, call me, three fingers, pinch
/// 4. index only -> directional pose from the tip's displacement off the wrist
/// 5. four or more raised with the middle MCP above the wrist -> palm down
/// 6. anything else -> unknown
///
/// Combinations not listed deliberately fall through to unknown.
#[derive(Debug, Default)]
pub struct GeometricClassifier;

impl GeometricClassifier {
    pub fn new() -> Self {
        Self
    }

    fn finger_flags(hand: &TrackedHand) -> FingerFlags {
        let lm = &hand.landmarks;

        // Non-thumb fingers are raised when the tip sits above its PIP joint
        // (smaller y in image coordinates). The thumb extends sideways, so it
        // compares x against its IP joint, mirrored by handedness.
        let thumb = match hand.handedness {
            Handedness::Right => lm[THUMB_TIP].x < lm[THUMB_IP].x,
            Handedness::Left => lm[THUMB_TIP].x > lm[THUMB_IP].x,
        };

        FingerFlags {
            thumb,
            index: lm[INDEX_FINGER_TIP].y < lm[INDEX_FINGER_PIP].y,
            middle: lm[MIDDLE_FINGER_TIP].y < lm[MIDDLE_FINGER_PIP].y,
            ring: lm[RING_FINGER_TIP].y < lm[RING_FINGER_PIP].y,
            pinky: lm[PINKY_TIP].y < lm[PINKY_PIP].y,
        }
    }

    /// Sub-classify an index-only hand by where the fingertip points.
    ///
    /// The dominant displacement axis wins; ties go to the vertical axis.
    fn directional(hand: &TrackedHand) -> GestureSymbol {
        let wrist = hand.landmark(WRIST);
        let tip = hand.landmark(INDEX_FINGER_TIP);
        let dx = tip.x - wrist.x;
        let dy = tip.y - wrist.y;

        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                GestureSymbol::PointRight
            } else {
                GestureSymbol::PointLeft
            }
        } else if dy < 0.0 {
            GestureSymbol::PointUp
        } else {
            GestureSymbol::PointDown
        }
    }

    fn palm_faces_down(hand: &TrackedHand) -> bool {
        hand.landmark(MIDDLE_FINGER_MCP).y < hand.landmark(WRIST).y
    }
}

impl PoseClassifier for GeometricClassifier {
    fn classify(&mut self, hand: &TrackedHand) -> Option<GestureSymbol> {
        let flags = Self::finger_flags(hand);

        match (flags.thumb, flags.index, flags.middle, flags.ring, flags.pinky) {
            (true, true, true, true, true) => Some(GestureSymbol::OpenPalm),
            (false, false, false, false, false) => Some(GestureSymbol::ClosedFist),
            (true, false, false, false, false) => Some(GestureSymbol::ThumbsUp),
            (false, true, true, false, false) => Some(GestureSymbol::Peace),
            (true, false, false, false, true) => Some(GestureSymbol::CallMe),
            (false, true, true, true, false) => Some(GestureSymbol::ThreeFingers),
            (true, true, false, false, false) => Some(GestureSymbol::Pinch),
            (false, true, false, false, false) => Some(Self::directional(hand)),
            _ if flags.raised_count() >= 4 && Self::palm_faces_down(hand) => {
                Some(GestureSymbol::PalmDown)
            }
            _ => None,
        }
    }
}

/// Failure reported by an external image model.
#[derive(Error, Debug)]
#[error("model inference failed: {0}")]
pub struct ModelError(pub String);

/// Class index and confidence returned by an external image model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrediction {
    pub class_index: usize,
    pub confidence: f32,
}

/// Boundary to a trained image classifier.
///
/// The model owns its copy of the camera frame; it is handed the normalized
/// region to crop. How inference happens is opaque to this crate.
pub trait HandModel {
    fn predict(&mut self, region: &HandRegion) -> Result<ModelPrediction, ModelError>;
}

/// Adapts a [`HandModel`] to the [`PoseClassifier`] interface.
///
/// Predictions below the confidence floor, class indices outside the symbol
/// table, and inference failures all degrade to "unknown" so the frame loop
/// never stalls on the model.
pub struct LearnedClassifier<M: HandModel> {
    model: M,
    min_confidence: f32,
    crop_margin: f32,
}

impl<M: HandModel> LearnedClassifier<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            min_confidence: 0.8,
            crop_margin: 0.1,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

impl<M: HandModel> PoseClassifier for LearnedClassifier<M> {
    fn classify(&mut self, hand: &TrackedHand) -> Option<GestureSymbol> {
        let region = hand.bounding_region(self.crop_margin);

        match self.model.predict(&region) {
            Ok(prediction) if prediction.confidence >= self.min_confidence => {
                GestureSymbol::from_ordinal(prediction.class_index).ok()
            }
            Ok(prediction) => {
                tracing::trace!(
                    "discarding low-confidence prediction ({:.2})",
                    prediction.confidence
                );
                None
            }
            Err(err) => {
                tracing::debug!("{}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Landmark, LANDMARK_COUNT};

    /// Build a right hand with the requested finger flags.
    fn hand_with_flags(
        thumb: bool,
        index: bool,
        middle: bool,
        ring: bool,
        pinky: bool,
    ) -> TrackedHand {
        let mut lm = [Landmark::default(); LANDMARK_COUNT];
        lm[WRIST] = Landmark { x: 0.5, y: 0.9, z: 0.0 };
        lm[MIDDLE_FINGER_MCP] = Landmark { x: 0.5, y: 0.7, z: 0.0 };

        // Thumb: raised means the tip passes the IP joint toward smaller x
        // on a right hand.
        lm[THUMB_IP] = Landmark { x: 0.40, y: 0.75, z: 0.0 };
        lm[THUMB_TIP] = Landmark {
            x: if thumb { 0.32 } else { 0.46 },
            y: 0.72,
            z: 0.0,
        };

        let fingers = [
            (INDEX_FINGER_PIP, INDEX_FINGER_TIP, 0.55, index),
            (MIDDLE_FINGER_PIP, MIDDLE_FINGER_TIP, 0.50, middle),
            (RING_FINGER_PIP, RING_FINGER_TIP, 0.45, ring),
            (PINKY_PIP, PINKY_TIP, 0.40, pinky),
        ];
        for (pip, tip, x, up) in fingers {
            lm[pip] = Landmark { x, y: 0.6, z: 0.0 };
            lm[tip] = Landmark {
                x,
                y: if up { 0.4 } else { 0.8 },
                z: 0.0,
            };
        }

        TrackedHand {
            handedness: Handedness::Right,
            confidence: 0.95,
            landmarks: lm,
        }
    }

    fn classify(hand: &TrackedHand) -> Option<GestureSymbol> {
        GeometricClassifier::new().classify(hand)
    }

    #[test]
    fn test_open_palm() {
        let hand = hand_with_flags(true, true, true, true, true);
        assert_eq!(classify(&hand), Some(GestureSymbol::OpenPalm));
    }

    #[test]
    fn test_closed_fist() {
        let hand = hand_with_flags(false, false, false, false, false);
        assert_eq!(classify(&hand), Some(GestureSymbol::ClosedFist));
    }

    #[test]
    fn test_named_patterns() {
        assert_eq!(
            classify(&hand_with_flags(true, false, false, false, false)),
            Some(GestureSymbol::ThumbsUp)
        );
        assert_eq!(
            classify(&hand_with_flags(false, true, true, false, false)),
            Some(GestureSymbol::Peace)
        );
        assert_eq!(
            classify(&hand_with_flags(true, false, false, false, true)),
            Some(GestureSymbol::CallMe)
        );
        assert_eq!(
            classify(&hand_with_flags(false, true, true, true, false)),
            Some(GestureSymbol::ThreeFingers)
        );
        assert_eq!(
            classify(&hand_with_flags(true, true, false, false, false)),
            Some(GestureSymbol::Pinch)
        );
    }

    #[test]
    fn test_index_only_points_by_dominant_axis() {
        let mut hand = hand_with_flags(false, true, false, false, false);

        // Tip far to the right of the wrist, nearly level with it
        hand.landmarks[INDEX_FINGER_PIP] = Landmark { x: 0.8, y: 0.92, z: 0.0 };
        hand.landmarks[INDEX_FINGER_TIP] = Landmark { x: 0.9, y: 0.88, z: 0.0 };
        assert_eq!(classify(&hand), Some(GestureSymbol::PointRight));

        hand.landmarks[INDEX_FINGER_PIP] = Landmark { x: 0.2, y: 0.92, z: 0.0 };
        hand.landmarks[INDEX_FINGER_TIP] = Landmark { x: 0.1, y: 0.88, z: 0.0 };
        assert_eq!(classify(&hand), Some(GestureSymbol::PointLeft));

        // Tip well above the wrist
        hand.landmarks[INDEX_FINGER_PIP] = Landmark { x: 0.52, y: 0.6, z: 0.0 };
        hand.landmarks[INDEX_FINGER_TIP] = Landmark { x: 0.52, y: 0.3, z: 0.0 };
        assert_eq!(classify(&hand), Some(GestureSymbol::PointUp));

        // Tip below the wrist, still above its PIP joint
        hand.landmarks[INDEX_FINGER_PIP] = Landmark { x: 0.5, y: 1.0, z: 0.0 };
        hand.landmarks[INDEX_FINGER_TIP] = Landmark { x: 0.5, y: 0.95, z: 0.0 };
        assert_eq!(classify(&hand), Some(GestureSymbol::PointDown));
    }

    #[test]
    fn test_index_only_tie_goes_vertical() {
        let mut hand = hand_with_flags(false, true, false, false, false);
        // |dx| == |dy|, tip above the wrist
        hand.landmarks[INDEX_FINGER_PIP] = Landmark { x: 0.7, y: 0.75, z: 0.0 };
        hand.landmarks[INDEX_FINGER_TIP] = Landmark { x: 0.7, y: 0.7, z: 0.0 };
        assert_eq!(classify(&hand), Some(GestureSymbol::PointUp));
    }

    #[test]
    fn test_palm_down_needs_four_raised_and_mcp_above_wrist() {
        let mut hand = hand_with_flags(false, true, true, true, true);
        assert_eq!(classify(&hand), Some(GestureSymbol::PalmDown));

        // Middle MCP at or below the wrist defeats the rule
        hand.landmarks[MIDDLE_FINGER_MCP] = Landmark { x: 0.5, y: 0.95, z: 0.0 };
        assert_eq!(classify(&hand), None);
    }

    #[test]
    fn test_unlisted_combinations_are_unknown() {
        // thumb + middle
        assert_eq!(classify(&hand_with_flags(true, false, true, false, false)), None);
        // index + pinky (a horns shape the decision list does not cover)
        assert_eq!(classify(&hand_with_flags(false, true, false, false, true)), None);
        // three raised in an unlisted arrangement
        assert_eq!(classify(&hand_with_flags(false, false, true, true, true)), None);
    }

    #[test]
    fn test_thumb_orientation_respects_handedness() {
        let mut hand = hand_with_flags(true, false, false, false, false);
        assert_eq!(classify(&hand), Some(GestureSymbol::ThumbsUp));

        // Same geometry labeled as a left hand reads as a curled thumb
        hand.handedness = Handedness::Left;
        assert_eq!(classify(&hand), Some(GestureSymbol::ClosedFist));
    }

    struct FixedModel(Result<ModelPrediction, String>);

    impl HandModel for FixedModel {
        fn predict(&mut self, _region: &HandRegion) -> Result<ModelPrediction, ModelError> {
            self.0.clone().map_err(ModelError)
        }
    }

    #[test]
    fn test_learned_classifier_maps_class_index() {
        let model = FixedModel(Ok(ModelPrediction {
            class_index: GestureSymbol::Peace.ordinal(),
            confidence: 0.97,
        }));
        let mut classifier = LearnedClassifier::new(model);
        let hand = hand_with_flags(false, false, false, false, false);

        assert_eq!(classifier.classify(&hand), Some(GestureSymbol::Peace));
    }

    #[test]
    fn test_learned_classifier_confidence_floor() {
        let model = FixedModel(Ok(ModelPrediction {
            class_index: 0,
            confidence: 0.4,
        }));
        let mut classifier = LearnedClassifier::new(model).with_min_confidence(0.8);
        let hand = hand_with_flags(false, false, false, false, false);

        assert_eq!(classifier.classify(&hand), None);
    }

    #[test]
    fn test_learned_classifier_swallows_model_errors() {
        let model = FixedModel(Err("backend gone".to_string()));
        let mut classifier = LearnedClassifier::new(model);
        let hand = hand_with_flags(false, false, false, false, false);

        assert_eq!(classifier.classify(&hand), None);
    }

    #[test]
    fn test_learned_classifier_rejects_out_of_range_class() {
        let model = FixedModel(Ok(ModelPrediction {
            class_index: 99,
            confidence: 0.99,
        }));
        let mut classifier = LearnedClassifier::new(model);
        let hand = hand_with_flags(false, false, false, false, false);

        assert_eq!(classifier.classify(&hand), None);
    }
}
