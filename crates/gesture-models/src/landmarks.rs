//! Hand landmark models.
//!
//! A hand is tracked as 21 keypoints, each with normalized x/y image
//! coordinates and a relative depth z. The classifier consumes them
//! flattened in keypoint order as `[x0, y0, z0, x1, y1, z1, ...]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of keypoints per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Coordinates per keypoint (x, y, z).
pub const AXES_PER_LANDMARK: usize = 3;

/// Length of the flattened feature row.
pub const FEATURE_DIM: usize = LANDMARK_COUNT * AXES_PER_LANDMARK;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Single tracked keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl HandLandmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A hand with a keypoint count other than 21.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {LANDMARK_COUNT} hand landmarks, got {0}")]
pub struct LandmarkCountError(pub usize);

/// The 21 keypoints of one detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HandLandmark>", into = "Vec<HandLandmark>")]
pub struct HandLandmarks([HandLandmark; LANDMARK_COUNT]);

impl HandLandmarks {
    pub fn new(points: [HandLandmark; LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[HandLandmark; LANDMARK_COUNT] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<&HandLandmark> {
        self.0.get(idx)
    }

    /// Flatten into the classifier's feature layout.
    pub fn to_features(&self) -> Vec<f32> {
        self.0.iter().flat_map(|lm| [lm.x, lm.y, lm.z]).collect()
    }
}

impl TryFrom<Vec<HandLandmark>> for HandLandmarks {
    type Error = LandmarkCountError;

    fn try_from(points: Vec<HandLandmark>) -> Result<Self, Self::Error> {
        let len = points.len();
        let points: [HandLandmark; LANDMARK_COUNT] =
            points.try_into().map_err(|_| LandmarkCountError(len))?;
        Ok(Self(points))
    }
}

impl From<HandLandmarks> for Vec<HandLandmark> {
    fn from(hand: HandLandmarks) -> Self {
        hand.0.to_vec()
    }
}
