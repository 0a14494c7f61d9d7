//! The 21-point hand layout and the geometric measures taken from it.
//!
//! Coordinates are camera-normalised: `x` and `y` in roughly `[0, 1]` with
//! `y` growing downward, `z` relative depth at the same scale as `x`.

use glam::Vec3;

use crate::error::{Result, SignalError};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

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

/// The four non-thumb fingertips used for the openness ratio.
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Floor for the palm scale when dividing, so a collapsed sample cannot
/// produce an infinite ratio.
const MIN_PALM_SCALE: f32 = 0.01;

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSample
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand: 21 points in the layout above.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkSample {
    points: [Vec3; LANDMARK_COUNT],
}

impl LandmarkSample {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Result<Self> {
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(SignalError::NonFiniteLandmark(i));
        }
        Ok(LandmarkSample { points })
    }

    /// Build from raw `[x, y, z]` triples as delivered by a detector.
    pub fn from_coords(coords: &[[f32; 3]]) -> Result<Self> {
        if coords.len() != LANDMARK_COUNT {
            return Err(SignalError::LandmarkCount { expected: LANDMARK_COUNT, got: coords.len() });
        }
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        for (dst, src) in points.iter_mut().zip(coords) {
            *dst = Vec3::from_array(*src);
        }
        LandmarkSample::new(points)
    }

    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] { &self.points }
    pub fn point(&self, index: usize) -> Vec3 { self.points[index] }
    pub fn wrist(&self) -> Vec3 { self.points[WRIST] }

    /// Wrist → index-MCP distance; a proxy for how close the hand is.
    pub fn palm_scale(&self) -> f32 {
        self.points[WRIST].distance(self.points[INDEX_MCP])
    }

    /// Mean wrist → fingertip distance divided by the palm scale.
    /// Large for a spread hand, small for a fist, independent of distance
    /// to the camera.
    pub fn openness_ratio(&self) -> f32 {
        let wrist = self.wrist();
        let reach: f32 = FINGERTIPS.iter().map(|&i| self.points[i].distance(wrist)).sum::<f32>()
            / FINGERTIPS.len() as f32;
        reach / self.palm_scale().max(MIN_PALM_SCALE)
    }

    /// The same hand shifted by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        let mut points = self.points;
        for p in &mut points {
            *p += offset;
        }
        LandmarkSample { points }
    }
}

impl TryFrom<&[[f32; 3]]> for LandmarkSample {
    type Error = SignalError;

    fn try_from(coords: &[[f32; 3]]) -> Result<Self> {
        LandmarkSample::from_coords(coords)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic hands
// ════════════════════════════════════════════════════════════════════════════

/// Per-finger layout: (angle from straight up in radians, MCP reach,
/// finger length), both lengths in palm-scale units.  Index reach is 1.0 so
/// the palm scale of a synthetic hand equals the requested one.
const FINGER_LAYOUT: [(f32, f32, f32); 4] = [
    (-0.25, 1.00, 1.00),
    (-0.08, 0.98, 1.05),
    ( 0.08, 0.93, 0.98),
    ( 0.25, 0.85, 0.85),
];

/// Build a plausible right hand facing the camera.
///
/// `curl` runs from `0.0` (fingers spread, openness ≈ 1.9) to `1.0`
/// (fist, openness ≈ 0.6).  Used by the keyboard simulator and by tests.
pub fn synthetic_hand(wrist: Vec3, palm_scale: f32, curl: f32) -> LandmarkSample {
    let curl = curl.clamp(0.0, 1.0);
    let s = palm_scale;
    let mut pts = [wrist; LANDMARK_COUNT];

    let dir = |angle: f32| Vec3::new(angle.sin(), -angle.cos(), 0.0);
    let toward_camera = Vec3::new(0.0, 0.0, -1.0);

    // Thumb sweeps in from the side and folds across the palm.
    let td = dir(-1.0);
    let thumb_open = [0.35f32, 0.6, 0.85, 1.1].map(|k| wrist + td * s * k);
    let across = wrist + dir(-0.1) * s * 0.7 + toward_camera * s * 0.2;
    for (j, open) in thumb_open.iter().enumerate() {
        let folded = thumb_open[0].lerp(across, j as f32 / 3.0);
        pts[THUMB_CMC + j] = open.lerp(folded, curl);
    }

    for (f, &(angle, reach, len)) in FINGER_LAYOUT.iter().enumerate() {
        let d   = dir(angle);
        let mcp = wrist + d * s * reach;
        let base = INDEX_MCP + f * 4;

        let open = [0.45f32, 0.75, 1.0].map(|k| mcp + d * s * len * k);
        // Curled finger: joints fold forward and the tip tucks back toward
        // the wrist along the finger's own line.
        let curled = [
            mcp + d * s * 0.3 + toward_camera * s * 0.3,
            mcp + toward_camera * s * 0.45,
            mcp - d * s * 0.35,
        ];

        pts[base] = mcp;
        for j in 0..3 {
            pts[base + 1 + j] = open[j].lerp(curled[j], curl);
        }
    }

    LandmarkSample { points: pts }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
