//! Landmark sources: LeapMotion hardware and a keyboard/mouse simulator.
//!
//! Every source runs on its own thread and delivers [`SourceEvent`]s over an
//! `mpsc` channel, so the frame loop never waits on a detector.  Consumers
//! don't need to know whether samples came from hardware or the simulator.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use glam::{Vec2, Vec3};
use tracing::{debug, warn};

use hand_signal::landmarks::synthetic_hand;
use hand_signal::LandmarkSample;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One detector result; `None` when it ran and found no hand.
    Frame(Option<LandmarkSample>),
    /// The sensor went away.  Treated as "no hand" from here on.
    Unavailable(String),
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a LeapMotion controller.
///
/// Leap bones are mapped onto the 21-point layout: the middle metacarpal
/// base stands in for the wrist, each finger contributes its four joints,
/// and millimetres are scaled so a typical palm measures about 0.2 units.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(SourceEvent::Unavailable(format!("LeapC connection: {:?}", e)));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let _ = tx.send(SourceEvent::Unavailable(format!("LeapMotion device: {:?}", e)));
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();
                let hand = hands
                    .iter()
                    .find(|h| h.hand_type() == HandType::Right)
                    .or_else(|| hands.first());
                let sample = hand.and_then(|h| leap_landmarks(h));
                if tx.send(SourceEvent::Frame(sample)).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(feature = "leap")]
fn leap_landmarks(hand: &leaprs::Hand) -> Option<LandmarkSample> {
    use hand_signal::landmarks::{LANDMARK_COUNT, THUMB_CMC, WRIST};

    const MM_PER_UNIT: f32 = 400.0;
    const MID_HEIGHT:  f32 = 200.0;   // mm above the device
    macro_rules! unit {
        ($joint:expr) => {{
            let v = $joint;
            Vec3::new(0.5 + v.x / MM_PER_UNIT, 0.5 - (v.y - MID_HEIGHT) / MM_PER_UNIT, v.z / MM_PER_UNIT)
        }};
    }

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return None;
    }

    let mut points = [Vec3::ZERO; LANDMARK_COUNT];
    points[WRIST] = unit!(digits[2].metacarpal().prev_joint());
    for (d, digit) in digits.iter().take(5).enumerate() {
        let base = THUMB_CMC + d * 4;
        points[base]     = unit!(digit.proximal().prev_joint());
        points[base + 1] = unit!(digit.intermediate().prev_joint());
        points[base + 2] = unit!(digit.distal().prev_joint());
        points[base + 3] = unit!(digit.distal().next_joint());
    }
    LandmarkSample::new(points).ok()
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the preview window that shapes the simulated hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Hand moves into or out of view.
    TogglePresence,
    /// Spread the fingers.
    Open,
    /// Make a fist.
    Close,
    /// Normalised pointer position, `[-1, 1]²` with +y up.
    Pointer(Vec2),
    /// Step the hand toward or away from the camera.
    Depth(f32),
}

/// State of the simulated hand, independent of any thread.
#[derive(Clone, Debug, PartialEq)]
pub struct SimHand {
    pub present:     bool,
    pub curl:        f32,
    pub curl_target: f32,
    pub wrist:       Vec3,
    pub palm_scale:  f32,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand {
            present:     false,
            curl:        0.0,
            curl_target: 0.0,
            wrist:       Vec3::new(0.5, 0.6, 0.0),
            palm_scale:  0.2,
        }
    }
}

/// Fraction of the remaining curl covered per emitted frame.
const CURL_RATE: f32 = 0.25;
/// Pointer → wrist mapping, in landmark units per pointer unit.
const POINTER_REACH: f32 = 0.25;

impl SimHand {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::TogglePresence => self.present = !self.present,
            SimInput::Open           => self.curl_target = 0.0,
            SimInput::Close          => self.curl_target = 1.0,
            SimInput::Pointer(p) => {
                let p = p.clamp(Vec2::NEG_ONE, Vec2::ONE);
                self.wrist.x = 0.5 + p.x * POINTER_REACH;
                self.wrist.y = 0.6 - p.y * POINTER_REACH;
            }
            SimInput::Depth(d) => self.palm_scale = (self.palm_scale + d).clamp(0.05, 0.4),
        }
    }

    /// Produce one detector result and ease the fingers.
    pub fn sample(&mut self) -> Option<LandmarkSample> {
        self.curl += (self.curl_target - self.curl) * CURL_RATE;
        self.present.then(|| synthetic_hand(self.wrist, self.palm_scale, self.curl))
    }
}

/// Emits a simulated detector result every `period`, shaped by
/// [`SimInput`]s from the window.
pub struct SimLandmarkSource {
    pub rx:     Receiver<SimInput>,
    pub period: Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        // ~30 Hz, a typical webcam detector rate.
        SimLandmarkSource { rx, period: Duration::from_millis(33) }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let mut hand = SimHand::default();
        loop {
            match self.rx.recv_timeout(self.period) {
                Ok(input) => {
                    debug!(?input, "sim input");
                    hand.apply(input);
                    // Drain the burst so pointer moves don't queue up.
                    while let Ok(more) = self.rx.try_recv() {
                        hand.apply(more);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
            if tx.send(SourceEvent::Frame(hand.sample())).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandScript: deterministic hand for headless runs
// ════════════════════════════════════════════════════════════════════════════

/// A scripted hand as a pure function of time:
///
/// | Time (s) | Hand |
/// |---|---|
/// | 0 – 1 | out of view |
/// | 1 – 6 | fist, still |
/// | 6 – 10 | fist, drifting right and up |
/// | 10 – 14 | open, still |
/// | 14 + | fist, still |
pub struct HandScript;

impl HandScript {
    pub fn sample(t: f64) -> Option<LandmarkSample> {
        let t = t as f32;
        if t < 1.0 {
            return None;
        }
        let mut wrist = Vec3::new(0.5, 0.6, 0.0);
        let curl = if (10.0..14.0).contains(&t) { 0.0 } else { 1.0 };
        if (6.0..10.0).contains(&t) {
            let k = (t - 6.0) / 4.0;
            wrist += Vec3::new(0.1 * k, -0.05 * k, 0.0);
        } else if t >= 10.0 {
            wrist += Vec3::new(0.1, -0.05, 0.0);
        }
        Some(synthetic_hand(wrist, 0.2, curl))
    }
}

/// Log once when a sensor disappears.
pub fn report_unavailable(reason: &str) {
    warn!(reason, "landmark source unavailable, continuing without a hand");
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
