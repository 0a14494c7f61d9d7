//! Top-level application.
//!
//! `App` owns the [`Sequencer`], the [`GestureProcessor`] and the
//! [`SharedStore`] they share.  Each frame it drains landmark events into the
//! gesture pipeline, applies user commands, and ticks the sequencer.

use std::sync::mpsc::TryRecvError;
use std::time::Instant;

use glam::Vec2;
use tracing::{debug, info};

use hand_signal::{GestureProcessor, PresenceChange};
use scene_store::{CinematicState, SharedStore};

use crate::config::RigConfig;
use crate::error::Result;
use crate::input::{apply, RigCommand};
use crate::sequencer::{CameraFrame, Sequencer};
use crate::source::{report_unavailable, spawn_landmark_source, HandScript, SourceEvent};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App {
    cfg:         RigConfig,
    seq:         Sequencer,
    gesture:     GestureProcessor,
    store:       SharedStore,
    /// Set once the landmark source has gone away.
    source_lost: bool,
    last_state:  CinematicState,

    pub status:  String,
}

impl App {
    pub fn new(cfg: RigConfig) -> Result<Self> {
        cfg.validate()?;
        let seq = Sequencer::new(&cfg)?;
        let gesture = GestureProcessor::new(cfg.gesture.clone())?;
        let store = SharedStore::new();
        let last_state = store.state();
        Ok(App {
            cfg,
            seq,
            gesture,
            store,
            source_lost: false,
            last_state,
            status: "Ready. Scroll or press M to assemble, G for gesture tracking".to_string(),
        })
    }

    pub fn config(&self)    -> &RigConfig   { &self.cfg }
    pub fn sequencer(&self) -> &Sequencer   { &self.seq }
    pub fn store(&self)     -> &SharedStore { &self.store }

    /// Apply a user command.  Returns `false` when the app should quit.
    pub fn handle_command(&mut self, cmd: RigCommand) -> bool {
        if cmd == RigCommand::Quit {
            return false;
        }
        let changed = apply(cmd, &mut self.seq, &mut self.store);
        debug!(?cmd, changed, "command");
        match (cmd, changed) {
            (RigCommand::StartJourney, false) => {
                self.status = format!(
                    "Journey needs an assembled scene (morph {:.2} of {:.2})",
                    self.store.morph_progress(),
                    self.cfg.sequence.journey_gate,
                );
            }
            (RigCommand::ToggleTracking, _) => {
                self.status = if self.store.gesture_tracking() {
                    "Gesture tracking on".to_string()
                } else {
                    "Gesture tracking off".to_string()
                };
            }
            (RigCommand::Reset, _) => self.status = "Reset".to_string(),
            _ => {}
        }
        true
    }

    /// Feed one landmark event through the gesture pipeline.
    pub fn handle_source(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Frame(sample) => {
                let update = self.gesture.process(sample.as_ref(), &mut self.store);
                match update.presence {
                    PresenceChange::Acquired  => self.status = "Hand in view".to_string(),
                    PresenceChange::Lost      => self.status = "Hand lost".to_string(),
                    PresenceChange::Unchanged => {}
                }
            }
            SourceEvent::Unavailable(reason) => {
                if !self.source_lost {
                    report_unavailable(&reason);
                    self.source_lost = true;
                    self.gesture.process(None, &mut self.store);
                    self.status = format!("Hand source unavailable: {}", reason);
                }
            }
        }
    }

    /// Advance one frame at renderer time `now`.
    pub fn tick(&mut self, now: f64, pointer: Vec2) -> CameraFrame {
        let frame = self.seq.tick(now, pointer, &mut self.store);
        if frame.state != self.last_state {
            self.status = format!("{} to {}", self.last_state, frame.state);
            self.last_state = frame.state;
        }
        frame
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Windowed run
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: RigConfig) -> Result<()> {
    let mut app = App::new(cfg)?;

    // ── Landmark source ───────────────────────────────────────────────────
    #[cfg(feature = "leap")]
    let (events, sim_tx) = (spawn_landmark_source(crate::source::LeapLandmarkSource), None);
    #[cfg(not(feature = "leap"))]
    let (events, sim_tx) = {
        let (tx, rx) = std::sync::mpsc::channel();
        (spawn_landmark_source(crate::source::SimLandmarkSource::new(rx)), Some(tx))
    };

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx)?;
    let start = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window input
        for cmd in vis.poll_input() {
            if !app.handle_command(cmd) {
                info!("quit requested");
                return Ok(());
            }
        }

        // 2. Drain landmark events
        loop {
            match events.try_recv() {
                Ok(event) => app.handle_source(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    app.handle_source(SourceEvent::Unavailable("source thread ended".to_string()));
                    break;
                }
            }
        }

        // 3. Sequencer
        let frame = app.tick(start.elapsed().as_secs_f64(), vis.pointer());

        // 4. Render
        vis.render(app.sequencer().path(), &frame, app.store(), &app.status);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Headless run
// ════════════════════════════════════════════════════════════════════════════

/// Fixed frame rate for headless runs.
pub const HEADLESS_FPS: u32 = 60;

/// Run `seconds` of simulated time at a fixed 60 fps with a scripted hand
/// ([`HandScript`]).  Tracking starts on; the journey is started once, as soon
/// as the hand has assembled the scene.  Returns the final store.
pub fn run_headless(cfg: RigConfig, seconds: f64) -> Result<SharedStore> {
    let mut app = App::new(cfg)?;
    app.handle_command(RigCommand::ToggleTracking);

    let frames = (seconds.max(0.0) * f64::from(HEADLESS_FPS)).round() as u64;
    let mut journey_started = false;
    for i in 0..=frames {
        let now = i as f64 / f64::from(HEADLESS_FPS);
        app.handle_source(SourceEvent::Frame(HandScript::sample(now)));

        if !journey_started && app.store().morph_progress() >= app.config().sequence.journey_gate {
            journey_started = app.handle_command(RigCommand::StartJourney)
                && app.store().state() == CinematicState::RibbonRise;
            if journey_started {
                info!(at = now, "journey started");
            }
        }

        app.tick(now, Vec2::ZERO);
    }

    info!(frames, state = %app.store().state(), "headless run finished");
    Ok(app.store().clone())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
