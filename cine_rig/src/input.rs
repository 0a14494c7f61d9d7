//! User commands and their routing into the sequencer and store.
//!
//! The preview window turns key presses and wheel motion into
//! [`RigCommand`]s; [`apply`] is the single place they take effect.

use tracing::info;

use scene_store::SharedStore;

use crate::sequencer::{OrbitKey, Sequencer};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RigCommand {
    StartJourney,
    ExitJourney,
    Assemble,
    Reset,
    /// Switch gesture tracking on or off.
    ToggleTracking,
    Key(OrbitKey),
    /// Wheel travel in pixels, positive away from the user.
    Scroll(f32),
    /// Shift+wheel travel in pixels; positive moves the camera out.
    Dolly(f32),
    Quit,
}

/// Apply one command.  Returns whether it changed anything; commands that
/// make no sense in the current state are silent no-ops.
pub fn apply(cmd: RigCommand, seq: &mut Sequencer, store: &mut SharedStore) -> bool {
    match cmd {
        RigCommand::StartJourney => seq.start_journey(store),
        RigCommand::ExitJourney => seq.exit_journey(store),
        RigCommand::Assemble => seq.assemble(store),
        RigCommand::Reset => {
            seq.reset(store);
            true
        }
        RigCommand::ToggleTracking => {
            let on = !store.gesture_tracking();
            store.set_gesture_tracking(on);
            info!(tracking = on, "gesture tracking toggled");
            true
        }
        RigCommand::Key(key) => seq.on_key(key, store),
        RigCommand::Scroll(dy) => seq.on_scroll(dy, store),
        RigCommand::Dolly(dy) => seq.on_dolly(dy, store),
        RigCommand::Quit => false,
    }
}
