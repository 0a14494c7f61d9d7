//! Software-rendered preview using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────────┐
//! │  TOP (x / z)             │  SIDE (x / y)            │
//! │   spiral path            │   spiral path            │
//! │   camera + heading       │   camera + heading       │
//! │                          │                          │
//! ├──────────────────────────┴──────────────────────────┤
//! │  state   hand   morph [█████░░░]   ribbon [██░░░░]  │
//! │  status line                                        │
//! │  key legend                                         │
//! └─────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use glam::{Vec2, Vec3};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use scene_store::{CinematicState, SharedStore};
use spiral_path::Curve3D;

use crate::error::{Result, RigError};
use crate::input::RigCommand;
use crate::sequencer::{CameraFrame, Drive, OrbitKey};
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 600;
const VIEW_W:        usize = WIN_W / 2;
const VIEW_H:        usize = 460;
const PX_PER_UNIT:   f32   = 4.0;
const PANEL_Y:       usize = VIEW_H;
const BAR_W:         usize = 200;
const BAR_H:         usize = 10;
/// Pixels of scroll per wheel notch.
const WHEEL_PIXELS:  f32   = 50.0;
/// Simulated depth change per bracket key.
const DEPTH_STEP:    f32   = 0.02;

const BG_COLOR:      u32   = 0xFF101820;
const PANEL_BG:      u32   = 0xFF16213E;
const GRID_COLOR:    u32   = 0xFF243040;
const PATH_COLOR:    u32   = 0xFF4A7A9A;
const FLOWN_COLOR:   u32   = 0xFFFFD700;  // gold
const CAMERA_COLOR:  u32   = 0xFFFF6060;
const HEADING_COLOR: u32   = 0xFFFFAAAA;
const MORPH_COLOR:   u32   = 0xFF60D0A0;
const RIBBON_COLOR:  u32   = 0xFFE05080;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const DIM_TEXT:      u32   = 0xFF888888;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    /// Simulated hand controls; `None` when a real sensor is attached.
    sim_tx: Option<Sender<SimInput>>,
    last_pointer: Vec2,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Cine Rig: gesture camera preview",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| RigError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            last_pointer: Vec2::ZERO,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Normalised pointer position, `[-1, 1]²` with +y up.
    pub fn pointer(&self) -> Vec2 { self.last_pointer }

    /// Poll keyboard and mouse.  Sim-hand input goes straight to the sim
    /// source; everything else comes back as commands.
    pub fn poll_input(&mut self) -> Vec<RigCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(RigCommand::Quit);
            return cmds;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) { cmds.push(RigCommand::Quit); }
        if one_shot(Key::J) { cmds.push(RigCommand::StartJourney); }
        if one_shot(Key::X) { cmds.push(RigCommand::ExitJourney); }
        if one_shot(Key::M) { cmds.push(RigCommand::Assemble); }
        if one_shot(Key::G) { cmds.push(RigCommand::ToggleTracking); }
        if one_shot(Key::R) { cmds.push(RigCommand::Reset); }

        if held(Key::Left)  { cmds.push(RigCommand::Key(OrbitKey::Left)); }
        if held(Key::Right) { cmds.push(RigCommand::Key(OrbitKey::Right)); }
        if held(Key::Up)    { cmds.push(RigCommand::Key(OrbitKey::Up)); }
        if held(Key::Down)  { cmds.push(RigCommand::Key(OrbitKey::Down)); }

        let mut sim = Vec::new();
        if one_shot(Key::H) { sim.push(SimInput::TogglePresence); }
        if one_shot(Key::O) { sim.push(SimInput::Open); }
        if one_shot(Key::C) { sim.push(SimInput::Close); }
        if held(Key::LeftBracket)  { sim.push(SimInput::Depth(-DEPTH_STEP)); }
        if held(Key::RightBracket) { sim.push(SimInput::Depth(DEPTH_STEP)); }

        let shift = self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift);
        if let Some((_, wheel_y)) = self.window.get_scroll_wheel() {
            if wheel_y != 0.0 {
                // Wheel toward the user assembles, like a page scrolling down.
                let pixels = -wheel_y * WHEEL_PIXELS;
                cmds.push(if shift { RigCommand::Dolly(pixels) } else { RigCommand::Scroll(pixels) });
            }
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let p = Vec2::new(mx / WIN_W as f32 * 2.0 - 1.0, 1.0 - my / WIN_H as f32 * 2.0);
            if p != self.last_pointer {
                self.last_pointer = p;
                sim.push(SimInput::Pointer(p));
            }
        }

        if let Some(tx) = &self.sim_tx {
            for input in sim {
                let _ = tx.send(input);
            }
        }
        cmds
    }

    /// Render one frame.
    pub fn render(&mut self, path: &Curve3D, frame: &CameraFrame, store: &SharedStore, status: &str) {
        self.buf.fill(BG_COLOR);

        // ── Views ─────────────────────────────────────────────────────────
        let flown = match (frame.drive, frame.u) {
            (Drive::Path, Some(u)) => Some(u),
            _ => None,
        };
        self.draw_view(0, "TOP  X/Z", path, frame, flown, |v| Vec2::new(v.x, v.z));
        self.draw_view(VIEW_W, "SIDE  X/Y", path, frame, flown, |v| Vec2::new(v.x, -v.y));

        // ── Status panel ──────────────────────────────────────────────────
        self.fill_rect(0, PANEL_Y, WIN_W, WIN_H - PANEL_Y, PANEL_BG);

        let state = store.state();
        let state_color = if state.is_autonomous() { FLOWN_COLOR } else { TEXT_COLOR };
        self.draw_label(&format!("STATE {}", state_label(state)), 12, PANEL_Y + 14, state_color);

        let hand = match (store.gesture_tracking(), store.hand_detected()) {
            (false, _)    => "TRACKING OFF",
            (true, false) => "NO HAND",
            (true, true)  => "HAND",
        };
        self.draw_label(hand, 12, PANEL_Y + 30, DIM_TEXT);
        if let Some(t) = store.pointing_target() {
            self.draw_label(&format!("YAW {:+.2}  PITCH {:+.2}", t.yaw, t.pitch), 120, PANEL_Y + 30, DIM_TEXT);
        }

        self.draw_bar("MORPH",  store.morph_progress(),  320, PANEL_Y + 14, MORPH_COLOR);
        self.draw_bar("RIBBON", store.ribbon_progress(), 320, PANEL_Y + 30, RIBBON_COLOR);
        if let Some(u) = frame.u {
            self.draw_bar("FLIGHT", u, 620, PANEL_Y + 14, FLOWN_COLOR);
        }

        self.draw_label(status, 12, PANEL_Y + 64, TEXT_COLOR);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "ARROWS=orbit  WHEEL=morph  SHIFT+WHEEL=zoom  J=journey  X=exit  M=assemble  G=tracking  R=reset  Q=quit",
            12, WIN_H - 38, DIM_TEXT,
        );
        self.draw_label(
            "SIM HAND: H=in/out  O=open  C=close  [ ]=depth  MOUSE=wrist",
            12, WIN_H - 22, DIM_TEXT,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Projected view ────────────────────────────────────────────────────

    fn draw_view(
        &mut self,
        x0: usize,
        title: &str,
        path: &Curve3D,
        frame: &CameraFrame,
        flown: Option<f32>,
        project: impl Fn(Vec3) -> Vec2,
    ) {
        let center = Vec2::new((x0 + VIEW_W / 2) as f32, (VIEW_H / 2) as f32);
        let to_px = |v: Vec3| center + project(v) * PX_PER_UNIT;

        // Axes through the origin.
        self.draw_line(Vec2::new(x0 as f32, center.y), Vec2::new((x0 + VIEW_W) as f32, center.y), GRID_COLOR);
        self.draw_line(Vec2::new(center.x, 0.0), Vec2::new(center.x, VIEW_H as f32), GRID_COLOR);
        self.draw_border(x0, 0, VIEW_W, VIEW_H, GRID_COLOR);
        self.draw_label(title, x0 + 8, 8, DIM_TEXT);

        // Path, with the flown part highlighted.
        let points = path.points();
        let last = points.len().saturating_sub(1).max(1) as f32;
        for (i, pair) in points.windows(2).enumerate() {
            let done = flown.map_or(false, |u| path.u_to_t(u) * last >= (i + 1) as f32);
            let color = if done { FLOWN_COLOR } else { PATH_COLOR };
            self.draw_line(to_px(pair[0]), to_px(pair[1]), color);
        }

        // Camera marker and heading.
        let cam = to_px(frame.pose.position);
        let ahead = to_px(frame.pose.position + frame.pose.forward() * 6.0);
        self.draw_line(cam, ahead, HEADING_COLOR);
        if cam.x >= x0 as f32 && cam.x < (x0 + VIEW_W) as f32 && cam.y >= 0.0 && cam.y < VIEW_H as f32 {
            self.draw_diamond(cam, 4.0, CAMERA_COLOR);
        }
    }

    fn draw_bar(&mut self, label: &str, value: f32, x: usize, y: usize, color: u32) {
        self.draw_label(label, x, y + 2, DIM_TEXT);
        let bx = x + 40;
        self.fill_rect(bx, y, BAR_W, BAR_H, GRID_COLOR);
        let filled = (value.clamp(0.0, 1.0) * BAR_W as f32) as usize;
        self.fill_rect(bx, y, filled, BAR_H, color);
        self.draw_border(bx, y, BAR_W, BAR_H, DIM_TEXT);
        self.draw_label(&format!("{:.2}", value), bx + BAR_W + 8, y + 2, TEXT_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    /// Clipped solid rectangle.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        let x_end = (x + w).min(WIN_W);
        if x >= x_end { return; }
        for row in self.buf.chunks_exact_mut(WIN_W).skip(y).take(h) {
            row[x..x_end].fill(color);
        }
    }

    /// One-pixel outline.
    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y, 1, h, color);
        self.fill_rect(x + w - 1, y, 1, h, color);
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Bresenham line, clipped per pixel.
    fn draw_line(&mut self, a: Vec2, b: Vec2, color: u32) {
        if !(a.is_finite() && b.is_finite()) { return; }
        let (mut x, mut y) = (a.x as i64, a.y as i64);
        let (x1, y1) = (b.x as i64, b.y as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        for _ in 0..(WIN_W + WIN_H) * 2 {
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
            }
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Outlined diamond of radius `r` around `c`.
    fn draw_diamond(&mut self, c: Vec2, r: f32, color: u32) {
        let corners = [
            c + Vec2::new(r, 0.0),
            c + Vec2::new(0.0, r),
            c - Vec2::new(r, 0.0),
            c - Vec2::new(0.0, r),
        ];
        for i in 0..corners.len() {
            self.draw_line(corners[i], corners[(i + 1) % corners.len()], color);
        }
    }

    /// Text in the 3×5 font, one column of spacing, cut at the window edge.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        const ADVANCE: usize = 4;
        let fits = WIN_W.saturating_sub(x) / ADVANCE;
        for (i, ch) in text.chars().take(fits).enumerate() {
            let g = glyph(ch);
            let gx = x + i * ADVANCE;
            for row in 0..5 {
                for col in 0..3 {
                    if glyph_bit(g, row, col) {
                        self.set_pixel(gx + col, y + row, color);
                    }
                }
            }
        }
    }
}

fn state_label(state: CinematicState) -> &'static str {
    match state {
        CinematicState::Scattered     => "SCATTERED",
        CinematicState::Morphing      => "MORPHING",
        CinematicState::Assembled     => "ASSEMBLED",
        CinematicState::RibbonRise    => "RIBBON RISE",
        CinematicState::PrepareFlight => "PREPARE FLIGHT",
        CinematicState::Flight        => "FLIGHT",
        CinematicState::Finale        => "FINALE",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// One octal digit per row, top row first; bit 2 is the left column.
const FALLBACK_GLYPH: u16 = 0o00200;

fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        '0'       => 0o75557,
        '1'       => 0o26227,
        '2'       => 0o71747,
        '3'       => 0o71717,
        '4'       => 0o55711,
        '5'       => 0o74717,
        '6'       => 0o74757,
        '7'       => 0o71111,
        '8'       => 0o75757,
        '9'       => 0o75717,
        'A'       => 0o75755,
        'B'       => 0o65656,
        'C'       => 0o74447,
        'D'       => 0o65556,
        'E'       => 0o74747,
        'F'       => 0o74744,
        'G'       => 0o74557,
        'H'       => 0o55755,
        'I'       => 0o72227,
        'J'       => 0o11157,
        'K'       => 0o55655,
        'L'       => 0o44447,
        'M'       => 0o57555,
        'N'       => 0o75555,
        'O'       => 0o75557,
        'P'       => 0o75744,
        'Q'       => 0o75571,
        'R'       => 0o65655,
        'S'       => 0o74717,
        'T'       => 0o72222,
        'U'       => 0o55557,
        'V'       => 0o55522,
        'W'       => 0o55575,
        'X'       => 0o55255,
        'Y'       => 0o55722,
        'Z'       => 0o71247,
        '/'       => 0o11244,
        '-'       => 0o00700,
        '+'       => 0o02720,
        '.'       => 0o00002,
        ','       => 0o00024,
        ':'       => 0o02020,
        '='       => 0o07070,
        '['       => 0o64446,
        ']'       => 0o31113,
        ' '       => 0o00000,
        _         => FALLBACK_GLYPH,
    }
}

/// Whether row `row`, column `col` of a packed glyph is lit.
fn glyph_bit(g: u16, row: usize, col: usize) -> bool {
    (g >> ((4 - row) * 3 + (2 - col))) & 1 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(g: u16) -> Vec<String> {
        (0..5)
            .map(|r| (0..3).map(|c| if glyph_bit(g, r, c) { '#' } else { '.' }).collect())
            .collect()
    }

    #[test]
    fn glyphs_unpack_top_row_first() {
        assert_eq!(rows(glyph('7')), ["###", "..#", "..#", "..#", "..#"]);
        assert_eq!(rows(glyph('L')), ["#..", "#..", "#..", "#..", "###"]);
        assert_eq!(glyph('q'), glyph('Q'));
    }

    #[test]
    fn legend_characters_have_glyphs() {
        let legend = "ARROWS=orbit SHIFT+WHEEL=zoom [ ]=depth +0.25 Q/R:";
        for c in legend.chars().filter(|c| *c != ' ') {
            assert_ne!(glyph(c), FALLBACK_GLYPH, "no glyph for {:?}", c);
        }
        assert_eq!(glyph('\u{7f}'), FALLBACK_GLYPH);
    }

    #[test]
    fn every_state_has_a_label() {
        for s in CinematicState::ALL {
            assert!(!state_label(s).is_empty());
        }
    }
}
