//! Pointer gestures: drag to rotate, release to coast, tap to select.
//!
//! The controller is an explicit state machine:
//!
//! ```text
//!            pointer_down (not focused)            pointer_up, moved, fast
//!   Idle ────────────────────────────────▶ Dragging ───────────────────────▶ Coasting
//!    ▲                                      │   ▲                              │
//!    │       pointer_up (tap or slow)       │   │ pointer_down (cancels coast) │
//!    └──────────────────────────────────────┘   └──────────────────────────────┤
//!    ▲                                                                         │
//!    └──────────────────── tick: velocity floor or frame budget ───────────────┘
//! ```
//!
//! It owns the gallery's [`RotationState`]; nothing else writes it.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::GalleryConfig;
use crate::math::{clamp, wrap_angle_signed};
use crate::state::RotationState;

/// Squared displacement after which a drag counts as having moved.
const MOVED_THRESHOLD_SQ: f64 = 16.0;

/// Clicks this soon after a moving drag ends are swallowed.
pub const CLICK_GUARD: Duration = Duration::from_millis(80);

/// Release velocity below this on both axes is treated as unreported.
const REPORTED_VELOCITY_FLOOR: f64 = 0.001;

/// Release velocity needed on either axis to start a coast.
const MIN_COAST_VELOCITY: f64 = 0.005;

/// A release this long after the last movement reports no velocity.
const RELEASE_VELOCITY_WINDOW: Duration = Duration::from_millis(32);

const MAX_RELEASE_VELOCITY: f64 = 1.4;
const RELEASE_VELOCITY_SCALE: f64 = 80.0;
const COAST_STEP_DIVISOR: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Maximum displacement, in pixels, for a press/release pair to count as a tap.
    pub fn tap_threshold_px(self) -> f64 {
        match self {
            PointerKind::Touch => 10.0,
            PointerKind::Mouse | PointerKind::Pen => 6.0,
        }
    }
}

/// Tuning for the controller, taken from the gallery config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Pixels of pointer travel per degree of rotation
    pub sensitivity: f64,
    /// Pitch limit in degrees, both directions
    pub max_pitch: f64,
    /// Inertia dampening in `[0, 1]`; higher coasts longer
    pub dampening: f64,
}

impl From<&GalleryConfig> for GestureSettings {
    fn from(config: &GalleryConfig) -> Self {
        Self {
            sensitivity: config.drag_sensitivity,
            max_pitch: config.max_vertical_rotation_deg,
            dampening: config.dampening(),
        }
    }
}

/// State held between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub kind: PointerKind,
    pub start_rotation: RotationState,
    pub start_pos: [f64; 2],
    last_pos: [f64; 2],
    last_at: Instant,
    /// Most recent pointer velocity in pixels per millisecond
    velocity: [f64; 2],
    /// Set once displacement exceeds 4px; a moved drag arms the click guard.
    pub moved: bool,
}

impl DragSession {
    fn displacement(&self, pos: [f64; 2]) -> [f64; 2] {
        [pos[0] - self.start_pos[0], pos[1] - self.start_pos[1]]
    }

    fn track(&mut self, pos: [f64; 2], now: Instant) {
        let dt_ms = now.saturating_duration_since(self.last_at).as_secs_f64() * 1000.0;
        if dt_ms > 0.0 {
            self.velocity = [
                (pos[0] - self.last_pos[0]) / dt_ms,
                (pos[1] - self.last_pos[1]) / dt_ms,
            ];
            self.last_at = now;
        }
        self.last_pos = pos;

        if !self.moved {
            let [dx, dy] = self.displacement(pos);
            if dx * dx + dy * dy > MOVED_THRESHOLD_SQ {
                self.moved = true;
            }
        }
    }

    /// Velocity as of a release at `now`. A pointer that rested past the
    /// window before lifting has none.
    fn release_velocity(&self, now: Instant) -> [f64; 2] {
        if now.saturating_duration_since(self.last_at) > RELEASE_VELOCITY_WINDOW {
            [0.0, 0.0]
        } else {
            self.velocity
        }
    }
}

/// A decaying coast after release.
#[derive(Debug, Clone, PartialEq)]
pub struct InertiaRun {
    velocity: [f64; 2],
    frames: u32,
    max_frames: u32,
    friction: f64,
    stop_threshold: f64,
}

impl InertiaRun {
    /// Starts a coast from a release velocity in pixels per millisecond.
    pub fn new(velocity: [f64; 2], dampening: f64) -> Self {
        let d = clamp(dampening, 0.0, 1.0);
        Self {
            velocity: [
                clamp(velocity[0], -MAX_RELEASE_VELOCITY, MAX_RELEASE_VELOCITY) * RELEASE_VELOCITY_SCALE,
                clamp(velocity[1], -MAX_RELEASE_VELOCITY, MAX_RELEASE_VELOCITY) * RELEASE_VELOCITY_SCALE,
            ],
            frames: 0,
            max_frames: Self::frame_budget(d),
            friction: 0.94 + 0.055 * d,
            stop_threshold: 0.015 - 0.01 * d,
        }
    }

    /// Most frames a coast may run for the given dampening.
    pub fn frame_budget(dampening: f64) -> u32 {
        (90.0 + 270.0 * clamp(dampening, 0.0, 1.0)).round() as u32
    }

    pub fn velocity(&self) -> [f64; 2] {
        self.velocity
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Applies one frame of friction. `None` once the coast is over.
    fn step(&mut self) -> Option<[f64; 2]> {
        if self.frames >= self.max_frames {
            return None;
        }
        self.velocity[0] *= self.friction;
        self.velocity[1] *= self.friction;
        if self.velocity[0].abs() < self.stop_threshold && self.velocity[1].abs() < self.stop_threshold
        {
            return None;
        }
        self.frames += 1;
        Some(self.velocity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging(DragSession),
    Coasting(InertiaRun),
}

/// What a pointer-up resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Release {
    /// No drag was in progress, or the gallery was focused.
    Ignored,
    /// Displacement stayed under the tap threshold. `guarded` is set when a
    /// moving drag ended less than [`CLICK_GUARD`] earlier.
    Tap {
        position: [f64; 2],
        kind: PointerKind,
        guarded: bool,
    },
    /// Released fast enough to coast.
    Coast { velocity: [f64; 2] },
    /// Released without enough velocity to coast.
    Settled,
}

/// Drives [`RotationState`] from pointer input and per-frame ticks.
#[derive(Debug, Clone)]
pub struct GestureController {
    settings: GestureSettings,
    rotation: RotationState,
    phase: GesturePhase,
    last_drag_end: Option<Instant>,
    focused: bool,
    enlarging: bool,
    scroll_locked: bool,
}

impl GestureController {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            rotation: RotationState::default(),
            phase: GesturePhase::Idle,
            last_drag_end: None,
            focused: false,
            enlarging: false,
            scroll_locked: false,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn phase(&self) -> &GesturePhase {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging(_))
    }

    pub fn is_coasting(&self) -> bool {
        matches!(self.phase, GesturePhase::Coasting(_))
    }

    /// Whether page scrolling should be blocked (touch drags only).
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Marks a tile as focused/enlarged by the host. Pointer input is ignored
    /// while focused.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// While an enlarge transition runs the scroll lock is held.
    pub fn set_enlarging(&mut self, enlarging: bool) {
        self.enlarging = enlarging;
        if !enlarging && !self.is_dragging() {
            self.scroll_locked = false;
        }
    }

    /// Idle -> Dragging. Returns `false` when the press is ignored.
    pub fn pointer_down(&mut self, pos: [f64; 2], kind: PointerKind, now: Instant) -> bool {
        if self.focused || self.is_dragging() {
            return false;
        }
        self.stop_inertia();
        if kind == PointerKind::Touch {
            self.scroll_locked = true;
        }
        debug!(x = pos[0], y = pos[1], ?kind, "drag start");
        self.phase = GesturePhase::Dragging(DragSession {
            kind,
            start_rotation: self.rotation,
            start_pos: pos,
            last_pos: pos,
            last_at: now,
            velocity: [0.0, 0.0],
            moved: false,
        });
        true
    }

    /// Dragging self-loop: rotation follows total displacement since the press.
    pub fn pointer_move(&mut self, pos: [f64; 2], now: Instant) {
        if self.focused {
            return;
        }
        let GesturePhase::Dragging(session) = &mut self.phase else {
            return;
        };
        session.track(pos, now);
        let [dx, dy] = session.displacement(pos);
        let start = session.start_rotation;
        let s = self.settings.sensitivity;
        self.rotation.set(
            start.pitch_deg() - dy / s,
            start.yaw_deg() + dx / s,
            self.settings.max_pitch,
        );
    }

    /// Dragging -> Idle or Coasting.
    pub fn pointer_up(&mut self, pos: [f64; 2], now: Instant) -> Release {
        if !self.is_dragging() {
            return Release::Ignored;
        }
        if self.focused {
            self.end_drag(false, now);
            return Release::Ignored;
        }
        let resting = matches!(&self.phase, GesturePhase::Dragging(s) if s.last_pos == pos);
        if !resting {
            self.pointer_move(pos, now);
        }

        let GesturePhase::Dragging(session) =
            std::mem::replace(&mut self.phase, GesturePhase::Idle)
        else {
            return Release::Ignored;
        };

        let [dx, dy] = session.displacement(pos);
        let threshold = session.kind.tap_threshold_px();
        let guarded = self.click_guard_active(now);
        self.end_drag(session.moved, now);

        if dx * dx + dy * dy <= threshold * threshold {
            self.rotation = session.start_rotation;
            self.rotation.settle();
            debug!(guarded, "tap");
            return Release::Tap {
                position: session.start_pos,
                kind: session.kind,
                guarded,
            };
        }

        let [mut vx, mut vy] = session.release_velocity(now);
        if vx.abs() < REPORTED_VELOCITY_FLOOR && vy.abs() < REPORTED_VELOCITY_FLOOR {
            vx = dx / self.settings.sensitivity * 0.02;
            vy = dy / self.settings.sensitivity * 0.02;
        }
        if vx.abs() > MIN_COAST_VELOCITY || vy.abs() > MIN_COAST_VELOCITY {
            self.start_inertia([vx, vy]);
            Release::Coast { velocity: [vx, vy] }
        } else {
            self.rotation.settle();
            debug!(yaw = self.rotation.yaw_deg(), pitch = self.rotation.pitch_deg(), "drag settled");
            Release::Settled
        }
    }

    fn end_drag(&mut self, moved: bool, now: Instant) {
        if self.is_dragging() {
            self.phase = GesturePhase::Idle;
            self.rotation.settle();
        }
        if moved {
            self.last_drag_end = Some(now);
        }
        if !self.enlarging {
            self.scroll_locked = false;
        }
    }

    /// True within [`CLICK_GUARD`] of the end of a moving drag.
    pub fn click_guard_active(&self, now: Instant) -> bool {
        self.last_drag_end
            .is_some_and(|end| now.saturating_duration_since(end) < CLICK_GUARD)
    }

    /// Whether a click arriving at `now` should reach the tap callback.
    pub fn click_allowed(&self, now: Instant) -> bool {
        !self.is_dragging() && !self.click_guard_active(now)
    }

    /// Starts (or restarts) a coast. Ignored mid-drag.
    pub fn start_inertia(&mut self, velocity: [f64; 2]) {
        if self.is_dragging() {
            return;
        }
        let run = InertiaRun::new(velocity, self.settings.dampening);
        debug!(vx = run.velocity[0], vy = run.velocity[1], max_frames = run.max_frames, "coast start");
        self.phase = GesturePhase::Coasting(run);
    }

    pub fn stop_inertia(&mut self) {
        if let GesturePhase::Coasting(run) = &self.phase {
            debug!(frames = run.frames, "coast cancelled");
            self.phase = GesturePhase::Idle;
            self.rotation.settle();
        }
    }

    /// Advances a coast by one display frame. Returns `true` while still coasting.
    pub fn tick(&mut self) -> bool {
        let GesturePhase::Coasting(run) = &mut self.phase else {
            return false;
        };
        match run.step() {
            Some([vx, vy]) => {
                let pitch = self.rotation.pitch_deg() - vy / COAST_STEP_DIVISOR;
                let yaw = wrap_angle_signed(self.rotation.yaw_deg() + vx / COAST_STEP_DIVISOR);
                self.rotation.set(pitch, yaw, self.settings.max_pitch);
                trace!(pitch, yaw, "coast frame");
                true
            }
            None => {
                debug!(frames = run.frames, "coast stop");
                self.phase = GesturePhase::Idle;
                self.rotation.settle();
                false
            }
        }
    }

    /// Rotates by a pointer-equivalent offset in one step, as keyboard input does.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        if self.focused || self.is_dragging() {
            return;
        }
        self.stop_inertia();
        let s = self.settings.sensitivity;
        self.rotation.set(
            self.rotation.pitch_deg() - dy / s,
            self.rotation.yaw_deg() + dx / s,
            self.settings.max_pitch,
        );
        self.rotation.settle();
    }

    /// Back to the initial orientation, cancelling any drag or coast.
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.rotation = RotationState::default();
        self.scroll_locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> GestureController {
        GestureController::new(GestureSettings {
            sensitivity: 20.0,
            max_pitch: 5.0,
            dampening: 1.0,
        })
    }

    fn ms(base: Instant, n: u64) -> Instant {
        base + Duration::from_millis(n)
    }

    #[test]
    fn drag_right_turns_yaw() {
        let t0 = Instant::now();
        let mut c = controller();
        assert!(c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0));
        c.pointer_move([100.0, 0.0], ms(t0, 16));
        assert_eq!(c.rotation().yaw_deg(), 5.0);
        assert_eq!(c.rotation().pitch_deg(), 0.0);
    }

    #[test]
    fn drag_clamps_pitch() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([0.0, -1000.0], ms(t0, 16));
        assert_eq!(c.rotation().pitch_deg(), 5.0);
        c.pointer_move([0.0, 1000.0], ms(t0, 32));
        assert_eq!(c.rotation().pitch_deg(), -5.0);
    }

    #[test]
    fn yaw_unwrapped_during_drag_and_wrapped_at_rest() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([4000.0, 0.0], ms(t0, 1000));
        assert_eq!(c.rotation().yaw_deg(), 200.0);
        // Long pause, then release in place: slow, so it settles.
        c.pointer_move([4000.0, 0.0], ms(t0, 3000));
        let release = c.pointer_up([4000.0, 0.0], ms(t0, 3000));
        assert!(matches!(release, Release::Coast { .. } | Release::Settled));
        while c.tick() {}
        assert!(c.rotation().yaw_deg() > -180.0 && c.rotation().yaw_deg() <= 180.0);
    }

    #[test]
    fn mouse_tap_reverts_rotation() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([50.0, 50.0], PointerKind::Mouse, t0);
        c.pointer_move([53.0, 52.0], ms(t0, 30));
        let release = c.pointer_up([53.0, 52.0], ms(t0, 60));
        assert_eq!(
            release,
            Release::Tap {
                position: [50.0, 50.0],
                kind: PointerKind::Mouse,
                guarded: false
            }
        );
        assert_eq!(*c.rotation(), RotationState::default());
        assert_eq!(*c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn touch_tap_threshold_is_wider() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Touch, t0);
        assert!(matches!(c.pointer_up([8.0, 0.0], ms(t0, 100)), Release::Tap { .. }));

        c.pointer_down([0.0, 0.0], PointerKind::Mouse, ms(t0, 500));
        assert!(!matches!(c.pointer_up([8.0, 0.0], ms(t0, 600)), Release::Tap { .. }));
    }

    #[test]
    fn fast_release_coasts_until_budget_or_floor() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([40.0, 0.0], ms(t0, 16));
        c.pointer_move([80.0, 0.0], ms(t0, 32));
        let release = c.pointer_up([80.0, 0.0], ms(t0, 32));
        assert!(matches!(release, Release::Coast { .. }));
        assert!(c.is_coasting());

        let mut frames = 0;
        while c.tick() {
            frames += 1;
        }
        assert!(frames <= InertiaRun::frame_budget(1.0));
        assert_eq!(*c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn release_shortly_after_last_move_keeps_flick_velocity() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([40.0, 0.0], ms(t0, 16));
        c.pointer_move([80.0, 0.0], ms(t0, 32));
        match c.pointer_up([80.0, 0.0], ms(t0, 40)) {
            Release::Coast { velocity } => {
                assert!((velocity[0] - 2.5).abs() < 1e-9, "velocity {velocity:?}");
                assert_eq!(velocity[1], 0.0);
            }
            other => panic!("expected coast, got {other:?}"),
        }
        match c.phase() {
            GesturePhase::Coasting(run) => assert_eq!(run.velocity(), [1.4 * 80.0, 0.0]),
            other => panic!("expected coasting, got {other:?}"),
        }
        assert_eq!(c.rotation().yaw_deg(), 4.0);
    }

    #[test]
    fn release_after_resting_drops_flick_velocity() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([40.0, 0.0], ms(t0, 16));
        c.pointer_move([80.0, 0.0], ms(t0, 32));
        match c.pointer_up([80.0, 0.0], ms(t0, 500)) {
            Release::Coast { velocity } => {
                // 80px / 20 sensitivity * 0.02
                assert!((velocity[0] - 0.08).abs() < 1e-12);
            }
            other => panic!("expected coast, got {other:?}"),
        }
    }

    #[test]
    fn release_at_new_position_measures_last_segment() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([40.0, 0.0], ms(t0, 16));
        match c.pointer_up([40.0, 10.0], ms(t0, 26)) {
            Release::Coast { velocity } => {
                assert_eq!(velocity[0], 0.0);
                assert!((velocity[1] - 1.0).abs() < 1e-9);
            }
            other => panic!("expected coast, got {other:?}"),
        }
        assert_eq!(c.rotation().yaw_deg(), 2.0);
        assert_eq!(c.rotation().pitch_deg(), -0.5);
    }

    #[test]
    fn slow_release_synthesizes_velocity_from_movement() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        // A single slow move: 20px over 100s is far below the reported floor.
        c.pointer_move([20.0, 0.0], ms(t0, 100_000));
        match c.pointer_up([20.0, 0.0], ms(t0, 100_000)) {
            Release::Coast { velocity } => {
                assert!((velocity[0] - 0.02).abs() < 1e-12);
                assert_eq!(velocity[1], 0.0);
            }
            other => panic!("expected coast, got {other:?}"),
        }
    }

    #[test]
    fn pointer_down_cancels_coast() {
        let mut c = controller();
        c.start_inertia([1.0, 0.0]);
        assert!(c.is_coasting());
        assert!(c.pointer_down([0.0, 0.0], PointerKind::Mouse, Instant::now()));
        assert!(c.is_dragging());
    }

    #[test]
    fn new_coast_replaces_running_one() {
        let mut c = controller();
        c.start_inertia([1.0, 0.0]);
        for _ in 0..10 {
            c.tick();
        }
        c.start_inertia([0.0, 1.0]);
        match c.phase() {
            GesturePhase::Coasting(run) => {
                assert_eq!(run.frames(), 0);
                assert_eq!(run.velocity(), [0.0, 80.0]);
            }
            other => panic!("expected coasting, got {other:?}"),
        }
    }

    #[test]
    fn coast_velocity_strictly_decreases() {
        let mut run = InertiaRun::new([1.4, -0.7], 0.3);
        let mut prev = run.velocity();
        while let Some(v) = run.step() {
            assert!(v[0].abs() < prev[0].abs());
            assert!(v[1].abs() < prev[1].abs());
            prev = v;
        }
        assert!(run.frames() <= InertiaRun::frame_budget(0.3));
    }

    #[test]
    fn focused_gallery_ignores_pointer() {
        let mut c = controller();
        c.set_focused(true);
        assert!(!c.pointer_down([0.0, 0.0], PointerKind::Mouse, Instant::now()));
        assert_eq!(c.pointer_up([0.0, 0.0], Instant::now()), Release::Ignored);
    }

    #[test]
    fn focus_mid_drag_ends_drag_quietly() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.set_focused(true);
        assert_eq!(c.pointer_up([100.0, 0.0], ms(t0, 50)), Release::Ignored);
        assert_eq!(*c.phase(), GesturePhase::Idle);
    }

    #[test]
    fn click_guard_follows_moving_drag() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, t0);
        c.pointer_move([100.0, 0.0], ms(t0, 2000));
        c.pointer_up([100.0, 0.0], ms(t0, 2000));
        c.stop_inertia();
        assert!(!c.click_allowed(ms(t0, 2050)));
        assert!(c.click_allowed(ms(t0, 2081)));

        // A tap straight after the drag is reported as guarded.
        c.pointer_down([0.0, 0.0], PointerKind::Mouse, ms(t0, 2010));
        match c.pointer_up([0.0, 0.0], ms(t0, 2020)) {
            Release::Tap { guarded, .. } => assert!(guarded),
            other => panic!("expected tap, got {other:?}"),
        }
    }

    #[test]
    fn touch_drag_locks_scroll() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Touch, t0);
        assert!(c.scroll_locked());
        c.pointer_up([0.0, 0.0], ms(t0, 10));
        assert!(!c.scroll_locked());

        c.pointer_down([0.0, 0.0], PointerKind::Mouse, ms(t0, 100));
        assert!(!c.scroll_locked());
    }

    #[test]
    fn scroll_lock_held_while_enlarging() {
        let t0 = Instant::now();
        let mut c = controller();
        c.pointer_down([0.0, 0.0], PointerKind::Touch, t0);
        c.set_enlarging(true);
        c.pointer_up([0.0, 0.0], ms(t0, 10));
        assert!(c.scroll_locked());
        c.set_enlarging(false);
        assert!(!c.scroll_locked());
    }

    #[test]
    fn nudge_moves_and_settles() {
        let mut c = controller();
        c.nudge(-3700.0, 0.0);
        assert!((c.rotation().yaw_deg() - 175.0).abs() < 1e-9);
    }
}
