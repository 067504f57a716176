//! Terminal host for the gallery: mouse drag to spin, click a tile to open it.

use std::io::{self, Stdout, Write};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::ResetColor;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use tracing::{debug, info};

use crate::canvas::{Canvas, Cell, Rgb};
use crate::config::GalleryConfig;
use crate::error::Result;
use crate::gallery::DomeGallery;
use crate::gesture::{GesturePhase, PointerKind};
use crate::layout::GalleryItem;
use crate::math::clamp;
use crate::render::{caption, draw_gallery};

/// One display frame.
const FRAME: Duration = Duration::from_millis(16);

/// Cell size assumed when the terminal does not report pixel dimensions.
const FALLBACK_CELL_PX: [f64; 2] = [8.0, 16.0];

/// Degrees of rotation per arrow-key press.
const NUDGE_DEG: f64 = 5.0;

const BACKGROUND: Rgb = Rgb(6, 6, 10);

/// Raw mode, alternate screen and mouse capture, undone on drop.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
    }
}

/// A tile opened by a tap, shown over the gallery.
#[derive(Debug, Clone)]
struct OpenTile {
    item: GalleryItem,
    opened_at: Instant,
}

/// Terminal viewer state
pub struct Viewer {
    gallery: DomeGallery,
    taps: Receiver<GalleryItem>,
    open: Option<OpenTile>,
    cols: u16,
    rows: u16,
    cell_px: [f64; 2],
    debug: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl Viewer {
    pub fn new(config: GalleryConfig, debug: bool) -> Self {
        let (tx, taps) = mpsc::channel();
        let gallery = DomeGallery::new(config).with_tap_callback(move |item: &GalleryItem| {
            let _ = tx.send(item.clone());
        });
        Viewer {
            gallery,
            taps,
            open: None,
            cols: 0,
            rows: 0,
            cell_px: FALLBACK_CELL_PX,
            debug,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    /// Runs until the user quits.
    pub fn run(mut self) -> Result<()> {
        let mut guard = TerminalGuard::enter()?;
        let (cols, rows) = initial_size()?;
        self.resize(cols, rows);
        info!(cols, rows, items = self.gallery.items().len(), "viewer started");

        let mut canvas = Canvas::new(self.cols as usize, self.rows as usize);
        loop {
            let frame_start = Instant::now();
            while event::poll(FRAME.saturating_sub(frame_start.elapsed()))? {
                if !self.handle_event(event::read()?) {
                    info!("viewer closed");
                    return Ok(());
                }
            }

            while let Ok(item) = self.taps.try_recv() {
                self.open_tile(item);
            }
            self.gallery.tick();
            self.update_enlarging();

            if canvas.width() != self.cols as usize || canvas.height() != self.rows as usize {
                canvas = Canvas::new(self.cols as usize, self.rows as usize);
            }
            self.paint(&mut canvas);
            canvas.write_to(&mut guard.stdout)?;
            queue!(guard.stdout, ResetColor)?;
            guard.stdout.flush()?;
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.cell_px = cell_pixel_size(self.cols, self.rows);
        self.gallery.resize(
            self.cols as f64 * self.cell_px[0],
            self.rows as f64 * self.cell_px[1],
        );
    }

    /// Handles one terminal event. Returns `false` to quit.
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => return self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let step = NUDGE_DEG * self.gallery.config().drag_sensitivity;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Char('q') | KeyCode::Char('Q') => return false,
            KeyCode::Esc => self.close_tile(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.debug = !self.debug,
            KeyCode::Char('g') | KeyCode::Char('G') => {
                let grayscale = !self.gallery.config().grayscale;
                self.gallery.set_grayscale(grayscale);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.open.is_none() {
                    self.gallery.reset();
                }
            }
            KeyCode::Enter => {
                let [w, h] = self.gallery.container();
                if let Some(index) = self.gallery.tile_at([w / 2.0, h / 2.0]) {
                    self.gallery.click(index, Instant::now());
                }
            }
            KeyCode::Left => self.gallery.nudge(-step, 0.0),
            KeyCode::Right => self.gallery.nudge(step, 0.0),
            KeyCode::Up => self.gallery.nudge(0.0, -step),
            KeyCode::Down => self.gallery.nudge(0.0, step),
            _ => {}
        }
        true
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let pos = [
            (mouse.column as f64 + 0.5) * self.cell_px[0],
            (mouse.row as f64 + 0.5) * self.cell_px[1],
        ];
        let now = Instant::now();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.open.is_some() {
                    if !self.overlay_contains(mouse.column, mouse.row, now) {
                        self.close_tile();
                    }
                    return;
                }
                self.gallery.pointer_down(pos, PointerKind::Mouse, now);
            }
            MouseEventKind::Drag(MouseButton::Left) => self.gallery.pointer_move(pos, now),
            MouseEventKind::Up(MouseButton::Left) => {
                let release = self.gallery.pointer_up(pos, now);
                debug!(?release, "pointer up");
            }
            _ => {}
        }
    }

    fn open_tile(&mut self, item: GalleryItem) {
        info!(src = %item.src, alt = %item.alt, "opening tile");
        self.gallery.set_focused(true);
        self.gallery.set_enlarging(true);
        self.open = Some(OpenTile {
            item,
            opened_at: Instant::now(),
        });
    }

    fn close_tile(&mut self) {
        if self.open.take().is_some() {
            self.gallery.set_focused(false);
            self.gallery.set_enlarging(false);
        }
    }

    fn enlarge_progress(&self, now: Instant) -> f64 {
        let Some(open) = &self.open else {
            return 0.0;
        };
        let total = self.gallery.config().enlarge_transition_ms;
        if total == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(open.opened_at).as_millis() as f64;
        clamp(elapsed / total as f64, 0.0, 1.0)
    }

    fn update_enlarging(&mut self) {
        if self.open.is_some() && self.enlarge_progress(Instant::now()) >= 1.0 {
            self.gallery.set_enlarging(false);
        }
    }

    /// Overlay box in cells: (x, y, width, height).
    fn overlay_rect(&self, now: Instant) -> (isize, isize, usize, usize) {
        let [target_w, target_h] = self.gallery.config().opened_size_px();
        let pad = self.gallery.style().viewer_pad;
        let [cw, ch] = self.gallery.container();
        let progress = self.enlarge_progress(now);
        let ease = 1.0 - (1.0 - progress).powi(3);
        let w_px = target_w.min(cw - 2.0 * pad).max(self.cell_px[0] * 12.0) * (0.3 + 0.7 * ease);
        let h_px = target_h.min(ch - 2.0 * pad).max(self.cell_px[1] * 5.0) * (0.3 + 0.7 * ease);
        let w = ((w_px / self.cell_px[0]).round() as usize).min(self.cols as usize).max(1);
        let h = ((h_px / self.cell_px[1]).round() as usize).min(self.rows as usize).max(1);
        let x = (self.cols as isize - w as isize) / 2;
        let y = (self.rows as isize - h as isize) / 2;
        (x, y, w, h)
    }

    fn overlay_contains(&self, col: u16, row: u16, now: Instant) -> bool {
        let (x, y, w, h) = self.overlay_rect(now);
        let (col, row) = (col as isize, row as isize);
        col >= x && col < x + w as isize && row >= y && row < y + h as isize
    }

    fn paint(&mut self, canvas: &mut Canvas) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        draw_gallery(&self.gallery, canvas, self.cell_px, BACKGROUND);

        if let Some(open) = &self.open {
            self.paint_overlay(canvas, open, now);
        }

        if self.debug {
            self.paint_debug(canvas);
        }
    }

    fn paint_overlay(&self, canvas: &mut Canvas, open: &OpenTile, now: Instant) {
        let scrim = Rgb::from_hex(&self.gallery.style().overlay_blur_color).unwrap_or(Rgb::BLACK);
        let (x, y, w, h) = self.overlay_rect(now);
        canvas.fill_rect(x, y, w, h, scrim);

        let border = Cell {
            ch: '·',
            fg: Rgb(200, 200, 200),
            bg: scrim,
        };
        let (x1, y1) = (x + w as isize - 1, y + h as isize - 1);
        canvas.draw_line(x, y, x1, y, border);
        canvas.draw_line(x, y1, x1, y1, border);
        canvas.draw_line(x, y, x, y1, border);
        canvas.draw_line(x1, y, x1, y1, border);

        if self.enlarge_progress(now) < 1.0 {
            return;
        }
        let item = &open.item;
        let mut lines = vec![caption(item).to_string(), String::new()];
        if !item.src.is_empty() {
            lines.push(format!("src: {}", item.src));
        }
        for (key, value) in &item.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("{key}: {value}"));
        }
        let inner = w.saturating_sub(4);
        for (i, line) in lines.iter().take(h.saturating_sub(4)).enumerate() {
            let text: String = line.chars().take(inner).collect();
            canvas.put_text(x + 2, y + 1 + i as isize, &text, Rgb::WHITE, scrim);
        }
        canvas.put_text(x + 2, y1 - 1, "Esc to close", Rgb(150, 150, 150), scrim);
    }

    fn paint_debug(&self, canvas: &mut Canvas) {
        let rotation = self.gallery.rotation();
        let phase = match self.gallery.controller().phase() {
            GesturePhase::Idle => "idle",
            GesturePhase::Dragging(_) => "dragging",
            GesturePhase::Coasting(_) => "coasting",
        };
        let lines = [
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Pitch: {:.2}, Yaw: {:.2}", rotation.pitch_deg(), rotation.yaw_deg()),
            format!(
                "Radius: {}px, Tiles: {}",
                self.gallery.style().radius,
                self.gallery.items().len()
            ),
            format!("Phase: {phase}"),
            format!("FPS: {:.2}", self.fps),
        ];
        for (i, line) in lines.iter().enumerate() {
            canvas.put_text(1, i as isize, line, Rgb::WHITE, Rgb::BLACK);
        }
    }
}

fn initial_size() -> io::Result<(u16, u16)> {
    match termsize::get() {
        Some(size) if size.cols > 0 && size.rows > 0 => Ok((size.cols, size.rows)),
        _ => terminal::size(),
    }
}

/// Pixel size of one cell, from the terminal's reported window size when available.
fn cell_pixel_size(cols: u16, rows: u16) -> [f64; 2] {
    match terminal::window_size() {
        Ok(size) if size.width > 0 && size.height > 0 && size.columns > 0 && size.rows > 0 => [
            size.width as f64 / size.columns as f64,
            size.height as f64 / size.rows as f64,
        ],
        _ => {
            debug!(cols, rows, "terminal reports no pixel size; assuming 8x16 cells");
            FALLBACK_CELL_PX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn viewer() -> Viewer {
        let mut viewer = Viewer::new(
            GalleryConfig {
                images: vec!["a.jpg".into(), "b.jpg".into()],
                segments: 20,
                min_radius: 300.0,
                ..Default::default()
            },
            false,
        );
        viewer.cols = 80;
        viewer.rows = 24;
        viewer.cell_px = FALLBACK_CELL_PX;
        viewer.gallery.resize(640.0, 384.0);
        viewer
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn q_quits() {
        let mut v = viewer();
        assert!(!v.handle_event(key(KeyCode::Char('q'))));
        assert!(v.handle_event(key(KeyCode::Char('d'))));
        assert!(v.debug);
    }

    #[test]
    fn arrow_keys_nudge_rotation() {
        let mut v = viewer();
        v.handle_event(key(KeyCode::Right));
        assert!((v.gallery.rotation().yaw_deg() - NUDGE_DEG).abs() < 1e-9);
        v.handle_event(key(KeyCode::Char('r')));
        assert_eq!(v.gallery.rotation().yaw_deg(), 0.0);
    }

    #[test]
    fn mouse_drag_spins_gallery() {
        let mut v = viewer();
        v.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 12));
        v.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 12));
        assert!((v.gallery.rotation().yaw_deg() - 8.0).abs() < 1e-9);
        v.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 30, 12));
        assert!(!v.gallery.controller().is_dragging());
    }

    #[test]
    fn enter_opens_centre_tile_and_esc_closes() {
        let mut v = viewer();
        let [w, h] = v.gallery.container();
        let centre_tile = v.gallery.tile_at([w / 2.0, h / 2.0]);
        v.handle_event(key(KeyCode::Enter));
        while let Ok(item) = v.taps.try_recv() {
            v.open_tile(item);
        }
        assert_eq!(v.open.is_some(), centre_tile.is_some());
        if v.open.is_some() {
            assert!(v.gallery.controller().is_focused());
            v.handle_event(key(KeyCode::Esc));
            assert!(v.open.is_none());
            assert!(!v.gallery.controller().is_focused());
        }
    }

    #[test]
    fn overlay_paints_over_gallery() {
        let mut v = viewer();
        v.open_tile(v.gallery.items()[0].clone());
        v.open.as_mut().unwrap().opened_at = Instant::now() - Duration::from_secs(1);
        let mut canvas = Canvas::new(80, 24);
        v.paint(&mut canvas);
        let (x, y, _, _) = v.overlay_rect(Instant::now());
        assert_eq!(canvas.get(x as usize, y as usize).unwrap().ch, '·');
    }
}
