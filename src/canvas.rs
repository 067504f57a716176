use std::io::{self, Write};

use crossterm::style::{Color, Print, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor::MoveTo, queue};

use crate::math::edge_function;

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Scales each channel by `intensity`, saturating at 255.
    pub fn scaled(self, intensity: f64) -> Rgb {
        let scale = |c: u8| (c as f64 * intensity).clamp(0.0, 255.0) as u8;
        Rgb(scale(self.0), scale(self.1), scale(self.2))
    }

    pub fn grayscale(self) -> Rgb {
        let l = (0.299 * self.0 as f64 + 0.587 * self.1 as f64 + 0.114 * self.2 as f64).round() as u8;
        Rgb(l, l, l)
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb {
            r: rgb.0,
            g: rgb.1,
            b: rgb.2,
        }
    }
}

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    pub fn blank(bg: Rgb) -> Self {
        Cell {
            ch: ' ',
            fg: Rgb::WHITE,
            bg,
        }
    }
}

/// Screen-space vertex for [`Canvas::fill_triangle`]: cell coordinates, view
/// depth (larger is closer) and a texture coordinate.
#[derive(Debug, Clone, Copy)]
pub struct CanvasVertex {
    pub position: [f64; 2],
    pub depth: f64,
    pub uv: [f64; 2],
}

/// A character-cell framebuffer with a depth buffer.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    z_buffer: Vec<f64>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![Cell::blank(Rgb::BLACK); width * height],
            z_buffer: vec![f64::NEG_INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, bg: Rgb) {
        self.cells.fill(Cell::blank(bg));
        self.z_buffer.fill(f64::NEG_INFINITY);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn put(&mut self, x: isize, y: isize, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    /// Writes `text` left to right from `(x, y)`, clipped to the canvas.
    pub fn put_text(&mut self, x: isize, y: isize, text: &str, fg: Rgb, bg: Rgb) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i as isize, y, Cell { ch, fg, bg });
        }
    }

    /// Like [`Canvas::put_text`] but keeps each cell's existing background.
    pub fn overlay_text(&mut self, x: isize, y: isize, text: &str, fg: Rgb) {
        for (i, ch) in text.chars().enumerate() {
            let (cx, cy) = (x + i as isize, y);
            if cx < 0 || cy < 0 {
                continue;
            }
            if let Some(bg) = self.get(cx as usize, cy as usize).map(|c| c.bg) {
                self.put(cx, cy, Cell { ch, fg, bg });
            }
        }
    }

    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, bg: Rgb) {
        for row in 0..h as isize {
            for col in 0..w as isize {
                self.put(x + col, y + row, Cell::blank(bg));
            }
        }
    }

    /// Rasterises a triangle with depth testing.
    ///
    /// `shade` gets the interpolated texture coordinate and returns the cell to
    /// write, or `None` to leave the cell (and its depth) untouched.
    pub fn fill_triangle(
        &mut self,
        v0: &CanvasVertex,
        v1: &CanvasVertex,
        v2: &CanvasVertex,
        mut shade: impl FnMut([f64; 2]) -> Option<Cell>,
    ) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        // Compute bounding box of the triangle
        let min_x = v0.position[0]
            .min(v1.position[0])
            .min(v2.position[0])
            .floor()
            .max(0.0) as usize;
        let max_x = v0.position[0]
            .max(v1.position[0])
            .max(v2.position[0])
            .ceil()
            .min(self.width as f64 - 1.0);
        let min_y = v0.position[1]
            .min(v1.position[1])
            .min(v2.position[1])
            .floor()
            .max(0.0) as usize;
        let max_y = v0.position[1]
            .max(v1.position[1])
            .max(v2.position[1])
            .ceil()
            .min(self.height as f64 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        let area = edge_function(&v0.position, &v1.position, &v2.position);
        if area.abs() < f64::EPSILON {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];

                // Normalised barycentric weights; all non-negative inside either winding
                let w0 = edge_function(&v1.position, &v2.position, &p) / area;
                let w1 = edge_function(&v2.position, &v0.position, &p) / area;
                let w2 = edge_function(&v0.position, &v1.position, &p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
                let offset = y * self.width + x;
                if depth <= self.z_buffer[offset] {
                    continue;
                }

                let uv = [
                    v0.uv[0] * w0 + v1.uv[0] * w1 + v2.uv[0] * w2,
                    v0.uv[1] * w0 + v1.uv[1] * w1 + v2.uv[1] * w2,
                ];
                if let Some(cell) = shade(uv) {
                    self.z_buffer[offset] = depth;
                    self.cells[offset] = cell;
                }
            }
        }
    }

    /// Draws a line between two cells using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, cell: Cell) {
        let (mut x0, mut y0) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.put(x0, y0, cell);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Queues the whole frame onto `out` without flushing.
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let mut fg = None;
        let mut bg = None;
        for y in 0..self.height {
            queue!(out, MoveTo(0, y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if fg != Some(cell.fg) {
                    queue!(out, SetForegroundColor(cell.fg.into()))?;
                    fg = Some(cell.fg);
                }
                if bg != Some(cell.bg) {
                    queue!(out, SetBackgroundColor(cell.bg.into()))?;
                    bg = Some(cell.bg);
                }
                queue!(out, Print(cell.ch))?;
            }
        }
        Ok(())
    }
}
