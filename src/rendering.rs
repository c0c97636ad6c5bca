use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, SetForegroundColor},
};
use log::info;

use crate::assets::Surface;
use crate::constants::{BLACK, Rgb, WHITE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::types::Vector2D;

pub const SPRITE_GLYPH: char = '█';

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            if self.cursor_y < self.height && self.cursor_x < self.width {
                self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
            }
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    #[cfg(test)]
    pub fn row_string(&self, y: u16) -> String {
        self.buffer[y as usize].iter().collect()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, MoveTo(x, y)),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(x, y);
                Ok(())
            }
        }
    }

    pub fn set_color(&mut self, color: Rgb) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, SetForegroundColor(to_color(color))),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Colors are meaningless in the log
        }
    }

    /// Grows or shrinks the debug buffer after a resize; stdout needs nothing.
    pub fn resize(&mut self, width: u16, height: u16) {
        if let OutputTarget::ScreenBuffer(sb) = self {
            *sb = ScreenBuffer::new(width, height);
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

fn to_color((r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

// --- GameGrid for colored character rendering ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Rgb,
}

const BLANK: Cell = Cell { ch: ' ', color: BLACK };

pub struct GameGrid {
    pub cells: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            cells: vec![vec![BLANK; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, ch: char, color: Rgb) {
        if y < self.height && x < self.width {
            self.cells[y as usize][x as usize] = Cell { ch, color };
        }
    }

    #[cfg(test)]
    pub fn char_at(&self, x: u16, y: u16) -> char {
        self.cells[y as usize][x as usize].ch
    }

    #[cfg(test)]
    pub fn row_string(&self, y: u16) -> String {
        self.cells[y as usize].iter().map(|cell| cell.ch).collect()
    }

    /// Writes `text` left to right, clipped at the grid edge.
    pub fn put_text(&mut self, x: u16, y: u16, text: &str, color: Rgb) {
        for (i, ch) in text.chars().enumerate() {
            self.set_char(x.saturating_add(i as u16), y, ch, color);
        }
    }

    pub fn put_text_centered(&mut self, y: u16, text: &str, color: Rgb) {
        let x = (self.width / 2).saturating_sub(text.chars().count() as u16 / 2);
        self.put_text(x, y, text, color);
    }

    /// Writes `text` so it ends `margin` cells before the right edge.
    pub fn put_text_right(&mut self, y: u16, margin: u16, text: &str, color: Rgb) {
        let x = self.width.saturating_sub(text.chars().count() as u16 + margin);
        self.put_text(x, y, text, color);
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(BLANK);
        }
    }

    /// Emits every row, switching color only between runs.
    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        let mut current: Option<Rgb> = None;
        for y in 0..self.height {
            stdout.move_to(0, y)?;
            let mut run = String::new();
            for cell in &self.cells[y as usize] {
                if current != Some(cell.color) && cell.ch != ' ' {
                    if !run.is_empty() {
                        write!(stdout, "{}", run)?;
                        run.clear();
                    }
                    stdout.set_color(cell.color)?;
                    current = Some(cell.color);
                }
                run.push(cell.ch);
            }
            write!(stdout, "{}", run)?;
        }
        stdout.set_color(WHITE)?;
        Ok(())
    }
}

// --- World to cell projection ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Viewport { cols, rows }
    }

    fn cell_width(&self) -> f64 {
        WORLD_WIDTH / self.cols.max(1) as f64
    }

    fn cell_height(&self) -> f64 {
        WORLD_HEIGHT / self.rows.max(1) as f64
    }

    pub fn to_cell(&self, point: Vector2D) -> Option<(u16, u16)> {
        let col = (point.x / self.cell_width()).floor();
        let row = (point.y / self.cell_height()).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    pub fn cell_center(&self, col: u16, row: u16) -> Vector2D {
        Vector2D::new(
            (col as f64 + 0.5) * self.cell_width(),
            (row as f64 + 0.5) * self.cell_height(),
        )
    }

    pub fn plot(&self, grid: &mut GameGrid, point: Vector2D, ch: char, color: Rgb) {
        if let Some((col, row)) = self.to_cell(point) {
            grid.set_char(col, row, ch, color);
        }
    }

    /// Draws `surface` centred on `center`, rotated `angle_degrees`
    /// counter-clockwise. Each covered cell takes the pixel under its centre;
    /// a sprite smaller than one cell still lights the cell it sits in.
    pub fn blit_surface(&self, grid: &mut GameGrid, surface: &Surface, center: Vector2D, angle_degrees: f64) {
        let w = surface.width() as f64;
        let h = surface.height() as f64;
        let reach = 0.5 * (w * w + h * h).sqrt();

        let (cw, ch) = (self.cell_width(), self.cell_height());
        let first_col = ((center.x - reach) / cw).floor().max(0.0) as i64;
        let last_col = ((center.x + reach) / cw).ceil().min(self.cols as f64 - 1.0) as i64;
        let first_row = ((center.y - reach) / ch).floor().max(0.0) as i64;
        let last_row = ((center.y + reach) / ch).ceil().min(self.rows as f64 - 1.0) as i64;

        let mut drawn = false;
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let cell = self.cell_center(col as u16, row as u16);
                if let Some(color) = surface.sample_rotated(cell.x - center.x, cell.y - center.y, angle_degrees) {
                    grid.set_char(col as u16, row as u16, SPRITE_GLYPH, color);
                    drawn = true;
                }
            }
        }

        if !drawn {
            if let Some(color) = dominant_color(surface) {
                self.plot(grid, center, SPRITE_GLYPH, color);
            }
        }
    }
}

/// Centre pixel if opaque, else the first opaque pixel.
fn dominant_color(surface: &Surface) -> Option<Rgb> {
    let (w, h) = (surface.width() as i64, surface.height() as i64);
    surface.pixel(w / 2, h / 2).or_else(|| {
        (0..h).flat_map(|y| (0..w).map(move |x| (x, y))).find_map(|(x, y)| surface.pixel(x, y))
    })
}
