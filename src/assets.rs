//! Sprite surfaces and sounds.
//!
//! Images are optional: anything missing from the assets directory is replaced
//! by a procedurally drawn [`Surface`], and a missing laser sound by
//! [`SilentSound`]. Loading problems are logged and never abort the game.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rand::Rng;

use crate::constants::*;
use crate::error::GameResult;

/// A small pixel canvas; `None` pixels are transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Option<Rgb>>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Surface { width, height, pixels: vec![None; (width * height) as usize] }
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Surface { width, height, pixels: vec![Some(color); (width * height) as usize] }
    }

    /// Converts decoded RGBA data; pixels at least half opaque are kept.
    pub fn from_rgba(image: &image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| if p[3] >= 128 { Some((p[0], p[1], p[2])) } else { None })
            .collect();
        Surface { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.pixels[(y as u32 * self.width + x as u32) as usize]
    }

    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        self.pixels[(y as u32 * self.width + x as u32) as usize] = Some(color);
    }

    #[cfg(test)]
    pub fn opaque_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }

    /// Looks up the pixel at `offset` from the surface centre after rotating
    /// the surface `angle_degrees` counter-clockwise on screen.
    pub fn sample_rotated(&self, offset_x: f64, offset_y: f64, angle_degrees: f64) -> Option<Rgb> {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        let src_x = offset_x * cos - offset_y * sin + self.width as f64 / 2.0;
        let src_y = offset_x * sin + offset_y * cos + self.height as f64 / 2.0;
        self.pixel(src_x.floor() as i64, src_y.floor() as i64)
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb) {
        for py in y..y + height as i64 {
            for px in x..x + width as i64 {
                self.set_pixel(px, py, color);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        let (min_x, max_x) = ((cx - radius).floor() as i64, (cx + radius).ceil() as i64);
        let (min_y, max_y) = ((cy - radius).floor() as i64, (cy + radius).ceil() as i64);
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }

    /// Even-odd scanline fill, sampled at pixel centres.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i64;
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;

        for py in min_y.max(0)..=max_y.min(self.height as i64 - 1) {
            let sy = py as f64 + 0.5;
            let mut crossings: Vec<f64> = Vec::new();
            for i in 0..points.len() {
                let (x0, y0) = points[i];
                let (x1, y1) = points[(i + 1) % points.len()];
                if (y0 <= sy && sy < y1) || (y1 <= sy && sy < y0) {
                    crossings.push(x0 + (sy - y0) / (y1 - y0) * (x1 - x0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil() as i64;
                let end = (span[1] - 0.5).floor() as i64;
                for px in start..=end {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }

    /// One-pixel closed outline.
    pub fn outline_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i64;
            for step in 0..=steps {
                let t = step as f64 / steps as f64;
                let x = (x0 + (x1 - x0) * t).floor() as i64;
                let y = (y0 + (y1 - y0) * t).floor() as i64;
                // Points on the far edge belong to the last row/column
                self.set_pixel(x.min(self.width as i64 - 1), y.min(self.height as i64 - 1), color);
            }
        }
    }
}

// --- Image loading ---

/// Loads `dir/filename`, optionally scaled to `size`. Missing or unreadable
/// images are logged and yield `None` so the caller can draw a fallback.
pub fn load_image(dir: &Path, filename: &str, size: Option<(u32, u32)>) -> Option<Surface> {
    let path = dir.join(filename);
    if !path.exists() {
        warn!("Image {} not found at {}", filename, path.display());
        return None;
    }
    match decode_image(&path, size) {
        Ok(surface) => {
            info!("Loaded image {} ({}x{})", filename, surface.width(), surface.height());
            Some(surface)
        }
        Err(e) => {
            error!("Error loading image {}: {}", filename, e);
            None
        }
    }
}

fn decode_image(path: &Path, size: Option<(u32, u32)>) -> GameResult<Surface> {
    let mut img = image::open(path)?;
    if let Some((width, height)) = size {
        img = img.resize_exact(width, height, image::imageops::FilterType::Nearest);
    }
    Ok(Surface::from_rgba(&img.to_rgba8()))
}

/// Creates the assets directory when missing. Returns whether it was created.
pub fn ensure_assets_dir(dir: &Path) -> io::Result<bool> {
    if dir.exists() {
        return Ok(false);
    }
    info!("Creating assets directory at {}", dir.display());
    fs::create_dir_all(dir)?;
    info!(
        "Add {}, {}, {} and {} to {} to replace the generated shapes",
        SPACESHIP_IMAGE,
        ASTEROID_LARGE_IMAGE,
        ASTEROID_MEDIUM_IMAGE,
        ASTEROID_SMALL_IMAGE,
        dir.display()
    );
    Ok(true)
}

// --- Procedural fallbacks ---

pub fn generate_ship() -> Surface {
    let mut surface = Surface::new(PLAYER_WIDTH, PLAYER_HEIGHT);
    let hull = [(30.0, 0.0), (0.0, 75.0), (60.0, 75.0)];
    surface.fill_polygon(&hull, BLUE);
    surface.fill_polygon(&[(30.0, 15.0), (22.0, 45.0), (38.0, 45.0)], YELLOW);
    surface.fill_rect(8, 67, 15, 8, RED);
    surface.fill_rect(37, 67, 15, 8, RED);
    surface.outline_polygon(&hull, WHITE);
    surface
}

pub fn generate_bullet() -> Surface {
    Surface::filled(BULLET_WIDTH, BULLET_HEIGHT, YELLOW)
}

/// A rough rock: jagged polygon, a few craters and an outline.
pub fn generate_asteroid(radius: u32, color: Rgb, rng: &mut impl Rng) -> Surface {
    let r = radius as f64;
    let mut surface = Surface::new(radius * 2, radius * 2);

    let vertex_count = rng.gen_range(8..=12);
    let points: Vec<(f64, f64)> = (0..vertex_count)
        .map(|i| {
            let angle = (i as f64 * (360.0 / vertex_count as f64)).to_radians();
            let distance = r * rng.gen_range(0.7..=1.3);
            (r + angle.cos() * distance, r + angle.sin() * distance)
        })
        .collect();
    surface.fill_polygon(&points, color);

    let crater_color = (color.0 / 2, color.1 / 2, color.2 / 2);
    let crater_max = (radius / 3).max(2);
    for _ in 0..3 {
        let cx = rng.gen_range(radius / 2..=radius * 3 / 2);
        let cy = rng.gen_range(radius / 2..=radius * 3 / 2);
        let crater_radius = rng.gen_range(2..=crater_max);
        surface.fill_circle(cx as f64, cy as f64, crater_radius as f64, crater_color);
    }

    surface.outline_polygon(&points, WHITE);
    surface
}

// --- Sound ---

pub trait Sound {
    fn play(&self);
}

/// Stand-in used when the sound file is missing or audio is unavailable.
pub struct SilentSound;

impl Sound for SilentSound {
    fn play(&self) {}
}

#[cfg(feature = "audio")]
mod audio {
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;

    use log::warn;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};

    use super::Sound;
    use crate::error::{GameError, GameResult};

    pub struct RodioSound {
        // Dropping the stream stops playback
        _stream: OutputStream,
        handle: OutputStreamHandle,
        data: Vec<u8>,
    }

    impl RodioSound {
        pub fn open(path: &Path) -> GameResult<Self> {
            let data = fs::read(path)?;
            Decoder::new(Cursor::new(data.clone()))
                .map_err(|e| GameError::Audio(format!("Failed to decode {}: {}", path.display(), e)))?;
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| GameError::Audio(format!("No audio output: {}", e)))?;
            Ok(RodioSound { _stream: stream, handle, data })
        }
    }

    impl Sound for RodioSound {
        fn play(&self) {
            match Decoder::new(Cursor::new(self.data.clone())) {
                Ok(source) => {
                    if let Err(e) = self.handle.play_raw(source.convert_samples()) {
                        warn!("Failed to play sound: {}", e);
                    }
                }
                Err(e) => warn!("Failed to decode sound: {}", e),
            }
        }
    }
}

/// Opens `dir/filename` for playback, falling back to [`SilentSound`].
pub fn load_sound(dir: &Path, filename: &str) -> Box<dyn Sound> {
    let path = dir.join(filename);
    if !path.exists() {
        warn!("{} not found, using silent sound", path.display());
        return Box::new(SilentSound);
    }
    open_sound(&path)
}

#[cfg(feature = "audio")]
fn open_sound(path: &Path) -> Box<dyn Sound> {
    match audio::RodioSound::open(path) {
        Ok(sound) => {
            info!("Loaded sound {}", path.display());
            Box::new(sound)
        }
        Err(e) => {
            warn!("{}, using silent sound", e);
            Box::new(SilentSound)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_sound(path: &Path) -> Box<dyn Sound> {
    info!("Built without audio support, {} stays silent", path.display());
    Box::new(SilentSound)
}

// --- Asset set ---

/// Everything loaded once at startup.
pub struct Assets {
    ship: Option<Surface>,
    // Indexed large, medium, small
    asteroids: [Option<Surface>; 3],
    pub laser: Box<dyn Sound>,
    pub dir: PathBuf,
}

impl Assets {
    pub fn load(dir: &Path) -> Self {
        let ship = load_image(dir, SPACESHIP_IMAGE, Some((PLAYER_WIDTH, PLAYER_HEIGHT)));
        let asteroids = [
            load_image(dir, ASTEROID_LARGE_IMAGE, Some((80, 80))),
            load_image(dir, ASTEROID_MEDIUM_IMAGE, Some((40, 40))),
            load_image(dir, ASTEROID_SMALL_IMAGE, Some((20, 20))),
        ];
        let laser = load_sound(dir, LASER_SOUND);
        Assets { ship, asteroids, laser, dir: dir.to_path_buf() }
    }

    /// No files at all: every sprite is generated and the laser is silent.
    #[cfg(test)]
    pub fn procedural() -> Self {
        Assets {
            ship: None,
            asteroids: [None, None, None],
            laser: Box::new(SilentSound),
            dir: PathBuf::new(),
        }
    }

    pub fn ship_surface(&self) -> Surface {
        self.ship.clone().unwrap_or_else(generate_ship)
    }

    /// `index` is 0 for large, 1 for medium, 2 for small.
    pub fn asteroid_image(&self, index: usize) -> Option<&Surface> {
        self.asteroids.get(index).and_then(Option::as_ref)
    }
}
