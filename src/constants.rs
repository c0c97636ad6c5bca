// --- World ---
pub const WORLD_WIDTH: f64 = 800.0;
pub const WORLD_HEIGHT: f64 = 600.0;
pub const FPS: u64 = 60;

// --- Colors ---
pub type Rgb = (u8, u8, u8);
pub const WHITE: Rgb = (255, 255, 255);
pub const BLACK: Rgb = (0, 0, 0);
pub const RED: Rgb = (255, 0, 0);
pub const BLUE: Rgb = (0, 100, 255);
pub const YELLOW: Rgb = (255, 255, 0);
pub const BROWN: Rgb = (139, 69, 19);
pub const GRAY: Rgb = (169, 169, 169);

// --- Player ---
pub const PLAYER_WIDTH: u32 = 60;
pub const PLAYER_HEIGHT: u32 = 75;
pub const PLAYER_SPEED: f64 = 5.0; // Horizontal units per frame
pub const PLAYER_MARGIN: f64 = 20.0;
pub const PLAYER_BOTTOM_OFFSET: f64 = 50.0;
pub const MUZZLE_OFFSET: f64 = 38.0;

// --- Bullet ---
pub const BULLET_WIDTH: u32 = 4;
pub const BULLET_HEIGHT: u32 = 12;
pub const BULLET_SPEED: f64 = 10.0;
pub const BULLET_LIFETIME: u32 = 60; // Frames

// --- Asteroids ---
pub const SPLIT_OFFSET: f64 = 10.0;
pub const ASTEROID_MAX_SPIN: f64 = 3.0; // Degrees per frame

// --- Game rules ---
pub const STARTING_LIVES: u32 = 3;
pub const INITIAL_SPAWN_DELAY: u32 = 120; // 2 seconds between spawns
pub const MIN_SPAWN_DELAY: u32 = 30;
pub const SPAWN_DELAY_STEP_PER_LEVEL: u32 = 10;
pub const INVULNERABILITY_FRAMES: i32 = 180; // 3 seconds
pub const BLINK_PERIOD: i32 = 30;
pub const POINTS_PER_LEVEL: u32 = 500;

// --- Background ---
pub const STAR_COUNT: usize = 100;

// --- Assets ---
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const SPACESHIP_IMAGE: &str = "spaceship.png";
pub const ASTEROID_LARGE_IMAGE: &str = "asteroid_large.png";
pub const ASTEROID_MEDIUM_IMAGE: &str = "asteroid_medium.png";
pub const ASTEROID_SMALL_IMAGE: &str = "asteroid_small.png";
pub const LASER_SOUND: &str = "laser.wav";

// --- Terminal ---
pub const KEY_HOLD_FRAMES: u64 = 30; // Held-key window when release events are unavailable
pub const DEBUG_WIDTH: u16 = 80;
pub const DEBUG_HEIGHT: u16 = 24;
pub const DEFAULT_LOG_FILE: &str = "asteroids.log";
