use std::f64::consts::PI;

use rand::Rng;

use crate::assets::{Assets, Surface, generate_asteroid, generate_bullet};
use crate::constants::*;
use crate::types::{Rect, Vector2D};

/// Horizontal controls held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Steering {
    pub left: bool,
    pub right: bool,
}

// --- Player ---
pub struct Player {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub speed: f64,
    pub surface: Surface,
}

impl Player {
    pub fn new(surface: Surface) -> Self {
        Player {
            position: Vector2D::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT - PLAYER_BOTTOM_OFFSET),
            velocity: Vector2D::default(),
            speed: PLAYER_SPEED,
            surface,
        }
    }

    /// Moves along the bottom edge only; left wins when both keys are held.
    pub fn update(&mut self, steering: Steering) {
        self.velocity.x = if steering.left {
            -self.speed
        } else if steering.right {
            self.speed
        } else {
            0.0
        };

        self.position.x = (self.position.x + self.velocity.x).clamp(PLAYER_MARGIN, WORLD_WIDTH - PLAYER_MARGIN);
    }

    /// The ship always points up, so bullets always travel up.
    pub fn shoot(&self) -> Bullet {
        Bullet::new(self.position.x, self.position.y - MUZZLE_OFFSET, Vector2D::new(0.0, -1.0))
    }

    /// Half the diagonal of the sprite rect.
    pub fn radius(&self) -> f64 {
        let w = self.surface.width() as f64;
        let h = self.surface.height() as f64;
        0.5 * (w * w + h * h).sqrt()
    }
}

// --- Bullet ---
pub struct Bullet {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub lifetime: u32,
    pub surface: Surface,
}

impl Bullet {
    pub fn new(x: f64, y: f64, direction: Vector2D) -> Self {
        Bullet {
            position: Vector2D::new(x, y),
            velocity: direction.scale(BULLET_SPEED),
            lifetime: BULLET_LIFETIME,
            surface: generate_bullet(),
        }
    }

    pub fn update(&mut self) {
        self.position = self.position.add(self.velocity);
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        self.position.y >= 0.0 && self.lifetime > 0
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.position, self.surface.width() as f64, self.surface.height() as f64)
    }
}

// --- Asteroid ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(&self) -> u32 {
        match self {
            AsteroidSize::Large => 40,
            AsteroidSize::Medium => 20,
            AsteroidSize::Small => 10,
        }
    }

    pub fn speed(&self) -> f64 {
        match self {
            AsteroidSize::Large => 1.0,
            AsteroidSize::Medium => 2.0,
            AsteroidSize::Small => 3.0,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }

    pub fn smaller(&self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    fn image_index(&self) -> usize {
        match self {
            AsteroidSize::Large => 0,
            AsteroidSize::Medium => 1,
            AsteroidSize::Small => 2,
        }
    }

    fn fallback_color(&self) -> Rgb {
        match self {
            AsteroidSize::Large => BROWN,
            _ => GRAY,
        }
    }
}

pub struct Asteroid {
    pub size: AsteroidSize,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub rotation: f64, // Degrees per frame
    pub angle: f64,    // Degrees
    pub surface: Surface,
}

impl Asteroid {
    /// Without a position the asteroid starts just above the top edge at a random x.
    pub fn new(size: AsteroidSize, position: Option<Vector2D>, assets: &Assets, rng: &mut impl Rng) -> Self {
        let radius = size.radius() as f64;
        let surface = match assets.asteroid_image(size.image_index()) {
            Some(image) => image.clone(),
            None => generate_asteroid(size.radius(), size.fallback_color(), rng),
        };

        let position = position.unwrap_or_else(|| {
            Vector2D::new(rng.gen_range(radius..=WORLD_WIDTH - radius), -radius * 2.0)
        });

        let heading = rng.gen_range(PI / 4.0..=PI * 3.0 / 4.0);
        let velocity = Vector2D::from_angle(heading).scale(size.speed());
        let rotation = rng.gen_range(-ASTEROID_MAX_SPIN..=ASTEROID_MAX_SPIN);

        Asteroid { size, position, velocity, rotation, angle: 0.0, surface }
    }

    pub fn radius(&self) -> f64 {
        self.size.radius() as f64
    }

    pub fn points(&self) -> u32 {
        self.size.points()
    }

    pub fn update(&mut self) {
        self.position = self.position.add(self.velocity);
        self.angle += self.rotation;
    }

    /// Falls out of play once fully below the bottom edge.
    pub fn is_alive(&self) -> bool {
        self.position.y <= WORLD_HEIGHT + self.radius()
    }

    /// Bounding box of the rotated square sprite.
    pub fn rect(&self) -> Rect {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let side = 2.0 * self.radius() * (sin.abs() + cos.abs());
        Rect::centered(self.position, side, side)
    }

    pub fn split(&self, assets: &Assets, rng: &mut impl Rng) -> Vec<Asteroid> {
        match self.size.smaller() {
            Some(smaller) => [-SPLIT_OFFSET, SPLIT_OFFSET]
                .iter()
                .map(|dx| {
                    let at = Vector2D::new(self.position.x + dx, self.position.y);
                    Asteroid::new(smaller, Some(at), assets, rng)
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

// --- Background star ---
pub struct Star {
    pub position: Vector2D,
    pub size: u8,
    pub speed: f64,
}

impl Star {
    pub fn new(rng: &mut impl Rng) -> Self {
        Star {
            position: Vector2D::new(rng.gen_range(0.0..=WORLD_WIDTH), rng.gen_range(0.0..=WORLD_HEIGHT)),
            size: rng.gen_range(1..=2),
            speed: rng.gen_range(0.1..=0.3),
        }
    }

    pub fn update(&mut self, rng: &mut impl Rng) {
        self.position.y += self.speed;
        if self.position.y > WORLD_HEIGHT {
            self.position.y = 0.0;
            self.position.x = rng.gen_range(0.0..=WORLD_WIDTH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::generate_ship;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_player_starts_bottom_centre() {
        let player = Player::new(generate_ship());
        assert_eq!(player.position, Vector2D::new(400.0, 550.0));
        assert!((player.radius() - 48.02).abs() < 0.01);
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let mut player = Player::new(generate_ship());
        player.update(Steering { left: true, right: false });
        assert_eq!(player.position.x, 395.0);
        player.update(Steering { left: true, right: true });
        assert_eq!(player.position.x, 390.0);
        player.update(Steering::default());
        assert_eq!(player.position.x, 390.0);
        assert_eq!(player.velocity.x, 0.0);

        for _ in 0..200 {
            player.update(Steering { left: false, right: true });
        }
        assert_eq!(player.position.x, WORLD_WIDTH - PLAYER_MARGIN);
        for _ in 0..200 {
            player.update(Steering { left: true, right: false });
        }
        assert_eq!(player.position.x, PLAYER_MARGIN);
        assert_eq!(player.position.y, 550.0);
    }

    #[test]
    fn test_shoot_spawns_above_ship_moving_up() {
        let player = Player::new(generate_ship());
        let bullet = player.shoot();
        assert_eq!(bullet.position, Vector2D::new(400.0, 512.0));
        assert_eq!(bullet.velocity, Vector2D::new(0.0, -10.0));
        assert_eq!(bullet.lifetime, BULLET_LIFETIME);
    }

    #[test]
    fn test_bullet_dies_offscreen_or_expired() {
        let mut bullet = Bullet::new(100.0, 15.0, Vector2D::new(0.0, -1.0));
        bullet.update();
        assert!(bullet.is_alive());
        bullet.update();
        assert!(!bullet.is_alive());

        // A sideways bullet never leaves through the top, so lifetime ends it
        let mut bullet = Bullet::new(100.0, 300.0, Vector2D::new(1.0, 0.0));
        for _ in 0..BULLET_LIFETIME - 1 {
            bullet.update();
        }
        assert!(bullet.is_alive());
        bullet.update();
        assert!(!bullet.is_alive());
    }

    #[test]
    fn test_asteroid_spawns_above_screen_heading_down() {
        let assets = Assets::procedural();
        let mut rng = rng();
        for _ in 0..50 {
            let asteroid = Asteroid::new(AsteroidSize::Large, None, &assets, &mut rng);
            assert_eq!(asteroid.position.y, -80.0);
            assert!(asteroid.position.x >= 40.0 && asteroid.position.x <= WORLD_WIDTH - 40.0);
            assert!(asteroid.velocity.y > 0.0);
            assert!((asteroid.velocity.length_squared().sqrt() - 1.0).abs() < 1e-9);
            assert!(asteroid.rotation.abs() <= ASTEROID_MAX_SPIN);
            assert_eq!(asteroid.surface.width(), 80);
        }
    }

    #[test]
    fn test_asteroid_leaves_through_bottom() {
        let assets = Assets::procedural();
        let mut rng = rng();
        let mut asteroid =
            Asteroid::new(AsteroidSize::Small, Some(Vector2D::new(400.0, WORLD_HEIGHT + 9.0)), &assets, &mut rng);
        assert!(asteroid.is_alive());
        asteroid.update();
        asteroid.update();
        assert!(!asteroid.is_alive());
    }

    #[test]
    fn test_split_produces_two_smaller_children() {
        let assets = Assets::procedural();
        let mut rng = rng();
        let large = Asteroid::new(AsteroidSize::Large, Some(Vector2D::new(300.0, 200.0)), &assets, &mut rng);
        let children = large.split(&assets, &mut rng);
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.size == AsteroidSize::Medium));
        assert_eq!(children[0].position, Vector2D::new(290.0, 200.0));
        assert_eq!(children[1].position, Vector2D::new(310.0, 200.0));

        let medium_children = children[0].split(&assets, &mut rng);
        assert!(medium_children.iter().all(|c| c.size == AsteroidSize::Small));

        let small = Asteroid::new(AsteroidSize::Small, Some(Vector2D::new(0.0, 0.0)), &assets, &mut rng);
        assert!(small.split(&assets, &mut rng).is_empty());
    }

    #[test]
    fn test_rotated_rect_grows() {
        let assets = Assets::procedural();
        let mut rng = rng();
        let mut asteroid = Asteroid::new(AsteroidSize::Medium, Some(Vector2D::new(0.0, 0.0)), &assets, &mut rng);
        assert!((asteroid.rect().width - 40.0).abs() < 1e-9);
        asteroid.angle = 45.0;
        assert!((asteroid.rect().width - 40.0 * 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_star_wraps_to_top() {
        let mut rng = rng();
        let mut star = Star::new(&mut rng);
        star.position.y = WORLD_HEIGHT - 0.05;
        star.speed = 0.1;
        star.update(&mut rng);
        assert_eq!(star.position.y, 0.0);
        assert!(star.position.x >= 0.0 && star.position.x <= WORLD_WIDTH);
    }
}
