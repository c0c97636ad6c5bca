//! The game controller: entity lists, score, lives and level, plus the
//! spawning, collision and scoring rules applied once per frame.

use log::{debug, info};
use rand::rngs::StdRng;

use crate::assets::Assets;
use crate::constants::*;
use crate::entities::{Asteroid, AsteroidSize, Bullet, Player, Star, Steering};
use crate::rendering::{GameGrid, Viewport};
use crate::terminal_io::Command;
use crate::types::circles_touch;

pub struct Game {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub asteroids: Vec<Asteroid>,
    pub stars: Vec<Star>,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub game_over: bool,
    pub asteroid_spawn_timer: u32,
    pub asteroid_spawn_delay: u32,
    pub invulnerable: bool,
    pub invulnerable_timer: i32,
    assets: Assets,
    rng: StdRng,
}

impl Game {
    pub fn new(assets: Assets, mut rng: StdRng) -> Self {
        let stars = (0..STAR_COUNT).map(|_| Star::new(&mut rng)).collect();
        Game {
            player: Player::new(assets.ship_surface()),
            bullets: Vec::new(),
            asteroids: Vec::new(),
            stars,
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            game_over: false,
            asteroid_spawn_timer: 0,
            asteroid_spawn_delay: INITIAL_SPAWN_DELAY,
            invulnerable: false,
            invulnerable_timer: 0,
            assets,
            rng,
        }
    }

    /// Starts a fresh round. The starfield keeps drifting.
    pub fn reset(&mut self) {
        info!("Restarting game. Previous score: {}, level: {}", self.score, self.level);
        self.player = Player::new(self.assets.ship_surface());
        self.bullets.clear();
        self.asteroids.clear();
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.level = 1;
        self.game_over = false;
        self.asteroid_spawn_timer = 0;
        self.asteroid_spawn_delay = INITIAL_SPAWN_DELAY;
        self.invulnerable = false;
        self.invulnerable_timer = 0;
    }

    pub fn spawn_asteroid(&mut self) {
        let asteroid = Asteroid::new(AsteroidSize::Large, None, &self.assets, &mut self.rng);
        debug!("Asteroid spawned at x: {:.1}", asteroid.position.x);
        self.asteroids.push(asteroid);
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Fire if !self.game_over => self.fire(),
            Command::Restart if self.game_over => self.reset(),
            _ => {}
        }
    }

    fn fire(&mut self) {
        self.assets.laser.play();
        self.bullets.push(self.player.shoot());
    }

    /// Spawn delay for the current level, never below the minimum.
    pub fn spawn_delay_for_level(level: u32) -> u32 {
        INITIAL_SPAWN_DELAY
            .saturating_sub(level.saturating_mul(SPAWN_DELAY_STEP_PER_LEVEL))
            .max(MIN_SPAWN_DELAY)
    }

    /// Advances one frame. Nothing moves once the game is over.
    pub fn update(&mut self, steering: Steering) {
        if self.game_over {
            return;
        }

        if self.invulnerable {
            self.invulnerable_timer -= 1;
            if self.invulnerable_timer <= 0 {
                self.invulnerable = false;
                debug!("Invulnerability ended");
            }
        }

        self.player.update(steering);
        for bullet in &mut self.bullets {
            bullet.update();
        }
        self.bullets.retain(Bullet::is_alive);
        for asteroid in &mut self.asteroids {
            asteroid.update();
        }
        self.asteroids.retain(Asteroid::is_alive);

        self.asteroid_spawn_timer += 1;
        if self.asteroid_spawn_timer >= self.asteroid_spawn_delay {
            self.spawn_asteroid();
            self.asteroid_spawn_timer = 0;
            self.asteroid_spawn_delay = Game::spawn_delay_for_level(self.level);
        }

        self.resolve_bullet_hits();
        self.resolve_player_hits();

        if self.score >= self.level * POINTS_PER_LEVEL {
            self.level += 1;
            info!("Level up! Now at level {} with score {}", self.level, self.score);
        }

        for star in &mut self.stars {
            star.update(&mut self.rng);
        }
    }

    /// Every overlapping bullet/asteroid pair is destroyed. An asteroid can
    /// only be claimed by the first bullet that reaches it, and fragments join
    /// the field after all hits are settled.
    fn resolve_bullet_hits(&mut self) {
        let mut destroyed = vec![false; self.asteroids.len()];
        let mut spent = vec![false; self.bullets.len()];

        for (bullet_index, bullet) in self.bullets.iter().enumerate() {
            let bullet_rect = bullet.rect();
            for (asteroid_index, asteroid) in self.asteroids.iter().enumerate() {
                if !destroyed[asteroid_index] && bullet_rect.overlaps(&asteroid.rect()) {
                    destroyed[asteroid_index] = true;
                    spent[bullet_index] = true;
                }
            }
        }

        if !destroyed.contains(&true) {
            return;
        }

        let mut index = 0;
        self.bullets.retain(|_| {
            let keep = !spent[index];
            index += 1;
            keep
        });

        let mut fragments = Vec::new();
        for (asteroid, hit) in std::mem::take(&mut self.asteroids).into_iter().zip(destroyed) {
            if hit {
                self.score += asteroid.points();
                info!("Bullet hit {:?} asteroid. Score: {}", asteroid.size, self.score);
                fragments.extend(asteroid.split(&self.assets, &mut self.rng));
            } else {
                self.asteroids.push(asteroid);
            }
        }
        self.asteroids.extend(fragments);
    }

    /// Touching asteroids are removed; however many there are, one life is lost.
    fn resolve_player_hits(&mut self) {
        if self.invulnerable {
            return;
        }

        let position = self.player.position;
        let radius = self.player.radius();
        let before = self.asteroids.len();
        self.asteroids
            .retain(|asteroid| !circles_touch(position, radius, asteroid.position, asteroid.radius()));
        if self.asteroids.len() == before {
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over = true;
            info!("Ship destroyed. Game over with score {} at level {}", self.score, self.level);
        } else {
            self.invulnerable = true;
            self.invulnerable_timer = INVULNERABILITY_FRAMES;
            info!("Ship hit by asteroid. Lives left: {}", self.lives);
        }
    }

    /// The ship blinks while invulnerable.
    pub fn player_visible(&self) -> bool {
        !self.invulnerable || self.invulnerable_timer % BLINK_PERIOD < BLINK_PERIOD / 2
    }

    pub fn draw(&self, grid: &mut GameGrid, viewport: &Viewport) {
        grid.clear();

        for star in &self.stars {
            let glyph = if star.size > 1 { '*' } else { '.' };
            viewport.plot(grid, star.position, glyph, WHITE);
        }

        for asteroid in &self.asteroids {
            viewport.blit_surface(grid, &asteroid.surface, asteroid.position, asteroid.angle);
        }
        for bullet in &self.bullets {
            viewport.blit_surface(grid, &bullet.surface, bullet.position, 0.0);
        }
        if self.player_visible() {
            viewport.blit_surface(grid, &self.player.surface, self.player.position, 0.0);
        }

        grid.put_text(1, 0, &format!("Score: {}", self.score), WHITE);
        grid.put_text(1, 1, &format!("Lives: {}", self.lives), WHITE);
        grid.put_text_right(0, 1, &format!("Level: {}", self.level), WHITE);

        if self.game_over {
            let middle = grid.height / 2;
            grid.put_text_centered(middle.saturating_sub(2), "GAME OVER", RED);
            grid.put_text_centered(middle, "Press R to restart", WHITE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::SPRITE_GLYPH;
    use crate::types::Vector2D;
    use rand::SeedableRng;

    fn new_game() -> Game {
        Game::new(Assets::procedural(), StdRng::seed_from_u64(7))
    }

    fn parked_asteroid(game: &mut Game, size: AsteroidSize, x: f64, y: f64) {
        let mut rng = StdRng::seed_from_u64(99);
        let mut asteroid = Asteroid::new(size, Some(Vector2D::new(x, y)), &Assets::procedural(), &mut rng);
        asteroid.velocity = Vector2D::default();
        asteroid.rotation = 0.0;
        game.asteroids.push(asteroid);
    }

    fn bullet_at(game: &mut Game, x: f64, y: f64) {
        // Placed one step below the target so it lands on it after moving
        game.bullets.push(Bullet::new(x, y + BULLET_SPEED, Vector2D::new(0.0, -1.0)));
    }

    fn idle(game: &mut Game, frames: u32) {
        for _ in 0..frames {
            game.update(Steering::default());
        }
    }

    #[test]
    fn test_new_game_state() {
        let game = new_game();
        assert_eq!((game.score, game.lives, game.level), (0, 3, 1));
        assert!(!game.game_over && !game.invulnerable);
        assert_eq!(game.stars.len(), STAR_COUNT);
        assert_eq!(game.asteroid_spawn_delay, 120);
        assert!(game.asteroids.is_empty() && game.bullets.is_empty());
    }

    #[test]
    fn test_spawn_timer_and_delay() {
        let mut game = new_game();
        idle(&mut game, 119);
        assert!(game.asteroids.is_empty());
        idle(&mut game, 1);
        assert_eq!(game.asteroids.len(), 1);
        assert_eq!(game.asteroid_spawn_timer, 0);
        assert_eq!(game.asteroid_spawn_delay, 110);
        assert_eq!(game.asteroids[0].size, AsteroidSize::Large);
    }

    #[test]
    fn test_spawn_delay_floor() {
        assert_eq!(Game::spawn_delay_for_level(1), 110);
        assert_eq!(Game::spawn_delay_for_level(9), 30);
        assert_eq!(Game::spawn_delay_for_level(10), 30);
        assert_eq!(Game::spawn_delay_for_level(500), 30);
    }

    #[test]
    fn test_fire_adds_bullet_unless_game_over() {
        let mut game = new_game();
        game.handle_command(Command::Fire);
        assert_eq!(game.bullets.len(), 1);
        game.game_over = true;
        game.handle_command(Command::Fire);
        assert_eq!(game.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_splits_large_asteroid() {
        let mut game = new_game();
        parked_asteroid(&mut game, AsteroidSize::Large, 200.0, 200.0);
        bullet_at(&mut game, 200.0, 200.0);
        game.update(Steering::default());

        assert_eq!(game.score, 20);
        assert!(game.bullets.is_empty());
        assert_eq!(game.asteroids.len(), 2);
        assert!(game.asteroids.iter().all(|a| a.size == AsteroidSize::Medium));
    }

    #[test]
    fn test_small_asteroid_vanishes() {
        let mut game = new_game();
        parked_asteroid(&mut game, AsteroidSize::Small, 200.0, 200.0);
        bullet_at(&mut game, 200.0, 200.0);
        game.update(Steering::default());
        assert_eq!(game.score, 100);
        assert!(game.asteroids.is_empty());
    }

    #[test]
    fn test_asteroid_scores_once_for_two_bullets() {
        let mut game = new_game();
        parked_asteroid(&mut game, AsteroidSize::Small, 200.0, 200.0);
        bullet_at(&mut game, 198.0, 200.0);
        bullet_at(&mut game, 202.0, 200.0);
        game.update(Steering::default());
        assert_eq!(game.score, 100);
        // The second bullet found nothing left to hit
        assert_eq!(game.bullets.len(), 1);
    }

    #[test]
    fn test_one_bullet_can_destroy_overlapping_asteroids() {
        let mut game = new_game();
        parked_asteroid(&mut game, AsteroidSize::Small, 195.0, 200.0);
        parked_asteroid(&mut game, AsteroidSize::Medium, 205.0, 200.0);
        bullet_at(&mut game, 200.0, 200.0);
        game.update(Steering::default());
        assert_eq!(game.score, 150);
        assert!(game.bullets.is_empty());
        assert_eq!(game.asteroids.len(), 2);
        assert!(game.asteroids.iter().all(|a| a.size == AsteroidSize::Small));
    }

    #[test]
    fn test_fragments_are_not_hit_in_the_same_frame() {
        let mut game = new_game();
        parked_asteroid(&mut game, AsteroidSize::Large, 200.0, 200.0);
        bullet_at(&mut game, 200.0, 200.0);
        bullet_at(&mut game, 200.0, 200.0);
        game.update(Steering::default());
        assert_eq!(game.score, 20);
        assert_eq!(game.bullets.len(), 1);
    }

    #[test]
    fn test_player_hit_costs_one_life_and_grants_invulnerability() {
        let mut game = new_game();
        let (x, y) = (game.player.position.x, game.player.position.y);
        parked_asteroid(&mut game, AsteroidSize::Small, x, y - 30.0);
        parked_asteroid(&mut game, AsteroidSize::Small, x + 20.0, y);
        game.update(Steering::default());

        assert_eq!(game.lives, 2);
        assert!(game.asteroids.is_empty());
        assert!(game.invulnerable);
        assert_eq!(game.invulnerable_timer, INVULNERABILITY_FRAMES);

        // Ignored while invulnerable
        parked_asteroid(&mut game, AsteroidSize::Small, x, y);
        game.update(Steering::default());
        assert_eq!(game.lives, 2);
        assert_eq!(game.asteroids.len(), 1);
    }

    #[test]
    fn test_invulnerability_runs_out() {
        let mut game = new_game();
        game.invulnerable = true;
        game.invulnerable_timer = INVULNERABILITY_FRAMES;
        idle(&mut game, (INVULNERABILITY_FRAMES - 1) as u32);
        assert!(game.invulnerable);
        idle(&mut game, 1);
        assert!(!game.invulnerable);
    }

    #[test]
    fn test_far_asteroid_does_not_hit_player() {
        let mut game = new_game();
        let (x, y) = (game.player.position.x, game.player.position.y);
        // Player radius ~48 plus small radius 10
        parked_asteroid(&mut game, AsteroidSize::Small, x + 60.0, y);
        game.update(Steering::default());
        assert_eq!(game.lives, 3);
        assert_eq!(game.asteroids.len(), 1);
    }

    #[test]
    fn test_last_life_ends_game_and_restart_resets() {
        let mut game = new_game();
        game.lives = 1;
        game.score = 120;
        let (x, y) = (game.player.position.x, game.player.position.y);
        parked_asteroid(&mut game, AsteroidSize::Large, x, y);
        game.update(Steering::default());
        assert!(game.game_over);
        assert_eq!(game.lives, 0);
        assert!(!game.invulnerable);

        // Frozen until restart
        let timer = game.asteroid_spawn_timer;
        idle(&mut game, 10);
        assert_eq!(game.asteroid_spawn_timer, timer);

        game.handle_command(Command::Restart);
        assert!(!game.game_over);
        assert_eq!((game.score, game.lives, game.level), (0, 3, 1));
        assert_eq!(game.stars.len(), STAR_COUNT);
    }

    #[test]
    fn test_restart_resets_round_but_keeps_starfield() {
        let mut game = new_game();
        idle(&mut game, 5);
        let (x, y) = (game.player.position.x, game.player.position.y);
        parked_asteroid(&mut game, AsteroidSize::Medium, 100.0, 100.0);
        bullet_at(&mut game, 700.0, 300.0);
        game.player.position.x = 150.0;
        game.score = 1200;
        game.level = 3;
        game.lives = 0;
        game.game_over = true;
        game.invulnerable = true;
        game.invulnerable_timer = 42;
        game.asteroid_spawn_timer = 17;
        game.asteroid_spawn_delay = 90;
        let stars: Vec<Vector2D> = game.stars.iter().map(|star| star.position).collect();

        game.handle_command(Command::Restart);

        assert!(!game.game_over);
        assert!(game.bullets.is_empty());
        assert!(game.asteroids.is_empty());
        assert_eq!(game.player.position, Vector2D::new(x, y));
        assert_eq!((game.score, game.lives, game.level), (0, STARTING_LIVES, 1));
        assert!(!game.invulnerable);
        assert_eq!(game.invulnerable_timer, 0);
        assert_eq!(game.asteroid_spawn_timer, 0);
        assert_eq!(game.asteroid_spawn_delay, INITIAL_SPAWN_DELAY);
        let after: Vec<Vector2D> = game.stars.iter().map(|star| star.position).collect();
        assert_eq!(after, stars);
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut game = new_game();
        game.score = 40;
        game.handle_command(Command::Restart);
        assert_eq!(game.score, 40);
    }

    #[test]
    fn test_level_up_one_step_per_frame() {
        let mut game = new_game();
        game.score = 499;
        game.update(Steering::default());
        assert_eq!(game.level, 1);
        game.score = 5000;
        game.update(Steering::default());
        assert_eq!(game.level, 2);
        game.update(Steering::default());
        assert_eq!(game.level, 3);
    }

    #[test]
    fn test_steering_moves_player() {
        let mut game = new_game();
        game.update(Steering { left: false, right: true });
        assert_eq!(game.player.position.x, 405.0);
    }

    #[test]
    fn test_draw_hud_and_overlay() {
        let mut game = new_game();
        game.score = 70;
        let viewport = Viewport::new(80, 24);
        let mut grid = GameGrid::new(80, 24);
        game.draw(&mut grid, &viewport);
        assert!(grid.row_string(0).contains("Score: 70"));
        assert!(grid.row_string(0).contains("Level: 1"));
        assert!(grid.row_string(1).contains("Lives: 3"));
        assert!(!grid.row_string(10).contains("GAME OVER"));

        game.game_over = true;
        game.draw(&mut grid, &viewport);
        assert!(grid.row_string(10).contains("GAME OVER"));
        assert!(grid.row_string(12).contains("Press R to restart"));
    }

    #[test]
    fn test_player_blinks_while_invulnerable() {
        let mut game = new_game();
        let viewport = Viewport::new(80, 24);
        let mut grid = GameGrid::new(80, 24);
        let (col, row) = viewport.to_cell(game.player.position).unwrap();

        game.draw(&mut grid, &viewport);
        assert_eq!(grid.char_at(col, row), SPRITE_GLYPH);

        game.invulnerable = true;
        game.invulnerable_timer = 20;
        assert!(!game.player_visible());
        game.draw(&mut grid, &viewport);
        assert_ne!(grid.char_at(col, row), SPRITE_GLYPH);

        game.invulnerable_timer = 10;
        assert!(game.player_visible());
    }
}
