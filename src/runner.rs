use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use log::{error, info};

use crate::constants::{FPS, WHITE};
use crate::game::Game;
use crate::rendering::{GameGrid, OutputTarget, Viewport};
use crate::terminal_io::{Command, InputState, SimulatedInput};

const INSTRUCTIONS: [&str; 4] = [
    "Left/Right arrows to move",
    "Space to shoot",
    "Destroy asteroids to score points",
    "Press any key to start",
];

/// Drives the title screen and the fixed-rate input/update/draw loop.
pub struct Runner {
    stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    input: InputState,
    grid: GameGrid,
    viewport: Viewport,
    max_frames: Option<u64>,
    frame_count: u64,
}

impl Runner {
    pub fn new(
        width: u16,
        height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        release_events: bool,
        max_frames: Option<u64>,
    ) -> Self {
        Runner {
            stdout_target,
            simulated_input,
            input: InputState::new(release_events),
            grid: GameGrid::new(width, height),
            viewport: Viewport::new(width, height),
            max_frames,
            frame_count: 0,
        }
    }

    fn debug_mode_active(&self) -> bool {
        self.simulated_input.is_some()
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn run(&mut self, game: &mut Game) -> io::Result<()> {
        if !self.debug_mode_active() && !self.show_title_screen()? {
            info!("Quit from title screen.");
            return Ok(());
        }
        info!("Starting game loop.");

        let frame_duration = Duration::from_micros(1_000_000 / FPS);
        let mut next_frame = Instant::now() + frame_duration;

        while self.max_frames.map_or(true, |max| self.frame_count < max) {
            let mut quit = false;
            for event in self.collect_events()? {
                match self.input.handle_event(&event, self.frame_count) {
                    Some(Command::Quit) => quit = true,
                    Some(Command::Resize(width, height)) => self.resize(width, height),
                    Some(command) => game.handle_command(command),
                    None => {}
                }
            }
            if quit {
                info!("Quit requested at frame {}.", self.frame_count);
                break;
            }

            game.update(self.input.steering(self.frame_count));
            game.draw(&mut self.grid, &self.viewport);
            self.present()?;
            self.frame_count += 1;

            if !self.debug_mode_active() {
                let now = Instant::now();
                if next_frame > now {
                    thread::sleep(next_frame - now);
                    next_frame += frame_duration;
                } else {
                    // Running behind; don't try to catch up
                    next_frame = now + frame_duration;
                }
            }
        }

        info!(
            "Game loop ended after {} frames. Score: {}, level: {}, lives: {}",
            self.frame_count, game.score, game.level, game.lives
        );
        Ok(())
    }

    /// Every event available this frame, without blocking.
    fn collect_events(&mut self) -> io::Result<Vec<Event>> {
        if let Some(script) = &mut self.simulated_input {
            return Ok(script.take(self.frame_count));
        }

        let mut events = Vec::new();
        while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
        }
        Ok(events)
    }

    fn resize(&mut self, width: u16, height: u16) {
        info!("Terminal resized to {}x{}", width, height);
        self.grid = GameGrid::new(width, height);
        self.viewport = Viewport::new(width, height);
        self.stdout_target.resize(width, height);
    }

    fn present(&mut self) -> io::Result<()> {
        self.grid
            .render(&mut self.stdout_target)
            .map_err(|e| { error!("Failed to render game grid: {}", e); e })?;
        self.stdout_target
            .flush()
            .map_err(|e| { error!("Failed to flush stdout after rendering: {}", e); e })?;
        if let OutputTarget::ScreenBuffer(sb) = &self.stdout_target {
            sb.print_to_log();
        }
        Ok(())
    }

    pub fn draw_title(&mut self) {
        self.grid.clear();
        let height = self.grid.height;
        self.grid.put_text_centered(height / 4, "ASTEROIDS", WHITE);
        // Two rows per line when there is room
        let spacing = if height >= 20 { 2 } else { 1 };
        for (i, line) in INSTRUCTIONS.iter().enumerate() {
            self.grid.put_text_centered(height / 2 + i as u16 * spacing, line, WHITE);
        }
    }

    /// Blocks until a key is pressed. Returns false when the player quits.
    fn show_title_screen(&mut self) -> io::Result<bool> {
        self.draw_title();
        self.present()?;
        info!("Title screen displayed. Waiting for key press.");

        loop {
            let event = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?;
            match self.input.handle_event(&event, 0) {
                Some(Command::Quit) => return Ok(false),
                Some(Command::Resize(width, height)) => {
                    self.resize(width, height);
                    self.draw_title();
                    self.present()?;
                }
                Some(_) => break,
                // Arrow keys start the game too, but not the release of the launch key
                None if matches!(event, Event::Key(key) if key.kind != KeyEventKind::Release) => break,
                None => {}
            }
        }

        self.input.clear();
        Ok(true)
    }
}
