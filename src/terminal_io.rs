use std::collections::HashMap;
use std::io;

use crossterm::{
    cursor::{Hide, Show},
    event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use log::{error, info};

use crate::constants::KEY_HOLD_FRAMES;
use crate::entities::Steering;

/// Puts the terminal into game mode and restores it when dropped, including
/// on early returns and errors.
pub struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        let mut guard = TerminalGuard { keyboard_enhanced: false };

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)
            .map_err(|e| { error!("Failed to prepare screen: {}", e); e })?;

        if supports_keyboard_enhancement().unwrap_or(false) {
            execute!(stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
            guard.keyboard_enhanced = true;
            info!("Keyboard enhancement enabled, key releases are reported.");
        } else {
            info!("No keyboard enhancement, holding keys relies on auto-repeat.");
        }
        Ok(guard)
    }

    /// Whether the terminal reports key release events.
    pub fn reports_releases(&self) -> bool {
        self.keyboard_enhanced
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.keyboard_enhanced {
            if let Err(e) = execute!(stdout, PopKeyboardEnhancementFlags) {
                error!("Failed to restore keyboard mode: {}", e);
            }
        }
        if let Err(e) = execute!(stdout, Show, LeaveAlternateScreen) {
            error!("Failed to restore screen: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode on exit: {}", e);
        }
    }
}

/// Discrete actions produced by input, separate from held steering keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Fire,
    Restart,
    Quit,
    /// Any other key press; used to leave the title screen.
    AnyKey,
    Resize(u16, u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyHold {
    Up,
    Down,
    Until(u64),
}

impl KeyHold {
    fn is_down(&self, frame: u64) -> bool {
        match *self {
            KeyHold::Up => false,
            KeyHold::Down => true,
            KeyHold::Until(last_frame) => frame <= last_frame,
        }
    }
}

/// Tracks which steering keys are held.
///
/// Terminals only report key releases with the keyboard enhancement protocol.
/// Without it a press counts as held for [`KEY_HOLD_FRAMES`], and the
/// terminal's auto-repeat keeps refreshing that window.
pub struct InputState {
    left: KeyHold,
    right: KeyHold,
    release_events: bool,
}

impl InputState {
    pub fn new(release_events: bool) -> Self {
        InputState { left: KeyHold::Up, right: KeyHold::Up, release_events }
    }

    pub fn steering(&self, frame: u64) -> Steering {
        Steering { left: self.left.is_down(frame), right: self.right.is_down(frame) }
    }

    fn press(&mut self, left: bool, frame: u64) {
        if self.release_events {
            if left {
                self.left = KeyHold::Down;
            } else {
                self.right = KeyHold::Down;
            }
            return;
        }

        // No release events: reversing direction lets go of the other key
        let hold = KeyHold::Until(frame + KEY_HOLD_FRAMES);
        if left {
            self.left = hold;
            self.right = KeyHold::Up;
        } else {
            self.right = hold;
            self.left = KeyHold::Up;
        }
    }

    fn release(&mut self, left: bool) {
        if left {
            self.left = KeyHold::Up;
        } else {
            self.right = KeyHold::Up;
        }
    }

    pub fn clear(&mut self) {
        self.left = KeyHold::Up;
        self.right = KeyHold::Up;
    }

    /// Folds one terminal event into the held keys and returns the command it
    /// triggers, if any.
    pub fn handle_event(&mut self, event: &Event, frame: u64) -> Option<Command> {
        match event {
            Event::Key(key) => self.handle_key(key, frame),
            Event::Resize(width, height) => Some(Command::Resize(*width, *height)),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, frame: u64) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            match key.code {
                KeyCode::Left => self.release(true),
                KeyCode::Right => self.release(false),
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Left => {
                self.press(true, frame);
                None
            }
            KeyCode::Right => {
                self.press(false, frame);
                None
            }
            // Holding space fires once when the terminal can tell repeats apart
            KeyCode::Char(' ') if key.kind == KeyEventKind::Repeat => None,
            KeyCode::Char(' ') => Some(Command::Fire),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
            _ => Some(Command::AnyKey),
        }
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// Steers, fires a few volleys, then quits.
    pub fn demo_script(quit_frame: u64) -> Self {
        let mut events: HashMap<u64, Vec<Event>> = HashMap::new();
        let key = |code: KeyCode| Event::Key(code.into());
        for frame in (1..quit_frame).step_by(KEY_HOLD_FRAMES as usize) {
            let steer = if (frame / 90) % 2 == 0 { KeyCode::Left } else { KeyCode::Right };
            events.entry(frame).or_default().push(key(steer));
        }
        for frame in (5..quit_frame).step_by(15) {
            events.entry(frame).or_default().push(key(KeyCode::Char(' ')));
        }
        events.entry(quit_frame).or_default().push(key(KeyCode::Char('q')));
        SimulatedInput::new(events)
    }

    /// Events scripted for `frame`, in order.
    pub fn take(&mut self, frame: u64) -> Vec<Event> {
        self.events.remove(&frame).unwrap_or_default()
    }
}
