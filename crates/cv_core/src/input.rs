//! Per-frame button table with level and edge flags.
//!
//! Every tracked key owns a fixed slot holding three flags:
//!
//! - **down:** level-triggered, true every frame the key is physically held.
//!   Carried forward across frames until the opposite transition arrives.
//! - **pressed / released:** edge-triggered, true only for the frame in which
//!   the transition was applied. `end_frame()` clears them once the simulation
//!   has consumed the snapshot.
//!
//! Key repeats coming from the platform are applied like any other key-down,
//! so `pressed` fires again on each repeat.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Space,
    Escape,
    M,
    F3,
    F4,
}

impl Key {
    pub const ALL: [Key; 13] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Space,
        Key::Escape,
        Key::M,
        Key::F3,
        Key::F4,
    ];

    /// Number of slots in the button table.
    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub down: bool,
    pub pressed: bool,
    pub released: bool,
}

/// A single edge event fed into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Down(Key),
    Up(Key),
}

#[derive(Debug, Clone)]
pub struct InputState {
    buttons: [ButtonState; Key::COUNT],
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            buttons: [ButtonState::default(); Key::COUNT],
            quit_requested: false,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        let state = &mut self.buttons[key.index()];
        state.down = true;
        state.pressed = true;
        if key == Key::Escape {
            self.quit_requested = true;
        }
    }

    pub fn key_up(&mut self, key: Key) {
        let state = &mut self.buttons[key.index()];
        state.down = false;
        state.released = true;
    }

    pub fn apply(&mut self, transition: KeyTransition) {
        match transition {
            KeyTransition::Down(key) => self.key_down(key),
            KeyTransition::Up(key) => self.key_up(key),
        }
    }

    pub fn apply_all<I>(&mut self, transitions: I)
    where
        I: IntoIterator<Item = KeyTransition>,
    {
        for transition in transitions {
            self.apply(transition);
        }
    }

    pub fn button(&self, key: Key) -> ButtonState {
        self.buttons[key.index()]
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.buttons[key.index()].down
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.buttons[key.index()].pressed
    }

    pub fn is_released(&self, key: Key) -> bool {
        self.buttons[key.index()].released
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Raw four-way direction from the arrow keys or WASD, in screen space
    /// (+x right, +y down). Opposing keys cancel. Not normalized.
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.is_down(Key::Left) || self.is_down(Key::A) {
            dir.x -= 1.0;
        }
        if self.is_down(Key::Right) || self.is_down(Key::D) {
            dir.x += 1.0;
        }
        if self.is_down(Key::Up) || self.is_down(Key::W) {
            dir.y -= 1.0;
        }
        if self.is_down(Key::Down) || self.is_down(Key::S) {
            dir.y += 1.0;
        }
        dir
    }

    /// Carry `down` into the next frame and drop this frame's edges.
    pub fn end_frame(&mut self) {
        for state in &mut self.buttons {
            state.pressed = false;
            state.released = false;
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
