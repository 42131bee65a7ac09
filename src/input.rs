use glam::Vec2;

/// One-shot intents raised by a key press this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Confirm,
    /// Pause, resume, or leave the shop, depending on the screen.
    Back,
    Shop,
    Restart,
    Quit,
    Up,
    Down,
    UseSlot(usize),
}

/// Everything the simulation needs to know about the player's input for one
/// tick.  Produced by the front-end; the core never polls devices itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Held movement direction, each axis in `-1.0..=1.0`.
    pub movement: Vec2,
    /// Fire button held.
    pub fire: bool,
    /// Aim point in screen coordinates.
    pub pointer: Vec2,
    pub actions: Vec<Action>,
}

impl InputSnapshot {
    pub fn has(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}
