use glam::Vec2;

/// Viewport into the world, following the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub screen_size: Vec2,
    pub world_size: Vec2,
    /// World coordinate of the screen's top-left corner.
    pub offset: Vec2,
}

impl Camera {
    pub fn new(screen_size: Vec2, world_size: Vec2) -> Self {
        Self {
            screen_size,
            world_size,
            offset: Vec2::ZERO,
        }
    }

    /// Centre the view on `target`, never showing anything outside the world.
    pub fn update(&mut self, target: Vec2) {
        let max = (self.world_size - self.screen_size).max(Vec2::ZERO);
        self.offset = (target - self.screen_size * 0.5).clamp(Vec2::ZERO, max);
    }

    /// World position → screen position.
    pub fn apply(&self, position: Vec2) -> Vec2 {
        position - self.offset
    }

    /// Screen position → world position.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }
}
