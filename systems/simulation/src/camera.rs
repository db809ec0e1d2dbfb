use arena_siege_core::{Vec2, Viewport};

/// Supplies the view bounds around the player.
pub trait Camera: Send {
    /// Bounds of the view when focused on `focus`.
    fn viewport(&mut self, focus: Vec2) -> Viewport;
}

/// Camera locked onto the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowCamera {
    half_extents: Vec2,
}

impl FollowCamera {
    /// Creates a camera showing `half_extents` around the focus each way.
    #[must_use]
    pub const fn new(half_extents: Vec2) -> Self {
        Self { half_extents }
    }
}

impl Camera for FollowCamera {
    fn viewport(&mut self, focus: Vec2) -> Viewport {
        Viewport::centered(focus, self.half_extents)
    }
}
