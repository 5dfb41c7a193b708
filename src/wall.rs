/// Walls around a single tile.
///
/// `bottom` faces `y = 0` and `left` faces `x = 0`. A wall blocks movement
/// between the tile and its neighbour on that side and is drawn as an
/// upright quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wall {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Wall {
    /// A tile with no wall on any side.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if no side carries a wall.
    pub fn is_none(&self) -> bool {
        *self == Wall::none()
    }

    /// Number of sides carrying a wall.
    pub fn count(&self) -> usize {
        [self.top, self.bottom, self.left, self.right]
            .iter()
            .filter(|side| **side)
            .count()
    }

    /// Sets the side named `side` (`top`, `bottom`, `left` or `right`).
    ///
    /// Returns false if the name is not a known side.
    pub fn set_side(&mut self, side: &str, value: bool) -> bool {
        match side {
            "top" => self.top = value,
            "bottom" => self.bottom = value,
            "left" => self.left = value,
            "right" => self.right = value,
            _ => return false,
        }
        true
    }
}
