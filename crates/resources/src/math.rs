pub type UVec2 = nalgebra::Vector2<u32>;

/// Axis-aligned region of a bitmap, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntRect {
    pub position: UVec2,
    pub size: UVec2,
}

impl IntRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            position: UVec2::new(x, y),
            size: UVec2::new(width, height),
        }
    }

    /// Rect covering a whole bitmap of `size`.
    pub fn from_size(size: UVec2) -> Self {
        Self {
            position: UVec2::zeros(),
            size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }

    /// Clamps the rect so it fits inside a bitmap of `bounds`.
    pub fn clamped_to(&self, bounds: UVec2) -> Self {
        let x = self.position.x.min(bounds.x);
        let y = self.position.y.min(bounds.y);
        Self::new(
            x,
            y,
            self.size.x.min(bounds.x - x),
            self.size.y.min(bounds.y - y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_to_bounds() {
        let rect = IntRect::new(6, 1, 10, 2).clamped_to(UVec2::new(8, 2));
        assert_eq!(rect, IntRect::new(6, 1, 2, 1));
        assert!(IntRect::new(9, 0, 4, 4).clamped_to(UVec2::new(8, 8)).is_empty());
    }
}
