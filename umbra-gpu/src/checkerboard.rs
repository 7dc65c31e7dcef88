use bytemuck::{Pod, Zeroable};
use glam::UVec2;

/// Describes which pixels received a fresh raw sample this frame.
///
/// When enabled, pixel `(x, y)` is active if `x + y + phase` is even, i.e.
/// every row gets either its even or its odd pixels sampled and the pattern
/// flips between rows.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq, Eq))]
pub struct Checkerboard {
    pub enabled: u32,
    pub phase: u32,
}

impl Checkerboard {
    /// Every pixel is sampled every frame.
    pub fn disabled() -> Self {
        Self {
            enabled: 0,
            phase: 0,
        }
    }

    pub fn new(phase: u32) -> Self {
        Self {
            enabled: 1,
            phase: phase & 1,
        }
    }

    /// Returns the pattern for the next frame, which samples the pixels this
    /// one has skipped.
    pub fn next(self) -> Self {
        Self {
            enabled: self.enabled,
            phase: self.phase ^ 1,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != 0
    }

    pub fn is_active(&self, pos: UVec2) -> bool {
        !self.is_enabled() || (pos.x + pos.y + self.phase) % 2 == 0
    }

    /// [`Self::is_active()`] as a weight.
    pub fn activity(&self, pos: UVec2) -> f32 {
        if self.is_active(pos) {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn disabled() {
        let target = Checkerboard::disabled();

        assert!(target.is_active(uvec2(0, 0)));
        assert!(target.is_active(uvec2(1, 0)));
        assert!(target.is_active(uvec2(7, 3)));
    }

    #[test]
    fn pattern() {
        let target = Checkerboard::new(0);

        assert!(target.is_active(uvec2(0, 0)));
        assert!(!target.is_active(uvec2(1, 0)));
        assert!(!target.is_active(uvec2(0, 1)));
        assert!(target.is_active(uvec2(1, 1)));

        let target = target.next();

        assert!(!target.is_active(uvec2(0, 0)));
        assert!(target.is_active(uvec2(1, 0)));
        assert_eq!(0.0, target.activity(uvec2(2, 2)));
        assert_eq!(1.0, target.activity(uvec2(2, 3)));
    }

    #[test]
    fn cross_neighbours_are_active() {
        let target = Checkerboard::new(1);
        let pos = uvec2(4, 4);

        assert!(!target.is_active(pos));
        assert!(target.is_active(uvec2(3, 4)));
        assert!(target.is_active(uvec2(5, 4)));
        assert!(target.is_active(uvec2(4, 3)));
        assert!(target.is_active(uvec2(4, 5)));
    }
}
