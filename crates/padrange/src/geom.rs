//! Integer pixel coordinates and displacements.

use core::ops::{Add, Sub};

/// Unsigned pixel coordinate.
///
/// Algorithms expect points inside the region they operate on; a point that
/// falls outside is a failure signal, never a valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

/// Signed pixel displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl PixelPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Step by `d`, or `None` when either coordinate would become negative
    /// or overflow.
    #[inline]
    pub fn checked_step(self, d: Direction) -> Option<Self> {
        let x = i64::from(self.x) + i64::from(d.dx);
        let y = i64::from(self.y) + i64::from(d.dy);
        Some(Self {
            x: u32::try_from(x).ok()?,
            y: u32::try_from(y).ok()?,
        })
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_squared(self, other: Self) -> u64 {
        (self - other).magnitude_squared()
    }
}

impl Direction {
    pub const UP: Self = Self::new(0, -1);
    pub const DOWN: Self = Self::new(0, 1);
    pub const LEFT: Self = Self::new(-1, 0);
    pub const RIGHT: Self = Self::new(1, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    #[inline]
    pub fn magnitude_squared(self) -> u64 {
        let dx = i64::from(self.dx);
        let dy = i64::from(self.dy);
        (dx * dx + dy * dy) as u64
    }

    /// Unit step (per axis) pointing the same way; zero axes stay zero.
    pub fn signum(self) -> Self {
        Self::new(self.dx.signum(), self.dy.signum())
    }

    pub fn negated(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

/// Clamps at zero on the low side only; callers bounds-check the high side.
impl Add<Direction> for PixelPoint {
    type Output = PixelPoint;

    fn add(self, d: Direction) -> Self::Output {
        let x = (i64::from(self.x) + i64::from(d.dx)).clamp(0, i64::from(u32::MAX));
        let y = (i64::from(self.y) + i64::from(d.dy)).clamp(0, i64::from(u32::MAX));
        PixelPoint {
            x: x as u32,
            y: y as u32,
        }
    }
}

impl Sub<PixelPoint> for PixelPoint {
    type Output = Direction;

    fn sub(self, rhs: PixelPoint) -> Self::Output {
        Direction {
            dx: self.x as i32 - rhs.x as i32,
            dy: self.y as i32 - rhs.y as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_clamps_low_side_only() {
        let p = PixelPoint::new(2, 1);
        assert_eq!(p + Direction::new(-5, -1), PixelPoint::new(0, 0));
        assert_eq!(p + Direction::new(7, 3), PixelPoint::new(9, 4));
    }

    #[test]
    fn checked_step_rejects_negative() {
        let p = PixelPoint::new(0, 3);
        assert_eq!(p.checked_step(Direction::LEFT), None);
        assert_eq!(p.checked_step(Direction::UP), Some(PixelPoint::new(0, 2)));
    }

    #[test]
    fn difference_and_magnitude() {
        let a = PixelPoint::new(10, 4);
        let b = PixelPoint::new(7, 8);
        let d = a - b;
        assert_eq!(d, Direction::new(3, -4));
        assert_eq!(d.magnitude_squared(), 25);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(Direction::new(-7, 0).signum(), Direction::LEFT);
    }
}
