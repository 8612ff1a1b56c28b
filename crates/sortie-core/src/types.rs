//! Fundamental geometric types and identifiers.
//!
//! Positions follow the theatre map convention: `x` points North, `y` points
//! East, both in meters. Headings are degrees clockwise from North in
//! `[0, 360)`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Planar position on the theatre map (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn from_vec(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }

    /// Straight-line distance to another position in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.to_vec().distance(other.to_vec())
    }

    /// Heading to another position in degrees (0 = North, clockwise).
    pub fn heading_to(&self, other: &Position) -> f64 {
        let d = other.to_vec() - self.to_vec();
        d.y.atan2(d.x).to_degrees().rem_euclid(360.0)
    }

    /// The position reached by travelling `distance` meters on `heading`.
    pub fn from_heading(&self, heading: f64, distance: f64) -> Position {
        let rad = heading.to_radians();
        Position::from_vec(self.to_vec() + DVec2::new(rad.cos(), rad.sin()) * distance)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position::from_vec(self.to_vec().lerp(other.to_vec(), t.clamp(0.0, 1.0)))
    }
}

/// Add `delta` degrees to a heading, wrapping into `[0, 360)`.
pub fn add_heading(heading: f64, delta: f64) -> f64 {
    (heading + delta).rem_euclid(360.0)
}

/// Return the item whose position is nearest to `target`.
pub fn find_nearest<T, I, F>(items: I, target: &Position, position_of: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Position,
{
    let mut nearest: Option<(T, f64)> = None;
    for item in items {
        let distance = position_of(&item).distance_to(target);
        match &nearest {
            Some((_, best)) if *best <= distance => {}
            _ => nearest = Some((item, distance)),
        }
    }
    nearest.map(|(item, _)| item)
}

/// Stable, serializable handle of a world entity. Index and generation are
/// the two halves of the engine's entity bits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl EntityId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}g{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_follows_north_east_convention() {
        let origin = Position::new(0.0, 0.0);
        assert!((origin.heading_to(&Position::new(10.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((origin.heading_to(&Position::new(0.0, 10.0)) - 90.0).abs() < 1e-9);
        assert!((origin.heading_to(&Position::new(-10.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.heading_to(&Position::new(0.0, -10.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn from_heading_inverts_heading_to() {
        let a = Position::new(1_000.0, -2_500.0);
        let b = Position::new(-7_000.0, 12_000.0);
        let heading = a.heading_to(&b);
        let distance = a.distance_to(&b);
        let reached = a.from_heading(heading, distance);
        assert!(reached.distance_to(&b) < 1e-6);
    }

    #[test]
    fn add_heading_wraps() {
        assert_eq!(add_heading(350.0, 20.0), 10.0);
        assert_eq!(add_heading(10.0, -90.0), 280.0);
        assert_eq!(add_heading(90.0, 180.0), 270.0);
    }

    #[test]
    fn find_nearest_picks_closest_and_first_on_ties() {
        let target = Position::new(0.0, 0.0);
        let items = vec![
            ("far", Position::new(100.0, 0.0)),
            ("near", Position::new(0.0, 10.0)),
            ("tie", Position::new(10.0, 0.0)),
        ];
        let nearest = find_nearest(items.iter(), &target, |(_, p)| *p).unwrap();
        assert_eq!(nearest.0, "near");
        let none: Option<(&str, Position)> = find_nearest(Vec::new(), &target, |(_, p)| *p);
        assert!(none.is_none());
    }
}
