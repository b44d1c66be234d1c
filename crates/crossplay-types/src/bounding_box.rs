use crate::types::Vec3d;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Axis-aligned box stored as center + size.
///
/// Collision shapes are defined relative to the block origin and kept
/// immutable in the registry; correction works on a copy of the player box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub middle_x: f64,
    pub middle_y: f64,
    pub middle_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
}

impl BoundingBox {
    pub fn new(
        middle_x: f64,
        middle_y: f64,
        middle_z: f64,
        size_x: f64,
        size_y: f64,
        size_z: f64,
    ) -> Self {
        Self {
            middle_x,
            middle_y,
            middle_z,
            size_x,
            size_y,
            size_z,
        }
    }

    /// Build from the `[cx, cy, cz, sx, sy, sz]` layout used by the shape tables.
    pub fn from_array(values: [f64; 6]) -> Self {
        Self::new(values[0], values[1], values[2], values[3], values[4], values[5])
    }

    /// A box whose bottom face is centered on `position`.
    pub fn from_bottom_center(position: Vec3d, width: f64, height: f64) -> Self {
        Self::new(
            position.x,
            position.y + height / 2.0,
            position.z,
            width,
            height,
            width,
        )
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) {
        self.middle_x += x;
        self.middle_y += y;
        self.middle_z += z;
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.intersects_at(0.0, 0.0, 0.0, other)
    }

    /// Intersection test with this box placed at a block offset.
    /// Touching faces do not count as intersecting.
    pub fn intersects_at(&self, offset_x: f64, offset_y: f64, offset_z: f64, other: &BoundingBox) -> bool {
        ((self.middle_x + offset_x) - other.middle_x).abs() * 2.0 < self.size_x + other.size_x
            && ((self.middle_y + offset_y) - other.middle_y).abs() * 2.0 < self.size_y + other.size_y
            && ((self.middle_z + offset_z) - other.middle_z).abs() * 2.0 < self.size_z + other.size_z
    }

    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.middle_x - self.size_x / 2.0,
            Axis::Y => self.middle_y - self.size_y / 2.0,
            Axis::Z => self.middle_z - self.size_z / 2.0,
        }
    }

    pub fn max(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.middle_x + self.size_x / 2.0,
            Axis::Y => self.middle_y + self.size_y / 2.0,
            Axis::Z => self.middle_z + self.size_z / 2.0,
        }
    }

    pub fn middle(&self) -> Vec3d {
        Vec3d::new(self.middle_x, self.middle_y, self.middle_z)
    }

    pub fn bottom_center(&self) -> Vec3d {
        Vec3d::new(self.middle_x, self.min(Axis::Y), self.middle_z)
    }

    /// True for boxes that cannot take part in intersection math.
    pub fn is_degenerate(&self) -> bool {
        let values = [
            self.middle_x,
            self.middle_y,
            self.middle_z,
            self.size_x,
            self.size_y,
            self.size_z,
        ];
        values.iter().any(|v| !v.is_finite())
            || self.size_x <= 0.0
            || self.size_y <= 0.0
            || self.size_z <= 0.0
    }

}
