//! # Axis-Aligned Bounding Boxes
//!
//! Boxes used for both entity bodies and merged terrain collision volumes,
//! plus the penetration test the world uses to pick a contact normal.

use cgmath::{Point3, Vector3};

/// An axis-aligned box given by its minimum and maximum corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Lowest corner
    pub min: Point3<f32>,
    /// Highest corner
    pub max: Point3<f32>,
}

/// Result of a penetration test: the unit axis to push the moving box along and how far.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Axis-aligned unit vector pointing from the obstacle towards the moving box.
    pub normal: Vector3<f32>,
    /// Overlap depth along `normal`.
    pub penetration: f32,
}

impl Aabb {
    /// A box between two corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Builds a box from its center and half extents.
    pub fn from_center(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Box covering the inclusive block range `(x1, y1, z1)..=(x2, y2, z2)`.
    pub fn from_block_range(x1: usize, y1: usize, z1: usize, x2: usize, y2: usize, z2: usize) -> Self {
        Self {
            min: Point3::new(x1 as f32, y1 as f32, z1 as f32),
            max: Point3::new((x2 + 1) as f32, (y2 + 1) as f32, (z2 + 1) as f32),
        }
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Returns a copy moved by `offset`.
    pub fn translated(&self, offset: Vector3<f32>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Strict overlap test: boxes that only touch do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Computes how to separate `self` from `other`.
    ///
    /// Per-axis depth is `min(self.max - other.min, other.max - self.min)` and
    /// the axis with the smallest depth becomes the normal; X wins only when
    /// strictly smallest, then Y over Z. The normal's sign points away from
    /// `other`'s center.
    ///
    /// # Returns
    /// `None` when the boxes do not intersect.
    pub fn penetration(&self, other: &Aabb) -> Option<Contact> {
        if !self.intersects(other) {
            return None;
        }

        let pen_x = (self.max.x - other.min.x).min(other.max.x - self.min.x);
        let pen_y = (self.max.y - other.min.y).min(other.max.y - self.min.y);
        let pen_z = (self.max.z - other.min.z).min(other.max.z - self.min.z);

        let center = self.center();
        let other_center = other.center();
        let sign = |a: f32, b: f32| if a < b { -1.0 } else { 1.0 };

        let contact = if pen_x < pen_y && pen_x < pen_z {
            Contact {
                normal: Vector3::new(sign(center.x, other_center.x), 0.0, 0.0),
                penetration: pen_x,
            }
        } else if pen_y < pen_z {
            Contact {
                normal: Vector3::new(0.0, sign(center.y, other_center.y), 0.0),
                penetration: pen_y,
            }
        } else {
            Contact {
                normal: Vector3::new(0.0, 0.0, sign(center.z, other_center.z)),
                penetration: pen_z,
            }
        };

        Some(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::new(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        assert!(!unit_at(0.0, 0.0, 0.0).intersects(&unit_at(1.0, 0.0, 0.0)));
        assert!(unit_at(0.0, 0.0, 0.0).intersects(&unit_at(0.5, 0.5, 0.5)));
    }

    #[test]
    fn resting_box_is_pushed_up() {
        let ground = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 64.0, 16.0));
        let body = Aabb::from_center(Point3::new(8.0, 64.8, 8.0), Vector3::new(0.3, 0.9, 0.3));
        let contact = body.penetration(&ground).unwrap();
        assert_eq!(contact.normal, Vector3::new(0.0, 1.0, 0.0));
        assert!((contact.penetration - 0.1).abs() < 1e-4);
    }

    #[test]
    fn side_hit_picks_x_axis() {
        let wall = unit_at(1.0, 0.0, 0.0);
        let body = Aabb::new(Point3::new(0.2, 0.0, 0.0), Point3::new(1.1, 1.0, 1.0));
        let contact = body.penetration(&wall).unwrap();
        assert_eq!(contact.normal, Vector3::new(-1.0, 0.0, 0.0));
        assert!((contact.penetration - 0.1).abs() < 1e-5);
    }
}
