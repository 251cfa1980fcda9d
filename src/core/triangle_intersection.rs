use glam::Vec3;

use crate::scene::Triangle;

/// Hits closer than this are treated as self-intersection
const MIN_HIT_DISTANCE: f32 = 1e-6;

/// Where a primary ray meets a triangle
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the (unit) ray direction
    pub t: f32,
    /// Unit geometric normal from counter-clockwise winding
    pub normal: Vec3,
}

impl TriangleHit {
    /// Normal flipped to face the incoming ray
    pub fn facing_normal(&self, ray_dir: Vec3) -> Vec3 {
        if self.normal.dot(ray_dir) > 0.0 {
            -self.normal
        } else {
            self.normal
        }
    }
}

impl Triangle {
    /// Möller-Trumbore test, double sided
    pub fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<TriangleHit> {
        let ab = self.v1 - self.v0;
        let ac = self.v2 - self.v0;

        let p = dir.cross(ac);
        let det = ab.dot(p);
        if det.abs() < MIN_HIT_DISTANCE {
            return None;
        }
        let inv_det = det.recip();

        let to_origin = origin - self.v0;
        let u = to_origin.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = to_origin.cross(ab);
        let v = dir.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = ac.dot(q) * inv_det;
        (t >= MIN_HIT_DISTANCE).then(|| TriangleHit {
            t,
            normal: ab.cross(ac).normalize(),
        })
    }
}

/// Nearest hit closer than `max_t`, with the index of the triangle hit
pub fn closest_hit(
    origin: Vec3,
    dir: Vec3,
    triangles: &[Triangle],
    max_t: f32,
) -> Option<(usize, TriangleHit)> {
    let mut best: Option<(usize, TriangleHit)> = None;
    let mut limit = max_t;
    for (idx, triangle) in triangles.iter().enumerate() {
        if let Some(hit) = triangle.intersect(origin, dir) {
            if hit.t < limit {
                limit = hit.t;
                best = Some((idx, hit));
            }
        }
    }
    best
}
