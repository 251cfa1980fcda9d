use glam::Vec3;

/// Axis-aligned bounds of a mesh, used to reject rays before triangle tests
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tight bounds of a point set; `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<AABB>, p| {
            Some(match acc {
                Some(b) => AABB::new(b.min.min(p), b.max.max(p)),
                None => AABB::new(p, p),
            })
        })
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab test. Entry distance along the ray (0 from inside), `None` on a miss.
    pub fn hit_distance(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        // zero components become infinities, which the slab math tolerates
        let inv = dir.recip();
        let t0 = (self.min - origin) * inv;
        let t1 = (self.max - origin) * inv;

        let near = t0.min(t1).max_element().max(0.0);
        let far = t0.max(t1).min_element();
        (far >= near).then_some(near)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}
