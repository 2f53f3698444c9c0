use glam::Vec3;

/// Overlaps thinner than this are treated as touching, not penetrating.
const CONTACT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box standing on `feet`: centred horizontally, bottom face at feet.z.
    pub fn from_feet(feet: Vec3, half_extents: Vec3) -> Self {
        Self::from_center(feet + Vec3::new(0.0, 0.0, half_extents.z), half_extents)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Signed overlap depth per axis; any component <= 0 means no contact.
    fn overlap(&self, other: &Aabb) -> Vec3 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let o = self.overlap(other);
        o.x > CONTACT_EPSILON && o.y > CONTACT_EPSILON && o.z > CONTACT_EPSILON
    }

    /// True when the XY projections overlap.
    pub fn overlaps_footprint(&self, other: &Aabb) -> bool {
        let o = self.overlap(other);
        o.x > CONTACT_EPSILON && o.y > CONTACT_EPSILON
    }

    /// Smallest translation of `self` that separates it from `other`,
    /// restricted to X/Y when `horizontal_only`.
    pub fn penetration(&self, other: &Aabb, horizontal_only: bool) -> Option<Vec3> {
        if !self.intersects(other) {
            return None;
        }

        let o = self.overlap(other);
        let d = self.center() - other.center();
        let away = |delta: f32| if delta < 0.0 { -1.0 } else { 1.0 };

        let push = if o.x <= o.y && (horizontal_only || o.x <= o.z) {
            Vec3::new(o.x * away(d.x), 0.0, 0.0)
        } else if horizontal_only || o.y <= o.z {
            Vec3::new(0.0, o.y * away(d.y), 0.0)
        } else {
            Vec3::new(0.0, 0.0, o.z * away(d.z))
        };
        Some(push)
    }
}

/// Level blocks. Built once at level load and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct StaticGeometry {
    blocks: Vec<Aabb>,
}

impl StaticGeometry {
    pub fn new(blocks: Vec<Aabb>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Aabb] {
        &self.blocks
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Highest block top under the body's footprint that is no more than
    /// `tolerance` above `feet.z`, never lower than `floor`.
    pub fn ground_level_below(&self, feet: Vec3, half_extents: Vec3, floor: f32, tolerance: f32) -> f32 {
        let body = Aabb::from_feet(feet, half_extents);
        self.blocks
            .iter()
            .filter(|b| body.overlaps_footprint(b) && b.max.z <= feet.z + tolerance)
            .map(|b| b.max.z)
            .fold(floor, f32::max)
    }

    #[cfg(test)]
    pub fn collides(&self, feet: Vec3, half_extents: Vec3) -> bool {
        let body = Aabb::from_feet(feet, half_extents);
        self.blocks.iter().any(|b| body.intersects(b))
    }
}

/// Pushes a body standing at `feet` out of every block it penetrates and
/// returns the corrected feet position. With `horizontal_only` blocks act as
/// walls and never lift or lower the body.
pub fn resolve_penetration(feet: Vec3, half_extents: Vec3, geometry: &StaticGeometry, horizontal_only: bool) -> Vec3 {
    let mut feet = feet;
    for block in geometry.blocks() {
        let body = Aabb::from_feet(feet, half_extents);
        if let Some(push) = body.penetration(block, horizontal_only) {
            feet += push;
        }
    }
    feet
}
