use crate::{Aabb, Vec3};

/// A plane `n·p + d = 0` with `n` pointing into the half-space it keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane through `point` with the given (not necessarily unit) inward normal.
    #[inline]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalized();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    #[inline]
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// Perspective view volume built from a camera basis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    /// Builds the frustum for a camera at `eye` looking along `forward`.
    /// `fov_y` is the full vertical field of view in radians, `aspect` is width / height.
    pub fn from_camera(
        eye: Vec3,
        forward: Vec3,
        world_up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let f = forward.normalized();
        let mut r = f.cross(world_up);
        if r.length() <= f32::EPSILON {
            // Looking straight along the up axis; any perpendicular works.
            r = Vec3::new(1.0, 0.0, 0.0);
        }
        let r = r.normalized();
        let u = r.cross(f).normalized();

        let tan_y = (fov_y * 0.5).tan();
        let tan_x = tan_y * aspect;

        let mut planes = [Plane::default(); 6];
        planes[Self::LEFT] = Plane::from_point_normal(eye, f * tan_x + r);
        planes[Self::RIGHT] = Plane::from_point_normal(eye, f * tan_x - r);
        planes[Self::BOTTOM] = Plane::from_point_normal(eye, f * tan_y + u);
        planes[Self::TOP] = Plane::from_point_normal(eye, f * tan_y - u);
        planes[Self::NEAR] = Plane::from_point_normal(eye + f * near, f);
        planes[Self::FAR] = Plane::from_point_normal(eye + f * far, -f);
        Self { planes }
    }

    /// True unless the box lies entirely behind one of the planes.
    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let c = aabb.center();
        let h = aabb.half_extents();
        self.planes.iter().all(|p| {
            let radius = h.dot(p.normal.abs());
            p.distance_to_point(c) >= -radius
        })
    }

    #[inline]
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes.iter().all(|pl| pl.distance_to_point(p) >= 0.0)
    }
}
