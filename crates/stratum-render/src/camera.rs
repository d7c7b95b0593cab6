use stratum_geom::{Direction, Frustum, Vec3};
use stratum_world::SectionPos;

// Expansion is allowed unless the direction opposes the view by more than ~143 degrees.
const VALID_DIR_MIN_DOT: f32 = -0.8;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // degrees
    pub pitch: f32, // degrees
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            fov_y_degrees: 90.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }

    /// Unit view vector.
    pub fn forward(&self) -> Vec3 {
        let yaw_rad = self.yaw.to_radians();
        let pitch_rad = self.pitch.to_radians();
        Vec3::new(
            yaw_rad.cos() * pitch_rad.cos(),
            pitch_rad.sin(),
            yaw_rad.sin() * pitch_rad.cos(),
        )
        .normalized()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_camera(
            self.position,
            self.forward(),
            Vec3::UP,
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    /// Per-direction traversal gate: `view · dir > -0.8`.
    pub fn valid_dirs(&self) -> [bool; 6] {
        let view = self.forward();
        Direction::ALL.map(|d| view.dot(d.unit_vector()) > VALID_DIR_MIN_DOT)
    }

    /// Section containing the camera.
    pub fn section_pos(&self) -> SectionPos {
        SectionPos::new(
            (self.position.x / 16.0).floor() as i32,
            (self.position.y / 16.0).floor() as i32,
            (self.position.z / 16.0).floor() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_east_blocks_only_west() {
        let cam = Camera::new(Vec3::new(8.0, 8.0, 8.0), 0.0, 0.0);
        let f = cam.forward();
        assert!((f.x - 1.0).abs() < 1e-6);
        let valid = cam.valid_dirs();
        for d in Direction::ALL {
            assert_eq!(valid[d.index()], d != Direction::West, "{d:?}");
        }
    }

    #[test]
    fn oblique_view_keeps_all_dirs() {
        let cam = Camera::new(Vec3::ZERO, 45.0, -30.0);
        assert!(cam.valid_dirs().iter().all(|v| *v));
    }

    #[test]
    fn section_pos_floors_negative_coordinates() {
        let cam = Camera::new(Vec3::new(-0.5, 17.0, -16.0), 0.0, 0.0);
        assert_eq!(cam.section_pos(), SectionPos::new(-1, 1, -1));
    }
}
