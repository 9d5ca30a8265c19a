use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::config::Settings;
use crate::scene::DrawCommand;

/// Session-wide uniform; the projection never changes after startup.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub projection: [[f32; 4]; 4],
}

impl GlobalUniform {
    pub fn new(projection: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
        }
    }
}

/// Per-draw transforms. The view travels with each draw because the
/// held cube in first person replaces it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl From<&DrawCommand> for ObjectUniform {
    fn from(draw: &DrawCommand) -> Self {
        Self {
            world: draw.world.to_cols_array_2d(),
            view: draw.view.to_cols_array_2d(),
        }
    }
}

/// Perspective projection with a 0..1 depth range.
pub fn projection_matrix(settings: &Settings) -> Mat4 {
    Mat4::perspective_rh(
        settings.field_of_view.to_radians(),
        settings.aspect_ratio().max(0.01),
        settings.near_plane,
        settings.far_plane,
    )
}

/// Device limits the renderer requests.
pub fn required_limits() -> wgpu::Limits {
    wgpu::Limits::default()
}

/// Largest texture edge the renderer's device is guaranteed to accept.
pub fn max_texture_dimension() -> u32 {
    required_limits().max_texture_dimension_2d
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;
    use crate::camera::Camera;
    use crate::scene::Scene;

    #[test]
    fn texture_limit_follows_requested_limits() {
        assert_eq!(max_texture_dimension(), 8192);
    }

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 64);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let settings = Settings::default();
        let projection = projection_matrix(&settings);
        let near = projection * Vec4::new(0.0, 0.0, -settings.near_plane, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, -settings.far_plane, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn object_uniform_is_column_major() {
        let settings = Settings::default();
        let scene = Scene::new(&settings);
        let camera = Camera::new(&settings);
        let draw = &scene.draw_list(&camera)[6];
        let uniform = ObjectUniform::from(draw);
        let translation = Vec3::from_slice(&uniform.world[3][..3]);
        assert!(translation.abs_diff_eq(scene.car_position(), 1e-6));
        assert_eq!(Mat4::from_cols_array_2d(&uniform.view), camera.view_matrix());
    }
}
