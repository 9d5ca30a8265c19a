use std::ops::Range;

use glam::{Mat4, Vec2, Vec3};

use crate::camera::{Camera, CameraMode};
use crate::config::Settings;
use crate::mesh::{CubeFace, CUBE_VERTEX_COUNT};

/// Wheel placement in the car body's unit cube, as (x, z) pairs.
pub const WHEEL_OFFSETS: [Vec2; 4] = [
    Vec2::new(-0.5, 0.5),
    Vec2::new(-0.5, -0.5),
    Vec2::new(0.5, 0.5),
    Vec2::new(0.5, -0.5),
];

/// Textures the scene samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Brick,
    Cement,
    Sky(CubeFace),
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 8] = [
        TextureSlot::Brick,
        TextureSlot::Cement,
        TextureSlot::Sky(CubeFace::Right),
        TextureSlot::Sky(CubeFace::Left),
        TextureSlot::Sky(CubeFace::Top),
        TextureSlot::Sky(CubeFace::Bottom),
        TextureSlot::Sky(CubeFace::Near),
        TextureSlot::Sky(CubeFace::Far),
    ];

    /// Path of the image backing this slot, relative to the asset root.
    pub fn relative_path(self) -> &'static str {
        match self {
            TextureSlot::Brick => "Textures/brick.jpg",
            TextureSlot::Cement => "Textures/cement.jpg",
            TextureSlot::Sky(CubeFace::Right) => "Skybox/posx.jpg",
            TextureSlot::Sky(CubeFace::Left) => "Skybox/negx.jpg",
            TextureSlot::Sky(CubeFace::Top) => "Skybox/posy.jpg",
            TextureSlot::Sky(CubeFace::Bottom) => "Skybox/negy.jpg",
            TextureSlot::Sky(CubeFace::Near) => "Skybox/posz.jpg",
            TextureSlot::Sky(CubeFace::Far) => "Skybox/negz.jpg",
        }
    }
}

/// Render state a draw needs besides its transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    /// Textured, no depth writes, front faces culled.
    Skybox,
    Textured,
    /// Vertex colors only.
    Colored,
}

/// A single draw of (part of) the cube mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub label: &'static str,
    pub pipeline: Pipeline,
    pub texture: Option<TextureSlot>,
    pub vertices: Range<u32>,
    pub world: Mat4,
    pub view: Mat4,
}

/// Animated objects: the car circling the origin and the spinning cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    car_angle: f32,
    spin_angle: f32,
    car_path_radius: f32,
    car_rotation_speed: f32,
    spin_speed: f32,
    skybox_scale: f32,
}

impl Scene {
    pub fn new(settings: &Settings) -> Self {
        Self {
            car_angle: 0.0,
            spin_angle: 0.0,
            car_path_radius: settings.car_path_radius,
            car_rotation_speed: settings.car_rotation_speed,
            spin_speed: settings.spin_speed,
            skybox_scale: settings.skybox_scale,
        }
    }

    /// Car angle along its circular path, in radians.
    pub fn car_angle(&self) -> f32 {
        self.car_angle
    }

    /// Spinning cube angle in degrees.
    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn advance(&mut self, dt: f32) {
        self.car_angle += self.car_rotation_speed * dt;
        self.spin_angle += self.spin_speed * dt;
    }

    pub fn car_position(&self) -> Vec3 {
        car_position(self.car_angle, self.car_path_radius)
    }

    pub fn car_world(&self) -> Mat4 {
        car_world(self.car_angle, self.car_path_radius)
    }

    pub fn skybox_world(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.skybox_scale))
    }

    /// Builds the ordered draw list for this frame: skybox faces, car
    /// body, roof, wheels, then the spinning cube.
    pub fn draw_list(&self, camera: &Camera) -> Vec<DrawCommand> {
        let view = camera.view_matrix();
        let mut draws = Vec::with_capacity(13);

        let sky = self.skybox_world();
        for face in CubeFace::ALL {
            draws.push(DrawCommand {
                label: "skybox",
                pipeline: Pipeline::Skybox,
                texture: Some(TextureSlot::Sky(face)),
                vertices: face.vertex_range(),
                world: sky,
                view,
            });
        }

        let car = self.car_world();
        draws.push(cube_draw("car-body", Pipeline::Textured, TextureSlot::Cement, car, view));
        draws.push(cube_draw(
            "car-roof",
            Pipeline::Textured,
            TextureSlot::Brick,
            roof_world(car),
            view,
        ));
        for offset in WHEEL_OFFSETS {
            draws.push(cube_draw(
                "car-wheel",
                Pipeline::Textured,
                TextureSlot::Brick,
                wheel_world(car, offset, self.car_angle),
                view,
            ));
        }

        let (world, view) = self.spinning_cube_transforms(camera, view);
        draws.push(DrawCommand {
            label: "spinning-cube",
            pipeline: Pipeline::Colored,
            texture: None,
            vertices: 0..CUBE_VERTEX_COUNT,
            world,
            view,
        });
        draws
    }

    /// In first person the cube is attached to the camera like a held
    /// item; in third person it marks the orbit's point of interest.
    fn spinning_cube_transforms(&self, camera: &Camera, view: Mat4) -> (Mat4, Mat4) {
        let spin = Mat4::from_rotation_y(self.spin_angle.to_radians());
        match camera.mode() {
            CameraMode::FirstPerson => {
                let held = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0))
                    * spin
                    * Mat4::from_scale(Vec3::splat(0.01));
                (Mat4::IDENTITY, held)
            }
            CameraMode::ThirdPerson => {
                let world = Mat4::from_translation(camera.position())
                    * spin
                    * Mat4::from_scale(Vec3::splat(0.1));
                (world, view)
            }
        }
    }
}

fn cube_draw(
    label: &'static str,
    pipeline: Pipeline,
    texture: TextureSlot,
    world: Mat4,
    view: Mat4,
) -> DrawCommand {
    DrawCommand {
        label,
        pipeline,
        texture: Some(texture),
        vertices: 0..CUBE_VERTEX_COUNT,
        world,
        view,
    }
}

pub fn car_position(angle: f32, radius: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// Places the car on its circle, facing along the direction of travel.
pub fn car_world(angle: f32, radius: f32) -> Mat4 {
    Mat4::from_translation(car_position(angle, radius))
        * Mat4::from_rotation_y(-angle + 90f32.to_radians())
}

pub fn roof_world(car: Mat4) -> Mat4 {
    car * Mat4::from_scale(Vec3::new(0.5, 0.25, 1.0))
        * Mat4::from_translation(Vec3::new(0.0, 2.5, 0.0))
}

/// Wheels are squashed cubes below the body, rolling ten times faster
/// than the car turns.
pub fn wheel_world(car: Mat4, offset: Vec2, angle: f32) -> Mat4 {
    car * Mat4::from_scale(Vec3::new(0.4, 0.4, 0.2))
        * Mat4::from_translation(Vec3::new(5.0 * offset.x, -0.5, 5.0 * offset.y))
        * Mat4::from_rotation_z(10.0 * angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(&Settings::default())
    }

    #[test]
    fn car_starts_on_positive_x() {
        let scene = scene();
        assert!(scene.car_position().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-6));
        // Local -X points along the direction of travel.
        let heading = scene.car_world().transform_vector3(Vec3::NEG_X);
        assert!(heading.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn car_stays_on_its_circle() {
        let mut scene = scene();
        for _ in 0..50 {
            scene.advance(0.037);
            assert!((scene.car_position().length() - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn wheel_is_parent_relative() {
        let mut scene = scene();
        scene.advance(0.8);
        let car = scene.car_world();
        let local = Mat4::from_scale(Vec3::new(0.4, 0.4, 0.2))
            * Mat4::from_translation(Vec3::new(-2.5, -0.5, 2.5))
            * Mat4::from_rotation_z(10.0 * scene.car_angle());
        assert!(wheel_world(car, WHEEL_OFFSETS[0], scene.car_angle())
            .abs_diff_eq(car * local, 1e-6));
    }

    #[test]
    fn transforms_do_not_depend_on_frame_split() {
        let mut coarse = scene();
        let mut fine = scene();
        coarse.advance(1.0);
        for _ in 0..100 {
            fine.advance(0.01);
        }
        assert!((coarse.car_angle() - fine.car_angle()).abs() < 1e-4);
        for offset in WHEEL_OFFSETS {
            let a = wheel_world(coarse.car_world(), offset, coarse.car_angle());
            let b = wheel_world(fine.car_world(), offset, fine.car_angle());
            assert!(a.abs_diff_eq(b, 1e-3));
        }
    }

    #[test]
    fn roof_sits_above_body() {
        let car = car_world(0.0, 5.0);
        let roof_center = roof_world(car).transform_point3(Vec3::ZERO);
        assert!(roof_center.abs_diff_eq(Vec3::new(5.0, 0.625, 0.0), 1e-5));
    }

    #[test]
    fn draw_list_orders_skybox_first() {
        let scene = scene();
        let camera = Camera::new(&Settings::default());
        let draws = scene.draw_list(&camera);
        assert_eq!(draws.len(), 13);
        assert!(draws[..6].iter().all(|d| d.pipeline == Pipeline::Skybox));
        assert_eq!(draws[6].texture, Some(TextureSlot::Cement));
        assert_eq!(draws[6].label, "car-body");
        assert_eq!(draws[12].pipeline, Pipeline::Colored);
        assert_eq!(draws[12].texture, None);
        let sky_ranges: Vec<_> = draws[..6].iter().map(|d| d.vertices.clone()).collect();
        assert_eq!(sky_ranges[1], CubeFace::Far.vertex_range());
        assert_eq!(draws[1].texture, Some(TextureSlot::Sky(CubeFace::Far)));
    }

    #[test]
    fn spinning_cube_follows_camera_mode() {
        let mut scene = scene();
        scene.advance(0.5);
        let mut camera = Camera::new(&Settings::default());

        let held = scene.draw_list(&camera).pop().unwrap();
        assert_eq!(held.world, Mat4::IDENTITY);
        let center = held.view.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));

        camera.update(
            &crate::camera::CameraControls {
                select_mode: Some(CameraMode::ThirdPerson),
                ..Default::default()
            },
            0.0,
        );
        let marker = scene.draw_list(&camera).pop().unwrap();
        assert_eq!(marker.view, camera.view_matrix());
        let center = marker.world.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(camera.position(), 1e-6));
    }

    #[test]
    fn every_slot_has_a_distinct_file() {
        let mut paths: Vec<_> = TextureSlot::ALL.iter().map(|s| s.relative_path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), TextureSlot::ALL.len());
    }
}
