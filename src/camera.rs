//! Free-fly and orbit camera driven by mouse look and WASD movement.
//!
//! Angles are kept in degrees. The horizontal angle is measured from +X
//! towards -Z, so the starting angle of 90° looks down -Z.

use glam::{Mat4, Vec2, Vec3};

use crate::config::Settings;
use crate::input::{InputState, KeyCode, NamedKey};

/// Whether the view is taken from the camera position or from a sphere
/// around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    FirstPerson,
    ThirdPerson,
}

/// One frame worth of camera input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraControls {
    pub mouse_delta: Vec2,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub fast: bool,
    pub select_mode: Option<CameraMode>,
    pub reset: bool,
}

impl CameraControls {
    /// Samples held keys and drains the accumulated mouse motion.
    pub fn from_input(input: &InputState) -> Self {
        let select_mode = if input.is_key_down(KeyCode::Digit(1)) {
            Some(CameraMode::FirstPerson)
        } else if input.is_key_down(KeyCode::Digit(2)) {
            Some(CameraMode::ThirdPerson)
        } else {
            None
        };
        Self {
            mouse_delta: input.take_mouse_delta(),
            forward: input.is_key_down(KeyCode::W),
            backward: input.is_key_down(KeyCode::S),
            left: input.is_key_down(KeyCode::A),
            right: input.is_key_down(KeyCode::D),
            fast: input.is_shift_down(),
            select_mode,
            reset: input.is_key_down(KeyCode::Digit(0)),
        }
    }

    pub fn quit_requested(input: &InputState) -> bool {
        input.is_key_down(KeyCode::Named(NamedKey::Escape))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    look_at: Vec3,
    horizontal_angle: f32,
    vertical_angle: f32,
    mode: CameraMode,
    start: Vec3,
    speed: f32,
    fast_multiplier: f32,
    angular_speed: f32,
    orbit_radius: f32,
}

impl Camera {
    pub const UP: Vec3 = Vec3::Y;
    pub const MAX_VERTICAL_ANGLE: f32 = 85.0;
    pub const START_HORIZONTAL_ANGLE: f32 = 90.0;

    pub fn new(settings: &Settings) -> Self {
        Self {
            position: settings.camera_start,
            look_at: look_direction(Self::START_HORIZONTAL_ANGLE, 0.0),
            horizontal_angle: Self::START_HORIZONTAL_ANGLE,
            vertical_angle: 0.0,
            mode: CameraMode::FirstPerson,
            start: settings.camera_start,
            speed: settings.camera_speed,
            fast_multiplier: settings.fast_speed_multiplier,
            angular_speed: settings.angular_speed,
            orbit_radius: settings.orbit_radius,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Puts the camera back where it started, keeping the current mode.
    pub fn reset(&mut self) {
        self.position = self.start;
        self.horizontal_angle = Self::START_HORIZONTAL_ANGLE;
        self.vertical_angle = 0.0;
        self.look_at = look_direction(self.horizontal_angle, self.vertical_angle);
    }

    /// Advances the camera by `dt` seconds of input.
    pub fn update(&mut self, controls: &CameraControls, dt: f32) {
        if controls.reset {
            self.reset();
        }
        if let Some(mode) = controls.select_mode {
            self.mode = mode;
        }

        self.horizontal_angle -= controls.mouse_delta.x * self.angular_speed * dt;
        self.vertical_angle -= controls.mouse_delta.y * self.angular_speed * dt;
        self.vertical_angle = self
            .vertical_angle
            .clamp(-Self::MAX_VERTICAL_ANGLE, Self::MAX_VERTICAL_ANGLE);
        self.look_at = look_direction(self.horizontal_angle, self.vertical_angle);

        let speed = if controls.fast {
            self.speed * self.fast_multiplier
        } else {
            self.speed
        };
        let step = dt * speed;
        let side = self.side_vector();
        if controls.forward {
            self.position += self.look_at * step;
        }
        if controls.backward {
            self.position -= self.look_at * step;
        }
        if controls.right {
            self.position += side * step;
        }
        if controls.left {
            self.position -= side * step;
        }
    }

    /// Unit vector pointing to the camera's right.
    pub fn side_vector(&self) -> Vec3 {
        self.look_at.cross(Self::UP).normalize()
    }

    /// Eye position used for rendering. In third person this sits on a
    /// sphere around the camera position, behind the look direction.
    pub fn eye(&self) -> Vec3 {
        match self.mode {
            CameraMode::FirstPerson => self.position,
            CameraMode::ThirdPerson => self.position - self.look_at * self.orbit_radius,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        match self.mode {
            CameraMode::FirstPerson => {
                Mat4::look_at_rh(self.position, self.position + self.look_at, Self::UP)
            }
            CameraMode::ThirdPerson => Mat4::look_at_rh(self.eye(), self.position, Self::UP),
        }
    }
}

/// Converts horizontal/vertical angles in degrees to a unit direction.
pub fn look_direction(horizontal_degrees: f32, vertical_degrees: f32) -> Vec3 {
    let theta = horizontal_degrees.to_radians();
    let phi = vertical_degrees.to_radians();
    Vec3::new(phi.cos() * theta.cos(), phi.sin(), -phi.cos() * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn camera() -> Camera {
        Camera::new(&Settings::default())
    }

    fn assert_vec_eq(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-5),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let camera = camera();
        assert_vec_eq(camera.look_at(), Vec3::new(0.0, 0.0, -1.0));
        assert_vec_eq(camera.side_vector(), Vec3::X);
        assert_eq!(camera.position(), Vec3::new(0.6, 1.0, 10.0));
        assert_eq!(camera.mode(), CameraMode::FirstPerson);
    }

    #[test]
    fn vertical_angle_stays_clamped() {
        let mut camera = camera();
        let inputs = [-400.0, -5000.0, 12.0, 9000.0, 3.5, -0.25, 70000.0];
        for dy in inputs {
            let controls = CameraControls {
                mouse_delta: Vec2::new(dy * 0.5, dy),
                ..Default::default()
            };
            camera.update(&controls, DT);
            assert!(camera.vertical_angle().abs() <= Camera::MAX_VERTICAL_ANGLE);
        }
        assert_eq!(camera.vertical_angle(), -Camera::MAX_VERTICAL_ANGLE);
    }

    #[test]
    fn mouse_right_turns_clockwise_from_above() {
        let mut camera = camera();
        let controls = CameraControls {
            mouse_delta: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        camera.update(&controls, 1.0);
        assert!((camera.horizontal_angle() - 30.0).abs() < 1e-4);
        assert!(camera.look_at().x > 0.0);
    }

    #[test]
    fn movement_scales_with_time_and_boost() {
        let mut slow = camera();
        let mut fast = camera();
        let forward = CameraControls {
            forward: true,
            ..Default::default()
        };
        slow.update(&forward, 0.5);
        fast.update(
            &CameraControls {
                fast: true,
                ..forward
            },
            0.5,
        );
        assert_vec_eq(slow.position(), Vec3::new(0.6, 1.0, 9.5));
        assert_vec_eq(fast.position(), Vec3::new(0.6, 1.0, 5.0));
    }

    #[test]
    fn strafing_follows_side_vector() {
        let mut camera = camera();
        camera.update(
            &CameraControls {
                right: true,
                ..Default::default()
            },
            1.0,
        );
        assert_vec_eq(camera.position(), Vec3::new(1.6, 1.0, 10.0));
        camera.update(
            &CameraControls {
                left: true,
                backward: true,
                ..Default::default()
            },
            1.0,
        );
        assert_vec_eq(camera.position(), Vec3::new(0.6, 1.0, 11.0));
    }

    #[test]
    fn third_person_eye_sits_on_orbit_sphere() {
        let mut camera = camera();
        camera.update(
            &CameraControls {
                mouse_delta: Vec2::new(0.7, -0.4),
                select_mode: Some(CameraMode::ThirdPerson),
                ..Default::default()
            },
            0.5,
        );
        assert_eq!(camera.mode(), CameraMode::ThirdPerson);
        let distance = camera.eye().distance(camera.position());
        assert!((distance - 5.0).abs() < 1e-4);

        let view_space_target = camera.view_matrix().transform_point3(camera.position());
        assert_vec_eq(view_space_target, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn first_person_view_puts_target_ahead() {
        let camera = camera();
        let ahead = camera.position() + camera.look_at() * 3.0;
        let view_space = camera.view_matrix().transform_point3(ahead);
        assert_vec_eq(view_space, Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn reset_restores_start_and_keeps_mode() {
        let mut camera = camera();
        camera.update(
            &CameraControls {
                mouse_delta: Vec2::new(3.0, 2.0),
                forward: true,
                select_mode: Some(CameraMode::ThirdPerson),
                ..Default::default()
            },
            1.0,
        );
        camera.update(
            &CameraControls {
                reset: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(camera.position(), Vec3::new(0.6, 1.0, 10.0));
        assert_eq!(camera.horizontal_angle(), Camera::START_HORIZONTAL_ANGLE);
        assert_eq!(camera.mode(), CameraMode::ThirdPerson);
    }

    #[test]
    fn controls_sample_input_state() {
        let input = InputState::new();
        input.set_key_down(KeyCode::W);
        input.set_key_down(KeyCode::Digit(2));
        input.set_key_down(KeyCode::Named(NamedKey::LeftShift));
        input.add_mouse_motion(Vec2::new(4.0, 1.0));

        let controls = CameraControls::from_input(&input);
        assert!(controls.forward && controls.fast);
        assert_eq!(controls.select_mode, Some(CameraMode::ThirdPerson));
        assert_eq!(controls.mouse_delta, Vec2::new(4.0, 1.0));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
        assert!(!CameraControls::quit_requested(&input));
    }

    #[test]
    fn escape_requests_quit() {
        let input = InputState::new();
        input.set_key_down(KeyCode::Named(NamedKey::Escape));
        assert!(CameraControls::quit_requested(&input));
        input.set_key_up(KeyCode::Named(NamedKey::Escape));
        assert!(!CameraControls::quit_requested(&input));
    }

    #[test]
    fn digit_keys_select_mode_and_reset() {
        let input = InputState::new();
        input.set_key_down(KeyCode::Digit(1));
        assert_eq!(
            CameraControls::from_input(&input).select_mode,
            Some(CameraMode::FirstPerson)
        );
        input.set_key_up(KeyCode::Digit(1));
        assert_eq!(CameraControls::from_input(&input).select_mode, None);

        input.set_key_down(KeyCode::Digit(0));
        let controls = CameraControls::from_input(&input);
        assert!(controls.reset);
        assert_eq!(controls.select_mode, None);
    }
}
