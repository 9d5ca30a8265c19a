use std::fmt;

use log::info;

use crate::camera::{Camera, CameraControls, CameraMode};
use crate::config::Settings;
use crate::scene::{DrawCommand, Scene};

/// Everything that changes from frame to frame, independent of the GPU.
#[derive(Debug, Clone)]
pub struct Simulation {
    camera: Camera,
    scene: Scene,
    frames: u64,
    elapsed: f32,
}

impl Simulation {
    pub fn new(settings: &Settings) -> Self {
        Self {
            camera: Camera::new(settings),
            scene: Scene::new(settings),
            frames: 0,
            elapsed: 0.0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the animation and camera by `dt` seconds and returns the
    /// draw list for the new state.
    pub fn step(&mut self, controls: &CameraControls, dt: f32) -> Vec<DrawCommand> {
        let previous_mode = self.camera.mode();
        self.scene.advance(dt);
        self.camera.update(controls, dt);
        if self.camera.mode() != previous_mode {
            info!("camera mode switched to {:?}", self.camera.mode());
        }
        self.frames += 1;
        self.elapsed += dt;
        self.scene.draw_list(&self.camera)
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }
}

/// Human readable dump of the simulation state, printed on exit.
pub struct Summary<'a>(&'a Simulation);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sim = self.0;
        let camera = sim.camera();
        let scene = sim.scene();
        let position = camera.position();
        let look_at = camera.look_at();
        let car = scene.car_position();
        let mode = match camera.mode() {
            CameraMode::FirstPerson => "first-person",
            CameraMode::ThirdPerson => "third-person",
        };
        writeln!(f, "Final state after {} frames ({:.2}s):", sim.frames, sim.elapsed)?;
        writeln!(
            f,
            " - camera {mode} pos=({:.2}, {:.2}, {:.2}) look=({:.2}, {:.2}, {:.2})",
            position.x, position.y, position.z, look_at.x, look_at.y, look_at.z
        )?;
        writeln!(
            f,
            " - camera angles horizontal={:.2} vertical={:.2}",
            camera.horizontal_angle(),
            camera.vertical_angle()
        )?;
        writeln!(
            f,
            " - car angle={:.2} pos=({:.2}, {:.2}, {:.2})",
            scene.car_angle(),
            car.x,
            car.y,
            car.z
        )?;
        write!(f, " - spinning cube angle={:.2}", scene.spin_angle())
    }
}
