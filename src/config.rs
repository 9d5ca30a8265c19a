use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};

/// Tunable parameters for the window, camera and animated scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub camera_start: Vec3,
    pub camera_speed: f32,
    pub fast_speed_multiplier: f32,
    /// Degrees per second per pixel of mouse travel.
    pub angular_speed: f32,
    pub orbit_radius: f32,
    pub car_path_radius: f32,
    /// Radians per second.
    pub car_rotation_speed: f32,
    /// Degrees per second.
    pub spin_speed: f32,
    pub skybox_scale: f32,
    pub asset_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Circuit Scene".to_string(),
            window_width: 800,
            window_height: 600,
            field_of_view: 70.0,
            near_plane: 0.01,
            far_plane: 100.0,
            camera_start: Vec3::new(0.6, 1.0, 10.0),
            camera_speed: 1.0,
            fast_speed_multiplier: 10.0,
            angular_speed: 60.0,
            orbit_radius: 5.0,
            car_path_radius: 5.0,
            car_rotation_speed: 2.0,
            spin_speed: 180.0,
            skybox_scale: 100.0,
            asset_root: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Reads an XML settings file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read settings {}", path.display()))?;
        Self::from_xml(&xml).with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Parses a flat `<settings>` document; every tag is optional and
    /// missing tags keep their defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid settings XML")?;
        let root = document.root_element();
        if !root.has_tag_name("settings") {
            return Err(anyhow!(
                "expected <settings> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let defaults = Self::default();
        Ok(Self {
            title: optional_text(&root, "title").unwrap_or(defaults.title),
            window_width: parse_u32(&root, "window_width", defaults.window_width)?,
            window_height: parse_u32(&root, "window_height", defaults.window_height)?,
            field_of_view: parse_f32(&root, "field_of_view", defaults.field_of_view)?,
            near_plane: parse_f32(&root, "near_plane", defaults.near_plane)?,
            far_plane: parse_f32(&root, "far_plane", defaults.far_plane)?,
            camera_start: parse_vec3(&root, "camera_start", defaults.camera_start)?,
            camera_speed: parse_f32(&root, "camera_speed", defaults.camera_speed)?,
            fast_speed_multiplier: parse_f32(
                &root,
                "fast_speed_multiplier",
                defaults.fast_speed_multiplier,
            )?,
            angular_speed: parse_f32(&root, "angular_speed", defaults.angular_speed)?,
            orbit_radius: parse_f32(&root, "orbit_radius", defaults.orbit_radius)?,
            car_path_radius: parse_f32(&root, "car_path_radius", defaults.car_path_radius)?,
            car_rotation_speed: parse_f32(
                &root,
                "car_rotation_speed",
                defaults.car_rotation_speed,
            )?,
            spin_speed: parse_f32(&root, "spin_speed", defaults.spin_speed)?,
            skybox_scale: parse_f32(&root, "skybox_scale", defaults.skybox_scale)?,
            asset_root: optional_text(&root, "asset_root")
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_root),
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.window_height == 0 {
            1.0
        } else {
            self.window_width as f32 / self.window_height as f32
        }
    }
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_f32(node: &Node<'_, '_>, tag: &str, default: f32) -> Result<f32> {
    match optional_text(node, tag) {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse <{tag}>: {err}")),
        None => Ok(default),
    }
}

fn parse_u32(node: &Node<'_, '_>, tag: &str, default: u32) -> Result<u32> {
    match optional_text(node, tag) {
        Some(value) => value
            .parse::<u32>()
            .map_err(|err| anyhow!("failed to parse <{tag}>: {err}")),
        None => Ok(default),
    }
}

fn parse_vec3(node: &Node<'_, '_>, tag: &str, default: Vec3) -> Result<Vec3> {
    let Some(value) = optional_text(node, tag) else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("failed to parse <{tag}>: {err}"))?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!(
            "<{tag}> needs 3 components, found {}",
            components.len()
        )),
    }
}
