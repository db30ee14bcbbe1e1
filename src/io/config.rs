use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_background")]
    pub background_color: [u8; 3],
    /// Frames rendered in a headless run; the last one is saved.
    #[serde(default = "default_frames")]
    pub frames: usize,
    #[serde(default = "default_output")]
    pub output: String,
    /// Smallest edge-function area (pixels²) still rasterized.
    #[serde(default = "default_min_area")]
    pub min_triangle_area: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_background(),
            frames: default_frames(),
            output: default_output(),
            min_triangle_area: default_min_area(),
        }
    }
}

fn default_width() -> usize {
    960
}
fn default_height() -> usize {
    540
}
fn default_background() -> [u8; 3] {
    [50, 50, 50]
}
fn default_frames() -> usize {
    1
}
fn default_output() -> String {
    "frame.png".to_string()
}
fn default_min_area() -> f32 {
    10.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_near")]
    pub near: f32,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default)]
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            near: default_near(),
            fov: default_fov(),
            speed: default_speed(),
            rotation_speed: default_rotation_speed(),
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov.to_radians()
    }
}

fn default_near() -> f32 {
    0.1
}
fn default_fov() -> f32 {
    36.0
}
fn default_speed() -> f32 {
    0.1
}
fn default_rotation_speed() -> f32 {
    0.1
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    /// Binary scene file; the built-in demo is used when absent.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_demo")]
    pub demo: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: None,
            demo: default_demo(),
            seed: default_seed(),
        }
    }
}

fn default_demo() -> String {
    "showcase".to_string()
}
fn default_seed() -> u64 {
    7
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub steps: Vec<InputStep>,
}

/// One scripted input segment: movement held for `frames` frames, with the
/// mouse moved by `mouse` at its start.
#[derive(Debug, Clone, Deserialize)]
pub struct InputStep {
    #[serde(default = "default_step_frames")]
    pub frames: usize,
    #[serde(default)]
    pub up: f32,
    #[serde(default)]
    pub down: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub mouse: [f32; 2],
}

fn default_step_frames() -> usize {
    1
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects camera parameters that would turn the projection or the look
    /// rotation into NaN.
    pub fn validate(&self) -> Result<(), String> {
        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near.is_finite()) {
            return Err(format!("camera.near must be positive, got {}", camera.near));
        }
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(format!(
                "camera.fov must lie between 0 and 180 degrees, got {}",
                camera.fov
            ));
        }
        if !(camera.rotation_speed > 0.0 && camera.rotation_speed.is_finite()) {
            return Err(format!(
                "camera.rotation_speed must be positive, got {}",
                camera.rotation_speed
            ));
        }
        Ok(())
    }

    /// Background as a packed 0x00RRGGBB word.
    pub fn background(&self) -> u32 {
        let [r, g, b] = self.render.background_color;
        crate::core::color::pack_rgb(r, g, b)
    }
}
