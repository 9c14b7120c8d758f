// config.rs — startup configuration
//
// Looked up in this order:
//   1) --config <path>
//   2) env SPHERE_VIEWER_CONFIG
//   3) <exe_dir>/assets/viewer.json
//   4) ./assets/viewer.json
// Missing fields fall back to the built-in defaults; no file at all is fine.

use crate::app::Overlays;
use crate::camera::{DEFAULT_DISTANCE, DEFAULT_PITCH, DEFAULT_YAW};
use crate::geometry::GeometryMode;
use crate::model::{Lighting, Material, Shading};
use crate::settings::{GenerationParams, DEFAULT_OUTER_RADIUS, DEFAULT_RADIUS, DEFAULT_SUBDIVISIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SPHERE_VIEWER_CONFIG";
pub const LOG_FILE_NAME: &str = "sphere-viewer.log";

/// Log destination for builds that run without a console window.
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sphere Viewer".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub pitch: f32,
    pub yaw: f32,
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_PITCH,
            yaw: DEFAULT_YAW,
            distance: DEFAULT_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub mode: GeometryMode,
    pub subdivisions: u32,
    pub radius: u32,
    pub outer_radius: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            mode: GeometryMode::LatLong,
            subdivisions: DEFAULT_SUBDIVISIONS,
            radius: DEFAULT_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
        }
    }
}

impl GeometryConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams::new(self.mode, self.subdivisions, self.radius, self.outer_radius)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub geometry: GeometryConfig,
    pub lighting: Lighting,
    pub material: Material,
    pub shading: Shading,
    pub overlays: Overlays,
    pub screenshot_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            geometry: GeometryConfig::default(),
            lighting: Lighting::default(),
            material: Material::default(),
            shading: Shading::default(),
            overlays: Overlays::default(),
            screenshot_dir: PathBuf::from("."),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ViewerConfig =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Loads the explicit path if given, otherwise the first file found on
    /// the search path, otherwise defaults. Returns the file that was used.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        if let Ok(v) = std::env::var(CONFIG_ENV) {
            if !v.trim().is_empty() {
                let path = PathBuf::from(v);
                return Ok((Self::from_file(&path)?, Some(path)));
            }
        }

        match find_config_file() {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("camera.pitch", self.camera.pitch),
            ("camera.yaw", self.camera.yaw),
            ("camera.distance", self.camera.distance),
            ("lighting.ambient_strength", self.lighting.ambient_strength),
            ("lighting.diffuse_strength", self.lighting.diffuse_strength),
            ("lighting.specular_strength", self.lighting.specular_strength),
            ("material.roughness", self.material.roughness),
            ("material.refraction", self.material.refraction),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Validation(format!("{name} must be finite")));
        }

        let vectors = [
            ("lighting.position", self.lighting.position),
            ("lighting.color", self.lighting.color),
            ("material.color", self.material.color),
        ];
        if let Some((name, _)) = vectors.iter().find(|(_, v)| v.iter().any(|c| !c.is_finite())) {
            return Err(ConfigError::Validation(format!("{name} must be finite")));
        }

        if self.camera.distance <= 0.0 {
            return Err(ConfigError::Validation("camera.distance must be positive".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Validation("window size must be non-zero".into()));
        }
        Ok(())
    }
}

/// 1) <exe_dir>/assets/viewer.json
/// 2) ./assets/viewer.json
fn find_config_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join("viewer.json");
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join("viewer.json");
    if p.exists() {
        return Some(p);
    }

    None
}
