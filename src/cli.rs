// cli.rs — command-line overrides
use crate::config::ViewerConfig;
use crate::geometry::GeometryMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sphere-viewer")]
#[command(about = "Procedural sphere viewer", long_about = None)]
pub struct Cli {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tessellation: lat-long, cube-sphere or torus
    #[arg(long)]
    pub mode: Option<GeometryMode>,

    /// Subdivision count (raised to the mode's minimum)
    #[arg(long)]
    pub subdivisions: Option<u32>,

    /// Sphere radius (tube radius for the torus)
    #[arg(long)]
    pub radius: Option<u32>,

    /// Present without waiting for vblank
    #[arg(long = "no-vsync", default_value = "false")]
    pub no_vsync: bool,

    /// Directory screenshots are written to
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, config: &mut ViewerConfig) {
        if let Some(mode) = self.mode {
            config.geometry.mode = mode;
        }
        if let Some(subdivisions) = self.subdivisions {
            config.geometry.subdivisions = subdivisions;
        }
        if let Some(radius) = self.radius {
            config.geometry.radius = radius;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
        if let Some(dir) = &self.screenshot_dir {
            config.screenshot_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "sphere-viewer",
            "--mode",
            "cube-sphere",
            "--subdivisions",
            "12",
            "--no-vsync",
        ]);
        let mut config = ViewerConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.geometry.mode, GeometryMode::CubeSphere);
        assert_eq!(config.geometry.subdivisions, 12);
        assert!(!config.window.vsync);
        assert_eq!(config.geometry.radius, ViewerConfig::default().geometry.radius);
    }

    #[test]
    fn bad_mode_is_rejected() {
        let result = Cli::try_parse_from(["sphere-viewer", "--mode", "cone"]);
        assert!(result.is_err());
    }
}
