// settings.rs — geometry generation parameters
//
// Setters clamp their input and report whether anything changed. Changes
// accumulate into a dirty flag that the render loop consumes once per frame,
// so several edits in the same frame cause a single regeneration.

use crate::geometry::{self, GeometryMode};
use crate::mesh::Mesh;

pub const DEFAULT_SUBDIVISIONS: u32 = 20;
pub const DEFAULT_RADIUS: u32 = 5;
pub const DEFAULT_OUTER_RADIUS: u32 = 10;

pub const MAX_SUBDIVISIONS: u32 = 256;
pub const MAX_RADIUS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    mode: GeometryMode,
    subdivisions: u32,
    radius: u32,
    outer_radius: u32,
    dirty: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            mode: GeometryMode::LatLong,
            subdivisions: DEFAULT_SUBDIVISIONS,
            radius: DEFAULT_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
            dirty: true,
        }
    }
}

impl GenerationParams {
    /// Parameters for `mode`, clamped into range. Starts dirty so the first
    /// frame builds the mesh.
    pub fn new(mode: GeometryMode, subdivisions: u32, radius: u32, outer_radius: u32) -> Self {
        let mut params = Self {
            mode,
            ..Self::default()
        };
        params.set_subdivisions(subdivisions);
        params.set_radius(radius);
        params.set_outer_radius(outer_radius);
        params.dirty = true;
        params
    }

    pub fn mode(&self) -> GeometryMode {
        self.mode
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn outer_radius(&self) -> u32 {
        self.outer_radius
    }

    pub fn min_subdivisions(&self) -> u32 {
        self.mode.min_subdivisions()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_mode(&mut self, mode: GeometryMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        self.enforce_minimum();
        self.mark()
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) -> bool {
        let value = subdivisions.clamp(self.min_subdivisions(), MAX_SUBDIVISIONS);
        self.update(|p| &mut p.subdivisions, value)
    }

    pub fn set_radius(&mut self, radius: u32) -> bool {
        self.update(|p| &mut p.radius, radius.clamp(1, MAX_RADIUS))
    }

    pub fn set_outer_radius(&mut self, outer_radius: u32) -> bool {
        self.update(|p| &mut p.outer_radius, outer_radius.clamp(1, MAX_RADIUS))
    }

    /// Raises the subdivision count to the current mode's minimum.
    pub fn enforce_minimum(&mut self) -> bool {
        let min = self.min_subdivisions();
        if self.subdivisions < min {
            self.subdivisions = min;
            return self.mark();
        }
        false
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn generate(&self) -> Vec<Mesh> {
        geometry::generate(
            self.mode,
            self.subdivisions,
            self.radius as f32,
            self.outer_radius as f32,
        )
    }

    fn update(&mut self, field: impl FnOnce(&mut Self) -> &mut u32, value: u32) -> bool {
        let slot = field(self);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.mark()
    }

    fn mark(&mut self) -> bool {
        self.dirty = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> GenerationParams {
        let mut params = GenerationParams::default();
        params.take_dirty();
        params
    }

    #[test]
    fn starts_dirty() {
        let mut params = GenerationParams::default();
        assert!(params.take_dirty());
        assert!(!params.take_dirty());
    }

    #[test]
    fn unchanged_value_is_not_a_change() {
        let mut params = clean();
        assert!(!params.set_subdivisions(DEFAULT_SUBDIVISIONS));
        assert!(!params.set_radius(DEFAULT_RADIUS));
        assert!(!params.set_mode(GeometryMode::LatLong));
        assert!(!params.is_dirty());
    }

    #[test]
    fn several_changes_collapse_into_one_regeneration() {
        let mut params = clean();
        assert!(params.set_subdivisions(30));
        assert!(params.set_radius(7));
        assert!(params.set_mode(GeometryMode::CubeSphere));
        assert!(params.take_dirty());
        assert!(!params.take_dirty());
    }

    #[test]
    fn subdivisions_clamp_to_mode_minimum() {
        let mut params = clean();
        params.set_subdivisions(1);
        assert_eq!(params.subdivisions(), 4);

        params.set_mode(GeometryMode::CubeSphere);
        assert!(params.set_subdivisions(1));
        assert_eq!(params.subdivisions(), 1);
    }

    #[test]
    fn switching_mode_raises_subdivisions() {
        let mut params = GenerationParams::new(GeometryMode::CubeSphere, 2, 5, 10);
        params.take_dirty();
        assert!(params.set_mode(GeometryMode::LatLong));
        assert_eq!(params.subdivisions(), 4);
        assert!(params.is_dirty());
    }

    #[test]
    fn radius_is_at_least_one() {
        let mut params = clean();
        params.set_radius(0);
        assert_eq!(params.radius(), 1);
        params.set_outer_radius(500);
        assert_eq!(params.outer_radius(), MAX_RADIUS);
    }
}
