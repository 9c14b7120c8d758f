use sphere_viewer::app::ViewerState;
use sphere_viewer::config::ViewerConfig;
use sphere_viewer::geometry::GeometryMode;
use sphere_viewer::mesh::Mesh;

fn state_with(mode: GeometryMode, subdivisions: u32, radius: u32) -> ViewerState<Mesh> {
    let mut config = ViewerConfig::default();
    config.geometry.mode = mode;
    config.geometry.subdivisions = subdivisions;
    config.geometry.radius = radius;
    ViewerState::new(&config)
}

#[cfg(test)]
mod regeneration_tests {
    use super::*;

    #[test]
    fn test_changing_any_parameter_replaces_meshes() {
        let mut state = state_with(GeometryMode::LatLong, 10, 2);
        assert!(state.regenerate_if_dirty(|m| m));
        let before = state.model.meshes().to_vec();

        state.params.set_radius(3);
        assert!(state.regenerate_if_dirty(|m| m));
        assert_eq!(state.model.meshes().len(), 1);
        assert_ne!(state.model.meshes()[0], before[0]);

        state.params.set_subdivisions(12);
        state.regenerate_if_dirty(|m| m);
        assert_eq!(state.model.meshes()[0].vertices.len(), 13 * 13);

        state.params.set_mode(GeometryMode::CubeSphere);
        state.regenerate_if_dirty(|m| m);
        assert_eq!(state.model.meshes().len(), 6);
    }

    #[test]
    fn test_one_rebuild_per_frame() {
        let mut state = state_with(GeometryMode::LatLong, 10, 2);
        state.regenerate_if_dirty(|m| m);

        state.params.set_radius(4);
        state.params.set_subdivisions(16);
        state.params.set_mode(GeometryMode::Torus);

        let mut uploads = 0;
        assert!(state.regenerate_if_dirty(|m| {
            uploads += 1;
            m
        }));
        assert_eq!(uploads, 1);
        assert!(!state.regenerate_if_dirty(|m| m));
    }

    #[test]
    fn test_minimum_is_enforced_on_mode_switch() {
        let mut state = state_with(GeometryMode::CubeSphere, 1, 1);
        state.regenerate_if_dirty(|m| m);
        assert_eq!(state.model.meshes()[0].vertices.len(), 4);

        state.params.set_mode(GeometryMode::LatLong);
        assert!(state.regenerate_if_dirty(|m| m));
        assert_eq!(state.params.subdivisions(), 4);
        assert_eq!(state.model.meshes()[0].vertices.len(), 25);
    }

    #[test]
    fn test_config_material_reaches_model() {
        let mut config = ViewerConfig::default();
        config.material.roughness = 0.9;
        config.lighting.diffuse_strength = 0.2;
        let state: ViewerState<Mesh> = ViewerState::new(&config);
        assert_eq!(state.model.material.roughness, 0.9);
        assert_eq!(state.model.lighting.diffuse_strength, 0.2);
    }
}
