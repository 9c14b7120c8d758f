use glam::Vec3;
use sphere_viewer::geometry::{
    cube_face, generate, sphere_from_cube, sphere_lat_long, torus_lat_long, CubeFace, GeometryMode,
};
use sphere_viewer::mesh::Mesh;

const EPS: f32 = 1e-5;

fn assert_on_sphere(mesh: &Mesh, radius: f32) {
    for (i, v) in mesh.vertices.iter().enumerate() {
        let dist = v.position().length();
        assert!(
            (dist - radius).abs() < EPS * radius.max(1.0) * 4.0,
            "vertex {i} at distance {dist}, expected {radius}"
        );
        assert!(
            (v.normal().length() - 1.0).abs() < EPS,
            "vertex {i} normal length {}",
            v.normal().length()
        );
    }
}

#[cfg(test)]
mod lat_long_tests {
    use super::*;

    #[test]
    fn test_counts_follow_subdivision() {
        for s in [4u32, 5, 13, 20, 64] {
            let mesh = sphere_lat_long(s, 3.0);
            assert_eq!(mesh.vertices.len(), ((s + 1) * (s + 1)) as usize);
            assert_eq!(mesh.indices.len(), (6 * s * s) as usize);
            assert!(mesh.is_well_formed(), "subdiv {s} has out-of-range indices");
        }
    }

    #[test]
    fn test_vertices_lie_on_sphere_with_unit_normals() {
        for radius in [1.0, 5.0, 50.0] {
            assert_on_sphere(&sphere_lat_long(12, radius), radius);
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = sphere_lat_long(8, 7.0);
        for v in &mesh.vertices {
            let expected = v.position() / 7.0;
            assert!((v.normal() - expected).length() < EPS);
        }
    }

    #[test]
    fn test_smallest_sphere_end_to_end() {
        let mesh = sphere_lat_long(4, 1.0);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.indices.len(), 96);
        assert_eq!(mesh.triangle_count(), 32);

        let pole = mesh.vertices[0].position();
        assert!((pole - Vec3::new(0.0, 1.0, 0.0)).length() < EPS, "{pole:?}");
    }

    #[test]
    fn test_last_ring_is_south_pole() {
        let mesh = sphere_lat_long(6, 2.0);
        let last_ring = &mesh.vertices[6 * 7..];
        for v in last_ring {
            assert!((v.position() - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5);
        }
    }

    #[test]
    fn test_uvs_span_unit_square() {
        let mesh = sphere_lat_long(4, 1.0);
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[24].uv, [1.0, 1.0]);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| (0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1])));
    }
}

#[cfg(test)]
mod cube_sphere_tests {
    use super::*;

    #[test]
    fn test_six_faces_with_grid_counts() {
        for s in [1u32, 2, 7, 16] {
            let faces = sphere_from_cube(s, 5.0);
            assert_eq!(faces.len(), 6);
            let total: usize = faces.iter().map(|f| f.vertices.len()).sum();
            assert_eq!(total, 6 * ((s + 1) * (s + 1)) as usize);
            for face in &faces {
                assert_eq!(face.indices.len(), (6 * s * s) as usize);
                assert!(face.is_well_formed());
            }
        }
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        for radius in [1.0, 5.0, 33.0] {
            for face in sphere_from_cube(9, radius) {
                assert_on_sphere(&face, radius);
            }
        }
    }

    #[test]
    fn test_boundary_vertices_are_shared_between_faces() {
        let s = 6u32;
        let radius = 5.0;
        let faces: Vec<(CubeFace, Mesh)> = CubeFace::ALL
            .iter()
            .map(|&f| (f, cube_face(f, s, radius)))
            .collect();

        for (face, mesh) in &faces {
            for y in 0..=s {
                for x in 0..=s {
                    let on_edge = x == 0 || y == 0 || x == s || y == s;
                    if !on_edge {
                        continue;
                    }
                    let p = mesh.vertices[(x + y * (s + 1)) as usize].position();
                    let shared = faces
                        .iter()
                        .filter(|(other, _)| other != face)
                        .any(|(_, m)| m.vertices.iter().any(|v| (v.position() - p).length() < 1e-4));
                    assert!(shared, "{face:?} edge vertex ({x},{y}) at {p:?} has no twin");
                }
            }
        }
    }

    #[test]
    fn test_corner_lands_on_cube_diagonal() {
        let face = cube_face(CubeFace::PosZ, 3, 2.0);
        let corner = face.vertices[0].position();
        let expected = Vec3::new(-1.0, -1.0, 1.0).normalize() * 2.0;
        assert!((corner - expected).length() < 1e-5, "{corner:?}");
    }
}

#[cfg(test)]
mod torus_tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mesh = torus_lat_long(10, 2.0, 6.0);
        assert_eq!(mesh.vertices.len(), 121);
        assert_eq!(mesh.indices.len(), 600);
        assert!(mesh.is_well_formed());
    }

    #[test]
    fn test_vertices_lie_on_tube() {
        let (tube, ring) = (2.0, 6.0);
        let mesh = torus_lat_long(12, tube, ring);
        for v in &mesh.vertices {
            let p = v.position();
            let center = Vec3::new(p.x, 0.0, p.z).normalize() * ring;
            assert!(((p - center).length() - tube).abs() < 1e-4);
            assert!((v.normal().length() - 1.0).abs() < EPS);
            assert!((v.normal() - (p - center) / tube).length() < 1e-4);
        }
    }
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;

    #[test]
    fn test_mesh_count_per_mode() {
        assert_eq!(generate(GeometryMode::LatLong, 8, 1.0, 3.0).len(), 1);
        assert_eq!(generate(GeometryMode::CubeSphere, 8, 1.0, 3.0).len(), 6);
        assert_eq!(generate(GeometryMode::Torus, 8, 1.0, 3.0).len(), 1);
    }

    #[test]
    fn test_every_mode_is_well_formed() {
        for mode in GeometryMode::ALL {
            for mesh in generate(mode, mode.min_subdivisions(), 1.0, 3.0) {
                assert!(!mesh.is_empty(), "{mode:?}");
                assert!(mesh.is_well_formed(), "{mode:?}");
            }
        }
    }
}
