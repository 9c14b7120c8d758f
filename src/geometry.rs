// geometry.rs — procedural sphere / torus tessellation

use crate::mesh::{Mesh, Vertex};
use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    LatLong,    // 经纬度球
    CubeSphere, // 立方体投影球
    Torus,
}

impl GeometryMode {
    pub const ALL: [GeometryMode; 3] = [
        GeometryMode::LatLong,
        GeometryMode::CubeSphere,
        GeometryMode::Torus,
    ];

    /// Fewest subdivisions that still close the surface without degenerate faces.
    pub const fn min_subdivisions(self) -> u32 {
        match self {
            GeometryMode::LatLong => 4,
            GeometryMode::CubeSphere => 1,
            GeometryMode::Torus => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GeometryMode::LatLong => "Lat/Long Sphere",
            GeometryMode::CubeSphere => "Cube Sphere",
            GeometryMode::Torus => "Torus",
        }
    }
}

impl fmt::Display for GeometryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GeometryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "latlong" | "uv" => Ok(GeometryMode::LatLong),
            "cubesphere" | "cube" => Ok(GeometryMode::CubeSphere),
            "torus" => Ok(GeometryMode::Torus),
            other => Err(format!(
                "unknown geometry mode '{other}' (expected lat-long, cube-sphere or torus)"
            )),
        }
    }
}

/// The six faces of the unit cube that gets inflated into a sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PosZ,
    NegZ,
    NegY,
    PosY,
    NegX,
    PosX,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosZ,
        CubeFace::NegZ,
        CubeFace::NegY,
        CubeFace::PosY,
        CubeFace::NegX,
        CubeFace::PosX,
    ];

    /// Columns of the face basis. A local grid point `(x, y, r)` lands on the
    /// face at `basisᵀ · local`, i.e. each output axis is the dot product of
    /// the local point with one column. The ±0.5 offsets center every face on
    /// the cube, so neighbouring faces produce identical edge vertices.
    pub const fn basis_columns(self) -> [[f32; 3]; 3] {
        match self {
            CubeFace::PosZ => [[1.0, 0.0, -0.5], [0.0, 1.0, -0.5], [0.0, 0.0, 0.5]],
            CubeFace::NegZ => [[1.0, 0.0, -0.5], [0.0, 1.0, -0.5], [0.0, 0.0, -0.5]],
            CubeFace::NegY => [[1.0, 0.0, -0.5], [0.0, 0.0, -0.5], [0.0, 1.0, -0.5]],
            CubeFace::PosY => [[1.0, 0.0, -0.5], [0.0, 0.0, 0.5], [0.0, 1.0, -0.5]],
            CubeFace::NegX => [[0.0, 0.0, -0.5], [0.0, 1.0, -0.5], [1.0, 0.0, -0.5]],
            CubeFace::PosX => [[0.0, 0.0, 0.5], [0.0, 1.0, -0.5], [1.0, 0.0, -0.5]],
        }
    }

    pub fn basis(self) -> Mat3 {
        let [c0, c1, c2] = self.basis_columns();
        Mat3::from_cols(Vec3::from_array(c0), Vec3::from_array(c1), Vec3::from_array(c2))
    }
}

/// Linear remap of `value` from `[in_min, in_max]` to `[out_min, out_max]`.
fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// UV sphere on a `(subdiv+1) × (subdiv+1)` grid.
///
/// The outer loop walks the polar angle `phi ∈ [0, π]` and the inner loop the
/// azimuth `theta ∈ [0, 2π]`, so vertex 0 sits on the north pole `(0, r, 0)`.
/// Triangle winding is `{k1, k2, k1+1}`, `{k2, k2+1, k1+1}`.
pub fn sphere_lat_long(subdiv: u32, radius: f32) -> Mesh {
    let n = subdiv as usize;
    let mut mesh = Mesh::with_capacity((n + 1) * (n + 1), 6 * n * n);
    let steps = subdiv as f32;

    for lon in 0..=subdiv {
        let phi = remap(lon as f32, 0.0, steps, 0.0, PI);
        let (sin_phi, cos_phi) = phi.sin_cos();

        for lat in 0..=subdiv {
            let theta = remap(lat as f32, 0.0, steps, 0.0, TAU);
            let (sin_theta, cos_theta) = theta.sin_cos();

            let position = Vec3::new(
                radius * cos_theta * sin_phi,
                radius * cos_phi,
                radius * sin_theta * sin_phi,
            );
            let normal = position / radius;
            let uv = [lat as f32 / steps, lon as f32 / steps];

            mesh.push_vertex(Vertex::new(position, normal, uv));
        }
    }

    let row = subdiv + 1;
    for lon in 0..subdiv {
        for lat in 0..subdiv {
            let k1 = lat * row + lon;
            let k2 = k1 + row;

            mesh.push_triangle(k1, k2, k1 + 1);
            mesh.push_triangle(k2, k2 + 1, k1 + 1);
        }
    }

    mesh
}

/// One face of the cube-sphere: a flat grid pushed onto the face plane, then
/// projected onto the sphere of the given radius.
pub fn cube_face(face: CubeFace, subdiv: u32, radius: f32) -> Mesh {
    let n = subdiv as usize;
    let mut mesh = Mesh::with_capacity((n + 1) * (n + 1), 6 * n * n);
    let step = radius / subdiv as f32;
    let to_face = face.basis().transpose();

    for y in 0..=subdiv {
        for x in 0..=subdiv {
            let local = Vec3::new(x as f32 * step, y as f32 * step, radius);
            let direction = (to_face * local).normalize();
            let uv = [x as f32 / subdiv as f32, y as f32 / subdiv as f32];

            mesh.push_vertex(Vertex::new(direction * radius, direction, uv));
        }
    }

    let row = subdiv + 1;
    for y in 0..subdiv {
        for x in 0..subdiv {
            let k1 = x + y * row;
            let k2 = x + (y + 1) * row;

            mesh.push_triangle(k1, k2, k2 + 1);
            mesh.push_triangle(k2 + 1, k1, k1 + 1);
        }
    }

    mesh
}

/// Six face meshes, ordered as [`CubeFace::ALL`].
pub fn sphere_from_cube(subdiv: u32, radius: f32) -> Vec<Mesh> {
    CubeFace::ALL
        .iter()
        .map(|&face| cube_face(face, subdiv, radius))
        .collect()
}

/// Torus around the Y axis. `ring_radius` is the distance from the origin to
/// the tube center, `tube_radius` the radius of the tube itself.
pub fn torus_lat_long(subdiv: u32, tube_radius: f32, ring_radius: f32) -> Mesh {
    let n = subdiv as usize;
    let mut mesh = Mesh::with_capacity((n + 1) * (n + 1), 6 * n * n);
    let steps = subdiv as f32;

    for ring in 0..=subdiv {
        let u = remap(ring as f32, 0.0, steps, 0.0, TAU);
        let (sin_u, cos_u) = u.sin_cos();

        for tube in 0..=subdiv {
            let v = remap(tube as f32, 0.0, steps, 0.0, TAU);
            let (sin_v, cos_v) = v.sin_cos();

            let normal = Vec3::new(cos_v * cos_u, sin_v, cos_v * sin_u);
            let center = Vec3::new(ring_radius * cos_u, 0.0, ring_radius * sin_u);
            let uv = [tube as f32 / steps, ring as f32 / steps];

            mesh.push_vertex(Vertex::new(center + normal * tube_radius, normal, uv));
        }
    }

    let row = subdiv + 1;
    for ring in 0..subdiv {
        for tube in 0..subdiv {
            let k1 = ring * row + tube;
            let k2 = k1 + row;

            mesh.push_triangle(k1, k2, k1 + 1);
            mesh.push_triangle(k2, k2 + 1, k1 + 1);
        }
    }

    mesh
}

/// Builds the mesh list for the given mode. `subdiv` is raised to the mode's
/// minimum if needed.
pub fn generate(mode: GeometryMode, subdiv: u32, radius: f32, outer_radius: f32) -> Vec<Mesh> {
    let subdiv = subdiv.max(mode.min_subdivisions());
    match mode {
        GeometryMode::LatLong => vec![sphere_lat_long(subdiv, radius)],
        GeometryMode::CubeSphere => sphere_from_cube(subdiv, radius),
        GeometryMode::Torus => vec![torus_lat_long(subdiv, radius, outer_radius)],
    }
}
