// model.rs — drawable model: meshes + material + lighting

use glam::Mat4;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            position: [-10.0, 10.0, 7.0],
            color: [1.0, 1.0, 1.0],
            ambient_strength: 0.055,
            diffuse_strength: 0.7,
            specular_strength: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub color: [f32; 3],
    pub roughness: f32,
    pub refraction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [0.95, 0.65, 0.55],
            roughness: 0.1,
            refraction: 0.5,
        }
    }
}

/// Fragment program used for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shading {
    #[default]
    Phong,
    Normals,
}

impl Shading {
    pub const ALL: [Shading; 2] = [Shading::Phong, Shading::Normals];

    pub const fn label(self) -> &'static str {
        match self {
            Shading::Phong => "Phong",
            Shading::Normals => "Normals",
        }
    }

    pub const fn fragment_entry(self) -> &'static str {
        match self {
            Shading::Phong => "fs_phong",
            Shading::Normals => "fs_normals",
        }
    }
}

/// Layout of `Model` in `shaders/phong.wgsl`. Each vec3 shares its 16-byte
/// slot with the scalar that follows it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    pub ambient_strength: f32,
    pub light_color: [f32; 3],
    pub diffuse_strength: f32,
    pub color: [f32; 3],
    pub specular_strength: f32,
    pub roughness: f32,
    pub refraction: f32,
    pub _pad: [f32; 2],
}

/// Scene model, generic over the mesh handle so the same state can hold CPU
/// meshes or uploaded GPU buffers.
#[derive(Debug, Clone)]
pub struct Model<M> {
    meshes: Vec<M>,
    pub shading: Shading,
    pub transform: Mat4,
    pub material: Material,
    pub lighting: Lighting,
}

impl<M> Default for Model<M> {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            shading: Shading::default(),
            transform: Mat4::IDENTITY,
            material: Material::default(),
            lighting: Lighting::default(),
        }
    }
}

impl<M> Model<M> {
    pub fn meshes(&self) -> &[M] {
        &self.meshes
    }

    /// Drops every current mesh and installs `meshes` in their place.
    pub fn replace_meshes(&mut self, meshes: impl IntoIterator<Item = M>) {
        self.meshes.clear();
        self.meshes.extend(meshes);
    }

    /// Same parameters with the meshes converted by `f`.
    pub fn map_meshes<N>(self, f: impl FnMut(M) -> N) -> Model<N> {
        Model {
            meshes: self.meshes.into_iter().map(f).collect(),
            shading: self.shading,
            transform: self.transform,
            material: self.material,
            lighting: self.lighting,
        }
    }

    pub fn uniforms(&self, view: Mat4, projection: Mat4) -> ModelUniform {
        let model_view = view * self.transform;
        let normal_matrix = model_view.inverse().transpose();

        ModelUniform {
            projection: projection.to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            // view-space position, so the light follows the camera
            light_pos: self.lighting.position,
            ambient_strength: self.lighting.ambient_strength,
            light_color: self.lighting.color,
            diffuse_strength: self.lighting.diffuse_strength,
            color: self.material.color,
            specular_strength: self.lighting.specular_strength,
            roughness: self.material.roughness,
            refraction: self.material.refraction,
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniform_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 256);
        assert_eq!(std::mem::size_of::<ModelUniform>() % 16, 0);
    }

    #[test]
    fn replace_drops_previous_meshes() {
        let mut model: Model<u32> = Model::default();
        model.replace_meshes([1, 2, 3]);
        model.replace_meshes([4]);
        assert_eq!(model.meshes(), &[4]);
    }

    #[test]
    fn model_view_is_view_times_transform() {
        let mut model: Model<()> = Model::default();
        model.transform = Mat4::from_translation(Vec3::X);
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let u = model.uniforms(view, Mat4::IDENTITY);
        let mv = Mat4::from_cols_array_2d(&u.model_view);
        let p = mv.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 0.0, -5.0)).length() < 1e-6);
    }

    #[test]
    fn light_position_is_uploaded_as_given() {
        let model: Model<()> = Model::default();
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0))
            * Mat4::from_rotation_y(1.2);
        let u = model.uniforms(view, Mat4::IDENTITY);
        assert_eq!(u.light_pos, [-10.0, 10.0, 7.0]);
        assert_eq!(u.color, [0.95, 0.65, 0.55]);
        assert_eq!(u.refraction, 0.5);
    }

    #[test]
    fn map_meshes_keeps_parameters() {
        let mut model: Model<u32> = Model::default();
        model.material.roughness = 0.7;
        model.replace_meshes([2, 3]);
        let mapped = model.map_meshes(|m| m as f32 * 0.5);
        assert_eq!(mapped.meshes(), &[1.0, 1.5]);
        assert_eq!(mapped.material.roughness, 0.7);
    }
}
