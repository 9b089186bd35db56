//! Node transforms and their GPU layout.
//!
//! [`Instance`] is a node's local translation, rotation and scale as GLTF
//! stores and animates it. World transforms are full matrices, so a
//! non-uniformly scaled, rotated parent shears its children the way the
//! exporting tool showed them. Each drawable node uploads its world matrix as
//! a one-element [`InstanceRaw`] buffer the model pipeline reads at vertex
//! slot 1.

use cgmath::{Matrix, Matrix3, Matrix4, One, Quaternion, SquareMatrix, Vector3};

use crate::data_structures::model;

/// Local translation, rotation and scale of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// `T * R * S`, the order GLTF composes node transforms in.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// A world matrix as the shaders read it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    handedness: f32,
}

impl InstanceRaw {
    /// Normals go through the inverse transpose of the upper 3x3, which stays
    /// perpendicular to surfaces under non-uniform scale and shear.
    pub fn from_world(world: &Matrix4<f32>) -> Self {
        let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
        let normal = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);
        Self {
            model: (*world).into(),
            normal: normal.into(),
            handedness: world.determinant().signum(),
        }
    }

    pub fn model(&self) -> Matrix4<f32> {
        self.model.into()
    }

    pub fn normal(&self) -> Matrix3<f32> {
        self.normal.into()
    }
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
            // world matrix, one vec4 per column
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4,
            // normal matrix
            9 => Float32x3,
            10 => Float32x3,
            11 => Float32x3,
            12 => Float32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}
