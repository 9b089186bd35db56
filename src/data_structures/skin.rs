//! Joint matrices for linear blend skinning.

use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::resources::asset::SkinData;

/// Size of the joint palette. WebGL2 guarantees enough uniform space for this.
pub const MAX_JOINTS: usize = 64;

type RawJoint = [[f32; 4]; 4];

pub fn skin_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("skin_bind_group_layout"),
    })
}

fn mk_palette(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let identity: RawJoint = Matrix4::<f32>::identity().into();
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&vec![identity; MAX_JOINTS]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
    });
    (buffer, bind_group)
}

/// Palette of identity joints for meshes without a skin.
pub fn identity_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::BindGroup {
    mk_palette(device, layout, "identity skin").1
}

#[derive(Debug)]
pub struct SkinBinding {
    joints: Vec<usize>,
    inverse_bind_matrices: Vec<Matrix4<f32>>,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl SkinBinding {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, skin: &SkinData) -> Self {
        if skin.joints.len() > MAX_JOINTS {
            log::warn!(
                "Skin has {} joints, only the first {} are animated",
                skin.joints.len(),
                MAX_JOINTS
            );
        }
        let (buffer, bind_group) = mk_palette(device, layout, "skin joints");
        Self {
            joints: skin.joints.iter().copied().take(MAX_JOINTS).collect(),
            inverse_bind_matrices: skin.inverse_bind_matrices.clone(),
            buffer,
            bind_group,
        }
    }

    /// Upload `inverse(mesh_world) * joint_world * inverse_bind` for every joint.
    pub fn update(
        &self,
        queue: &wgpu::Queue,
        mesh_world: &Matrix4<f32>,
        world_matrices: &HashMap<usize, Matrix4<f32>>,
    ) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&joint_matrices(
                &self.joints,
                &self.inverse_bind_matrices,
                mesh_world,
                world_matrices,
            )),
        );
    }
}

/// Joints missing from `world_matrices` (outside the loaded scene) stay at identity.
pub fn joint_matrices(
    joints: &[usize],
    inverse_bind_matrices: &[Matrix4<f32>],
    mesh_world: &Matrix4<f32>,
    world_matrices: &HashMap<usize, Matrix4<f32>>,
) -> Vec<RawJoint> {
    let to_mesh_space = mesh_world.invert().unwrap_or_else(Matrix4::identity);
    joints
        .iter()
        .enumerate()
        .map(|(i, joint)| {
            let inverse_bind = inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or_else(Matrix4::identity);
            match world_matrices.get(joint) {
                Some(joint_world) => (to_mesh_space * *joint_world * inverse_bind).into(),
                None => Matrix4::<f32>::identity().into(),
            }
        })
        .collect()
}
