//! The textured ground plane.

use wgpu::util::DeviceExt;

use crate::data_structures::{
    model::{Material, Mesh, Model, ModelVertex},
    texture::Texture,
};

/// Used when the grass texture cannot be loaded.
pub const FALLBACK_GRASS: [u8; 4] = [0x4c, 0x8c, 0x3a, 0xff];

/// Corners of a `size` x `size` plane at y = 0, facing up, with texture
/// coordinates running from 0 to `repeat` so the sampler tiles the texture.
pub fn plane_vertices(size: f32, repeat: f32) -> [ModelVertex; 4] {
    let h = size / 2.0;
    let corner = |x: f32, z: f32, u: f32, v: f32| ModelVertex {
        position: [x, 0.0, z],
        tex_coords: [u, v],
        normal: [0.0, 1.0, 0.0],
        ..Default::default()
    };
    [
        corner(-h, -h, 0.0, 0.0),
        corner(-h, h, 0.0, repeat),
        corner(h, h, repeat, repeat),
        corner(h, -h, repeat, 0.0),
    ]
}

pub const PLANE_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

pub fn mk_ground(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    texture: Option<Texture>,
    size: f32,
    repeat: f32,
) -> Model {
    let texture = texture
        .unwrap_or_else(|| Texture::solid(device, queue, FALLBACK_GRASS, "ground fallback"));
    let material = Material::new(device, "ground", texture, [1.0; 4], layout);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Ground Vertex Buffer"),
        contents: bytemuck::cast_slice(&plane_vertices(size, repeat)),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Ground Index Buffer"),
        contents: bytemuck::cast_slice(&PLANE_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });

    Model {
        meshes: vec![Mesh {
            name: "ground".to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: PLANE_INDICES.len() as u32,
            material: 0,
        }],
        materials: vec![material],
    }
}
