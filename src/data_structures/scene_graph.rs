//! Scene graph and hierarchical scene organization.
//!
//! A loaded GLTF scene becomes a tree of boxed [`SceneNode`]s. Nodes keep the
//! transform they were loaded with (the rest pose), the local transform an
//! animation pose put on top of it, and the resulting world matrix.
//! Drawable nodes ([`ModelNode`]) own their sub-meshes, one material each,
//! and an optional skin.

use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    animation::Pose,
    customize,
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{self, Material},
        skin::SkinBinding,
    },
    render::{Instanced, Render},
};

pub trait SceneNode {
    /// GLTF node index, `None` for nodes that were not loaded from a file.
    fn index(&self) -> Option<usize>;

    fn name(&self) -> Option<&str>;

    fn rest_transform(&self) -> Instance;

    fn get_local_transform(&self) -> Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_world_transform(&self) -> Matrix4<f32>;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Recompute this node's world matrix from `parent` and pass it down.
    fn update_world_transforms(&mut self, parent: &Matrix4<f32>);

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Matrix4::identity());
    }

    /// Reset every node to its rest transform, then apply `pose` on top.
    fn apply_pose(&mut self, pose: &Pose) {
        let rest = self.rest_transform();
        let local = match self.index().and_then(|idx| pose.get(&idx)) {
            Some(node_pose) => node_pose.apply_to(&rest),
            None => rest,
        };
        self.set_local_transform(local);
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.apply_pose(pose));
    }

    fn collect_world_matrices(&self, out: &mut HashMap<usize, Matrix4<f32>>) {
        if let Some(idx) = self.index() {
            out.insert(idx, self.get_world_transform());
        }
        self.get_children()
            .iter()
            .for_each(|child| child.collect_world_matrices(out));
    }

    fn update_skins(
        &mut self,
        queue: &wgpu::Queue,
        world_matrices: &HashMap<usize, Matrix4<f32>>,
    ) {
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.update_skins(queue, world_matrices));
    }

    /// Depth-first search for the sub-mesh called `name`.
    fn find_material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.get_children_mut()
            .iter_mut()
            .find_map(|child| child.find_material_mut(name))
    }

    fn find_material(&self, name: &str) -> Option<&Material> {
        self.get_children()
            .iter()
            .find_map(|child| child.find_material(name))
    }

    fn sub_mesh_names(&self) -> Vec<String> {
        self.get_children()
            .iter()
            .flat_map(|child| child.sub_mesh_names())
            .collect()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.get_children()
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

impl<'a> From<&'a dyn SceneNode> for Render<'a> {
    fn from(sn: &'a dyn SceneNode) -> Self {
        Render::Defaults(sn.get_render())
    }
}

/// Transform-only node, e.g. an armature bone or a grouping node.
pub struct ContainerNode {
    index: Option<usize>,
    name: Option<String>,
    rest: Instance,
    local: Instance,
    world: Matrix4<f32>,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(index: Option<usize>, name: Option<String>, rest: Instance) -> Self {
        Self {
            index,
            name,
            rest,
            local: rest,
            world: rest.to_matrix(),
            children: Vec::new(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn index(&self) -> Option<usize> {
        self.index
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rest_transform(&self) -> Instance {
        self.rest
    }

    fn get_local_transform(&self) -> Instance {
        self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> Matrix4<f32> {
        self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parent: &Matrix4<f32>) {
        self.world = parent * self.local.to_matrix();
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }
}

pub struct ModelNode {
    index: Option<usize>,
    name: Option<String>,
    rest: Instance,
    local: Instance,
    world: Matrix4<f32>,
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    model: model::Model,
    skin: Option<SkinBinding>,
    id: u32,
}

impl ModelNode {
    pub fn from_model(
        index: Option<usize>,
        name: Option<String>,
        rest: Instance,
        id: u32,
        device: &wgpu::Device,
        model: model::Model,
        skin: Option<SkinBinding>,
    ) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[InstanceRaw::from_world(&rest.to_matrix())]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            index,
            name,
            rest,
            local: rest,
            world: rest.to_matrix(),
            children: Vec::new(),
            instance_buffer,
            model,
            skin,
            id,
        }
    }

    pub fn model(&self) -> &model::Model {
        &self.model
    }

    fn material_index(&self, name: &str) -> Option<usize> {
        self.model
            .meshes
            .iter()
            .find(|mesh| mesh.name == name)
            .map(|mesh| mesh.material)
    }
}

impl SceneNode for ModelNode {
    fn index(&self) -> Option<usize> {
        self.index
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn rest_transform(&self) -> Instance {
        self.rest
    }

    fn get_local_transform(&self) -> Instance {
        self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> Matrix4<f32> {
        self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parent: &Matrix4<f32>) {
        self.world = parent * self.local.to_matrix();
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn update_skins(
        &mut self,
        queue: &wgpu::Queue,
        world_matrices: &HashMap<usize, Matrix4<f32>>,
    ) {
        if let Some(skin) = &self.skin {
            skin.update(queue, &self.world, world_matrices);
        }
        self.children
            .iter_mut()
            .for_each(|child| child.update_skins(queue, world_matrices));
    }

    fn find_material_mut(&mut self, name: &str) -> Option<&mut Material> {
        match self.material_index(name) {
            Some(idx) => self.model.materials.get_mut(idx),
            None => self
                .children
                .iter_mut()
                .find_map(|child| child.find_material_mut(name)),
        }
    }

    fn find_material(&self, name: &str) -> Option<&Material> {
        match self.material_index(name) {
            Some(idx) => self.model.materials.get(idx),
            None => self
                .children
                .iter()
                .find_map(|child| child.find_material(name)),
        }
    }

    fn sub_mesh_names(&self) -> Vec<String> {
        self.model
            .meshes
            .iter()
            .map(|mesh| mesh.name.clone())
            .chain(self.children.iter().flat_map(|child| child.sub_mesh_names()))
            .collect()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        let raw: [InstanceRaw; 1] = [InstanceRaw::from_world(&self.world)];
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: 1,
                id: self.id,
                skin: self.skin.as_ref().map(|skin| &skin.bind_group),
            }])
            .collect()
    }
}

/// Recolour the sub-mesh `name` below `root`. Returns `false` if there is none.
pub fn set_sub_mesh_color(
    root: &mut dyn SceneNode,
    queue: &wgpu::Queue,
    name: &str,
    hex: u32,
) -> bool {
    match root.find_material_mut(name) {
        Some(material) => {
            material.set_color(queue, customize::hex_to_linear(hex));
            true
        }
        None => false,
    }
}
