//! Loading of models and textures from the asset root.
//!
//! Natively files are read from `<asset_root>/<file>`, under wasm they are
//! fetched from `<origin>/<asset_root>/<file>`. GLTF files are read and parsed
//! by [`load_gltf_asset`] away from the event loop, the resulting plain data is
//! then uploaded into a scene graph by [`LoadedModel::upload`].

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::{
    animation::{AnimationClip, Pose},
    customize::SubMeshColors,
    data_structures::{
        model::{self, Material, Mesh},
        scene_graph::{self, ContainerNode, ModelNode, SceneNode},
        skin::SkinBinding,
        texture::Texture,
    },
    resources::asset::{GltfAsset, NodeData},
};

pub mod asset;

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(root: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(root).join(file_name);
        std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data)
}

pub async fn load_texture(
    root: &str,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(root, file_name).await?;
    let extension = file_name.rsplit('.').next();
    Texture::decode(device, queue, &data, file_name, extension)
}

/// Bind group layouts a model upload needs.
pub struct ModelLayouts<'a> {
    pub material: &'a wgpu::BindGroupLayout,
    pub skin: &'a wgpu::BindGroupLayout,
}

/// A GLTF scene living on the GPU, plus the clips that animate it.
pub struct LoadedModel {
    pub root: Box<dyn SceneNode>,
    pub clips: Vec<AnimationClip>,
    queue: wgpu::Queue,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("sub_meshes", &self.root.sub_mesh_names())
            .field("clips", &self.clips.len())
            .finish()
    }
}

impl LoadedModel {
    pub fn upload(
        asset: GltfAsset,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: ModelLayouts<'_>,
        first_id: u32,
    ) -> Self {
        let white = Texture::solid(device, queue, [255, 255, 255, 255], "white");
        let textures: Vec<Option<Texture>> = asset
            .images
            .iter()
            .enumerate()
            .map(|(idx, image)| {
                let label = format!("gltf image {}", idx);
                let format = image.format.as_deref();
                match Texture::decode(device, queue, &image.bytes, &label, format) {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        log::warn!("Image {} could not be decoded, using white: {}", idx, e);
                        None
                    }
                }
            })
            .collect();

        let mut uploader = Uploader {
            asset: &asset,
            device,
            queue,
            layouts,
            textures,
            white,
            next_id: first_id,
        };
        let mut roots: Vec<Box<dyn SceneNode>> = asset
            .roots
            .iter()
            .map(|node| uploader.node(node))
            .collect();

        let mut root = if roots.len() == 1 {
            roots.remove(0)
        } else {
            let mut container =
                ContainerNode::new(None, Some("Scene".to_string()), Default::default());
            container.children = roots;
            Box::new(container) as Box<dyn SceneNode>
        };
        root.update_world_transform_all();
        root.write_to_buffers(queue);

        let mut model = Self {
            root,
            clips: asset.clips,
            queue: queue.clone(),
        };
        model.pose(&Pose::new());
        model
    }

    /// Put `pose` on top of the rest pose and push transforms and joints to the GPU.
    pub fn pose(&mut self, pose: &Pose) {
        self.root.apply_pose(pose);
        self.root.update_world_transform_all();
        let mut world_matrices = std::collections::HashMap::new();
        self.root.collect_world_matrices(&mut world_matrices);
        self.root.update_skins(&self.queue, &world_matrices);
        self.root.write_to_buffers(&self.queue);
    }

    /// Linear RGBA of the sub-mesh `name`.
    pub fn sub_mesh_color(&self, name: &str) -> Option<[f32; 4]> {
        self.root.find_material(name).map(Material::color)
    }
}

impl SubMeshColors for LoadedModel {
    fn set_sub_mesh_color(&mut self, name: &str, hex: u32) -> bool {
        scene_graph::set_sub_mesh_color(self.root.as_mut(), &self.queue, name, hex)
    }
}

struct Uploader<'a> {
    asset: &'a GltfAsset,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layouts: ModelLayouts<'a>,
    textures: Vec<Option<Texture>>,
    white: Texture,
    next_id: u32,
}

impl Uploader<'_> {
    fn node(&mut self, data: &NodeData) -> Box<dyn SceneNode> {
        let mut node: Box<dyn SceneNode> = if data.sub_meshes.is_empty() {
            Box::new(ContainerNode::new(
                Some(data.index),
                data.name.clone(),
                data.transform,
            ))
        } else {
            let skin = data
                .skin
                .and_then(|idx| self.asset.skins.get(idx))
                .map(|skin| SkinBinding::new(self.device, self.layouts.skin, skin));
            let id = self.next_id;
            self.next_id += 1;
            Box::new(ModelNode::from_model(
                Some(data.index),
                data.name.clone(),
                data.transform,
                id,
                self.device,
                self.model(data),
                skin,
            ))
        };
        for child in &data.children {
            node.add_child(self.node(child));
        }
        node
    }

    fn model(&self, data: &NodeData) -> model::Model {
        let mut meshes = Vec::with_capacity(data.sub_meshes.len());
        let mut materials = Vec::with_capacity(data.sub_meshes.len());
        for sub_mesh in &data.sub_meshes {
            let material_data = sub_mesh
                .material
                .and_then(|idx| self.asset.materials.get(idx))
                .cloned()
                .unwrap_or_default();
            let texture = material_data
                .base_color_image
                .and_then(|idx| self.textures.get(idx).cloned().flatten())
                .unwrap_or_else(|| self.white.clone());
            materials.push(Material::new(
                self.device,
                &sub_mesh.name,
                texture,
                material_data.base_color,
                self.layouts.material,
            ));

            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Vertex Buffer", sub_mesh.name)),
                    contents: bytemuck::cast_slice(&sub_mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Index Buffer", sub_mesh.name)),
                    contents: bytemuck::cast_slice(&sub_mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            meshes.push(Mesh {
                name: sub_mesh.name.clone(),
                vertex_buffer,
                index_buffer,
                num_elements: sub_mesh.indices.len() as u32,
                material: materials.len() - 1,
            });
        }
        model::Model { meshes, materials }
    }
}

/// Fetch and parse a GLTF file. Touches no GPU state, so it can run on any thread.
pub async fn load_gltf_asset(root: &str, file_name: &str) -> anyhow::Result<GltfAsset> {
    let bytes = load_binary(root, file_name).await?;
    let asset = asset::parse_gltf(&bytes, root)
        .await
        .with_context(|| format!("cannot parse {}", file_name))?;
    log::info!(
        "Parsed {} with sub-meshes {:?} and clips {:?}",
        file_name,
        asset.sub_mesh_names(),
        asset.clip_names()
    );
    Ok(asset)
}
