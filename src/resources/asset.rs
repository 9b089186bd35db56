//! CPU side GLTF parsing.
//!
//! [`parse_gltf`] turns a `.gltf`/`.glb` file into a [`GltfAsset`]: a tree of
//! nodes carrying named sub-meshes, the materials, embedded images, skins and
//! animation clips. Nothing here touches the GPU, uploading happens in
//! [`crate::resources::LoadedModel::upload`].

use std::collections::HashMap;

use anyhow::{Context, bail};
use base64::Engine;
use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};

use crate::{
    animation::{AnimationClip, Channel, Interpolation, Keyframes},
    data_structures::{instance::Instance, model::ModelVertex},
    resources::load_binary,
};

#[derive(Clone, Debug)]
pub struct GltfAsset {
    pub roots: Vec<NodeData>,
    pub materials: Vec<MaterialData>,
    pub images: Vec<ImageData>,
    pub skins: Vec<SkinData>,
    /// Clips in file order.
    pub clips: Vec<AnimationClip>,
}

impl GltfAsset {
    /// Names of all sub-meshes in depth-first order.
    pub fn sub_mesh_names(&self) -> Vec<&str> {
        fn walk<'a>(node: &'a NodeData, out: &mut Vec<&'a str>) {
            out.extend(node.sub_meshes.iter().map(|m| m.name.as_str()));
            node.children.iter().for_each(|child| walk(child, out));
        }
        let mut names = Vec::new();
        self.roots.iter().for_each(|root| walk(root, &mut names));
        names
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct NodeData {
    /// GLTF node index, the address animation channels use.
    pub index: usize,
    pub name: Option<String>,
    pub transform: Instance,
    pub sub_meshes: Vec<SubMeshData>,
    pub skin: Option<usize>,
    pub children: Vec<NodeData>,
}

#[derive(Clone, Debug)]
pub struct SubMeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    pub name: String,
    /// Linear RGBA, straight from `pbrMetallicRoughness.baseColorFactor`.
    pub base_color: [f32; 4],
    pub base_color_image: Option<usize>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default material".to_string(),
            base_color: [1.0; 4],
            base_color_image: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    /// File extension hint derived from the mime type, e.g. `png`.
    pub format: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SkinData {
    /// GLTF node indices of the joints, in joint order.
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Matrix4<f32>>,
}

/// Hands out `name`, `name_1`, `name_2`, ... in request order.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: HashMap<String, usize>,
}

impl NameRegistry {
    pub fn unique(&mut self, name: &str) -> String {
        let name = sanitize_name(name);
        match self.used.get_mut(&name) {
            Some(count) => {
                *count += 1;
                format!("{}_{}", name, count)
            }
            None => {
                self.used.insert(name.clone(), 0);
                name
            }
        }
    }
}

/// Whitespace becomes `_`, characters reserved by property paths are dropped.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '.' | ':' | '/'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Decode an RFC 2397 `data:` URI. Returns `None` if `uri` is not one.
pub fn decode_data_uri(uri: &str) -> Option<anyhow::Result<(Option<String>, Vec<u8>)>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err(anyhow::anyhow!("data URI without payload separator")));
    };
    let Some(mime) = header.strip_suffix(";base64") else {
        return Some(Err(anyhow::anyhow!(
            "only base64 data URIs are supported, got header {:?}",
            header
        )));
    };
    let mime = (!mime.is_empty()).then(|| mime.to_string());
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map(|bytes| (mime, bytes))
            .context("invalid base64 in data URI"),
    )
}

async fn load_uri(root: &str, uri: &str) -> anyhow::Result<(Option<String>, Vec<u8>)> {
    match decode_data_uri(uri) {
        Some(decoded) => decoded,
        None => Ok((None, load_binary(root, uri).await?)),
    }
}

fn format_hint(mime: Option<&str>) -> Option<String> {
    mime.and_then(|mt| mt.split('/').last()).map(str::to_string)
}

pub async fn parse_gltf(bytes: &[u8], root: &str) -> anyhow::Result<GltfAsset> {
    let gltf = gltf::Gltf::from_slice(bytes).context("malformed GLTF document")?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.into()),
                None => bail!("buffer {} refers to a missing GLB chunk", buffer.index()),
            },
            gltf::buffer::Source::Uri(uri) => {
                let (_, bin) = load_uri(root, uri)
                    .await
                    .with_context(|| format!("failed to load buffer {}", buffer.index()))?;
                buffer_data.push(bin);
            }
        }
        let loaded = buffer_data.last().map_or(0, Vec::len);
        if loaded < buffer.length() {
            bail!(
                "buffer {} holds {} bytes but declares {}",
                buffer.index(),
                loaded,
                buffer.length()
            );
        }
    }

    // Load images
    let mut images = Vec::new();
    for image in gltf.images() {
        let image = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let start = view.offset();
                let end = start + view.length();
                let bytes = buffer_data
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..end))
                    .with_context(|| {
                        format!(
                            "image {} reads bytes {}..{} outside buffer {}",
                            image.index(),
                            start,
                            end,
                            view.buffer().index()
                        )
                    })?;
                ImageData {
                    bytes: bytes.to_vec(),
                    format: format_hint(Some(mime_type)),
                }
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let (data_mime, bytes) = load_uri(root, uri)
                    .await
                    .with_context(|| format!("failed to load image {}", uri))?;
                let format = format_hint(mime_type.or(data_mime.as_deref()))
                    .or_else(|| uri.rsplit('.').next().map(str::to_string));
                ImageData { bytes, format }
            }
        };
        images.push(image);
    }

    let materials = gltf
        .materials()
        .enumerate()
        .map(|(idx, material)| {
            let pbr = material.pbr_metallic_roughness();
            MaterialData {
                name: material
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("material_{}", idx)),
                base_color: pbr.base_color_factor(),
                base_color_image: pbr
                    .base_color_texture()
                    .map(|info| info.texture().source().index()),
            }
        })
        .collect();

    let skins = gltf
        .skins()
        .map(|skin| {
            let joints: Vec<usize> = skin.joints().map(|joint| joint.index()).collect();
            let reader = skin.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
            let inverse_bind_matrices = match reader.read_inverse_bind_matrices() {
                Some(matrices) => matrices.map(Matrix4::from).collect(),
                None => vec![Matrix4::identity(); joints.len()],
            };
            SkinData {
                joints,
                inverse_bind_matrices,
            }
        })
        .collect();

    let clips = gltf
        .animations()
        .map(|animation| read_clip(&animation, &buffer_data))
        .collect();

    let mut names = NameRegistry::default();
    let roots = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => {
            // Node names claim their spot in the namespace before any mesh does.
            let mut node_names = HashMap::new();
            scene
                .nodes()
                .for_each(|node| register_node_names(&node, &mut names, &mut node_names));
            let mut reader = NodeReader {
                buffers: &buffer_data,
                names,
                node_names,
            };
            scene.nodes().map(|node| reader.node(&node)).collect()
        }
        None => {
            log::warn!("GLTF file has no scene, nothing to draw");
            Vec::new()
        }
    };

    Ok(GltfAsset {
        roots,
        materials,
        images,
        skins,
        clips,
    })
}

fn register_node_names(
    node: &gltf::Node,
    names: &mut NameRegistry,
    out: &mut HashMap<usize, String>,
) {
    if let Some(name) = node.name() {
        out.entry(node.index()).or_insert_with(|| names.unique(name));
    }
    node.children()
        .for_each(|child| register_node_names(&child, names, out));
}

struct NodeReader<'a> {
    buffers: &'a [Vec<u8>],
    names: NameRegistry,
    /// Unique names of the named nodes, by node index.
    node_names: HashMap<usize, String>,
}

impl NodeReader<'_> {
    /// Every primitive draws a fresh name from the mesh name. A named node with
    /// a single primitive hands its own name to that sub-mesh instead.
    fn node(&mut self, node: &gltf::Node) -> NodeData {
        let name = self.node_names.get(&node.index()).cloned();
        let sub_meshes = match node.mesh() {
            Some(mesh) => {
                let base = mesh
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
                let single = mesh.primitives().len() == 1;
                mesh.primitives()
                    .map(|primitive| {
                        let unique = self.names.unique(&base);
                        let sub_mesh_name = match &name {
                            Some(node_name) if single => node_name.clone(),
                            _ => unique,
                        };
                        read_primitive(&primitive, sub_mesh_name, self.buffers)
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Instance {
            position: translation.into(),
            rotation: Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
            scale: scale.into(),
        };
        let children = node.children().map(|child| self.node(&child)).collect();

        NodeData {
            index: node.index(),
            name,
            transform,
            sub_meshes,
            skin: node.skin().map(|skin| skin.index()),
            children,
        }
    }
}

fn read_primitive(primitive: &gltf::Primitive, name: String, buffers: &[Vec<u8>]) -> SubMeshData {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .map(|positions| {
            positions
                .map(|position| ModelVertex {
                    position,
                    ..Default::default()
                })
                .collect()
        })
        .unwrap_or_default();
    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
    }
    if let Some(joints) = reader.read_joints(0) {
        vertices
            .iter_mut()
            .zip(joints.into_u16())
            .for_each(|(vertex, joints)| vertex.joints = joints.map(u32::from));
    }
    if let Some(weights) = reader.read_weights(0) {
        vertices
            .iter_mut()
            .zip(weights.into_f32())
            .for_each(|(vertex, weights)| vertex.weights = weights);
    }

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    SubMeshData {
        name,
        vertices,
        indices,
        material: primitive.material().index(),
    }
}

fn read_clip(animation: &gltf::Animation, buffers: &[Vec<u8>]) -> AnimationClip {
    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));
    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let Some(inputs) = reader.read_inputs() else {
            log::warn!("No timestamps in channel {} of {}", channel.index(), name);
            continue;
        };
        let timestamps: Vec<f32> = inputs.collect();
        let gltf_interpolation = channel.sampler().interpolation();
        let cubic = matches!(gltf_interpolation, gltf::animation::Interpolation::CubicSpline);
        let interpolation = match gltf_interpolation {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            _ => Interpolation::Linear,
        };
        let keyframes = match reader.read_outputs() {
            Some(gltf::animation::util::ReadOutputs::Translations(translations)) => {
                Keyframes::Translation(spline_values(translations.map(Vector3::from), cubic))
            }
            Some(gltf::animation::util::ReadOutputs::Rotations(rotations)) => {
                Keyframes::Rotation(spline_values(
                    rotations
                        .into_f32()
                        .map(|q| Quaternion::new(q[3], q[0], q[1], q[2])),
                    cubic,
                ))
            }
            Some(gltf::animation::util::ReadOutputs::Scales(scales)) => {
                Keyframes::Scale(spline_values(scales.map(Vector3::from), cubic))
            }
            Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) => {
                log::warn!("Morph target animation in {} is not supported, skipped", name);
                continue;
            }
            None => {
                log::warn!("No keyframes in channel {} of {}", channel.index(), name);
                continue;
            }
        };
        channels.push(Channel {
            node: channel.target().node().index(),
            interpolation,
            timestamps,
            keyframes,
        });
    }
    AnimationClip::new(name, channels)
}

/// Cubic spline outputs store (in-tangent, value, out-tangent) per key, keep the value.
fn spline_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}
