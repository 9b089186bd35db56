#![allow(dead_code)]

use std::collections::HashMap;

use alpaca_viewer::{
    animation::{AnimationClip, Channel, Interpolation, Keyframes},
    customize::SubMeshColors,
};
#[cfg(feature = "integration-tests")]
use alpaca_viewer::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};
use base64::Engine;
use cgmath::Vector3;

/// Stands in for the GPU model: records the last colour written per sub-mesh.
pub(crate) struct RecordedColors {
    pub(crate) present: Vec<String>,
    pub(crate) colors: HashMap<String, u32>,
    pub(crate) misses: Vec<String>,
}

impl RecordedColors {
    /// A model with the sub-meshes `Cube`, `Cube_1` ... `Cube_7`.
    pub(crate) fn alpaca() -> Self {
        Self::with_meshes(
            std::iter::once("Cube".to_string())
                .chain((1..8).map(|i| format!("Cube_{}", i)))
                .collect(),
        )
    }

    pub(crate) fn with_meshes(present: Vec<String>) -> Self {
        Self {
            present,
            colors: HashMap::new(),
            misses: Vec::new(),
        }
    }

    pub(crate) fn color(&self, name: &str) -> Option<u32> {
        self.colors.get(name).copied()
    }
}

impl SubMeshColors for RecordedColors {
    fn set_sub_mesh_color(&mut self, name: &str, hex: u32) -> bool {
        if self.present.iter().any(|mesh| mesh == name) {
            self.colors.insert(name.to_string(), hex);
            true
        } else {
            self.misses.push(name.to_string());
            false
        }
    }
}

/// A clip moving node 0 from the origin to `(length, 0, 0)` over `length` seconds.
pub(crate) fn linear_clip(name: &str, length: f32) -> AnimationClip {
    AnimationClip::new(
        name,
        vec![Channel {
            node: 0,
            interpolation: Interpolation::Linear,
            timestamps: vec![0.0, length],
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(length, 0.0, 0.0),
            ]),
        }],
    )
}

pub(crate) struct FrameCounter(pub(crate) u32);
impl Default for FrameCounter {
    fn default() -> Self {
        Self(0)
    }
}
impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Validate = Box<
    dyn Fn(
        &Context,
        &FrameCounter,
        &image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error>,
>;

/// Renders nothing but the clear colour and validates the resulting frame.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestRender {
    pub(crate) setup: Box<dyn Fn(&mut Context)>,
    pub(crate) validate: Validate,
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter, ()> for TestRender {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<()> {
        (self.setup)(ctx);
        Out::Empty
    }

    fn on_click(&mut self, _: &Context, _: &mut FrameCounter, _: u32) -> Out<()> {
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut FrameCounter,
        _: instant::Duration,
    ) -> Out<()> {
        state.progress();
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &winit::event::DeviceEvent,
    ) -> Out<()> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &winit::event::WindowEvent,
    ) -> Out<()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut FrameCounter, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

#[macro_export]
macro_rules! golden_image_test {
    ($graphics_elem:expr) => {{
        use crate::common::test_utils::FrameCounter;
        use alpaca_viewer::flow::{FlowConstructor, GraphicsFlow};
        let constructor: FlowConstructor<FrameCounter, ()> = Box::new(|_| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> = Box::new($graphics_elem);
                g_flow
            })
        });

        alpaca_viewer::flow::run(vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}

/// A triangle, its indices and a one second translation track, packed into one buffer.
pub(crate) fn buffer() -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in [0.0_f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bytes.extend(v.to_le_bytes());
    }
    for i in [0_u16, 1, 2] {
        bytes.extend(i.to_le_bytes());
    }
    bytes.extend([0, 0]);
    for t in [0.0_f32, 1.0] {
        bytes.extend(t.to_le_bytes());
    }
    for v in [0.0_f32, 0.0, 0.0, 2.0, 0.0, 0.0] {
        bytes.extend(v.to_le_bytes());
    }
    bytes
}

pub(crate) fn alpaca_like_gltf(buffer_uri: &str, length: usize) -> String {
    let primitive = r#"{"attributes":{"POSITION":0},"indices":1,"material":0}"#;
    let primitives = vec![primitive; 8].join(",");
    format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "scene": 0,
  "scenes": [{{"nodes": [1, 2]}}],
  "nodes": [
    {{"name": "Alpaca", "mesh": 0, "translation": [0.0, 1.0, 0.0]}},
    {{"name": "Root", "children": [0]}},
    {{"name": "Extra", "mesh": 1}}
  ],
  "meshes": [
    {{"name": "Cube", "primitives": [{primitives}]}},
    {{"name": "Cube", "primitives": [{primitive}]}}
  ],
  "materials": [
    {{"name": "Fur", "pbrMetallicRoughness": {{"baseColorFactor": [0.5, 0.25, 0.125, 1.0]}}}}
  ],
  "animations": [
    {{"name": "Walk",
      "channels": [{{"sampler": 0, "target": {{"node": 0, "path": "translation"}}}}],
      "samplers": [{{"input": 2, "output": 3, "interpolation": "LINEAR"}}]}},
    {{"name": "Idle",
      "channels": [{{"sampler": 0, "target": {{"node": 0, "path": "translation"}}}}],
      "samplers": [{{"input": 2, "output": 3, "interpolation": "STEP"}}]}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}},
    {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}},
    {{"bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
      "min": [0.0], "max": [1.0]}},
    {{"bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3"}}
  ],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962}},
    {{"buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963}},
    {{"buffer": 0, "byteOffset": 44, "byteLength": 8}},
    {{"buffer": 0, "byteOffset": 52, "byteLength": 24}}
  ],
  "buffers": [{{"byteLength": {length}, "uri": "{buffer_uri}"}}]
}}"#
    )
}

/// [`alpaca_like_gltf`] with its buffer inlined as a `data:` URI.
pub(crate) fn embedded_gltf() -> String {
    let bytes = buffer();
    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );
    alpaca_like_gltf(&uri, bytes.len())
}
