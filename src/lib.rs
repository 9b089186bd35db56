//! alpaca-viewer
//!
//! Shows an animated, recolourable alpaca loaded from a GLTF file, natively in
//! a window or in the browser on a `<canvas id="canvas">`. The viewer is built
//! on a small instancing wgpu engine: a [`flow`] event loop distributing input
//! to independent flows, render batching per pipeline, and resource loaders
//! that work from the filesystem as well as over HTTP.
//!
//! High-level modules
//! - `animation`: keyframe clips, sampling and the single-active-clip selector
//! - `camera`: orbit camera, projection and their uniforms
//! - `command`: commands produced by the control panel
//! - `config`: static viewer configuration
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `customize`: the colour binding table for the named sub-meshes
//! - `data_structures`: meshes, instances, textures, skins and the scene graph
//! - `flow`: flow control and the event loop
//! - `panel`: layout, hit testing and drawing of the control panel
//! - `pick`: GUI picking
//! - `pipelines`: the lit model pipeline and the flat GUI pipeline
//! - `render`: render composition for efficient pipeline reuse
//! - `resources`: GLTF and texture loading
//! - `scene`: the flow drawing the ground and the alpaca
//! - `viewer`: state shared between the flows and the entry point
//!

pub mod animation;
pub mod camera;
pub mod command;
pub mod config;
pub mod context;
pub mod customize;
pub mod data_structures;
pub mod flow;
pub mod panel;
pub mod pick;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod viewer;

pub use viewer::start;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    start().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
