//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`] value each frame. The
//! engine sorts the contained objects into batches per pipeline (lit models,
//! then the GUI overlay) so each pipeline is bound once per frame.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)
//! - [`Flat<'a>`] contains data for flat (2D / GUI) rendering (vertex + index buffers)

use crate::data_structures::model::Model;

/// Data for instanced object rendering: a model, instance buffer, and object ID.
#[derive(Clone)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub id: u32,
    /// Joint palette; `None` binds the context's identity palette.
    pub skin: Option<&'a wgpu::BindGroup>,
}

/// Data for flat (2D / GUI) rendering: vertex coloured geometry in NDC.
///
/// `bounds` is the `[left, bottom, right, top]` rectangle the geometry covers
/// and is what pointer clicks are tested against.
#[derive(Clone)]
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub amount: usize,
    pub id: u32,
    pub bounds: [f32; 4],
}

impl Flat<'_> {
    pub fn contains(&self, ndc: [f32; 2]) -> bool {
        let [left, bottom, right, top] = self.bounds;
        (left..=right).contains(&ndc[0]) && (bottom..=top).contains(&ndc[1])
    }
}

/// Specifies how a flow's objects should be rendered.
///
/// - `None` renders nothing
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `GUI(Flat)` renders 2D elements on top of the scene
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
pub enum Render<'a> {
    None,
    Defaults(Vec<Instanced<'a>>),
    GUI(Flat<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Collect the GUI elements of this render together with the owning flow.
    pub(crate) fn collect_flats(self, flow_id: usize, out: &mut Vec<(usize, Flat<'a>)>) {
        match self {
            Render::GUI(flat) => out.push((flow_id, flat)),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect_flats(flow_id, out)),
            Render::None | Render::Defaults(_) => (),
        }
    }

    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, guis: &mut Vec<Flat<'a>>) {
        match self {
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::GUI(flat) => guis.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, guis)),
            Render::None => (),
        }
    }
}
