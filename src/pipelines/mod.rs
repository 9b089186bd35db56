//! Render pipelines.
//!
//! - `basic` draws lit, textured and skinned models
//! - `gui` draws flat, vertex coloured overlay quads
//! - `light` holds the scene light uniform the basic pipeline reads

pub mod basic;
pub mod gui;
pub mod light;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub gui: wgpu::RenderPipeline,
}

/// Layouts shared by every pipeline that draws models.
pub struct Layouts<'a> {
    pub material: &'a wgpu::BindGroupLayout,
    pub camera: &'a wgpu::BindGroupLayout,
    pub light: &'a wgpu::BindGroupLayout,
    pub skin: &'a wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        layouts: Layouts<'_>,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                layouts.material,
                layouts.camera,
                layouts.light,
                layouts.skin,
            ),
            gui: gui::mk_gui_pipeline(device, config),
        }
    }
}
