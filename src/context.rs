//! The GPU and window context shared by all flows.

use std::sync::Arc;

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalPosition, window::Window};

use crate::{
    camera::{self, CameraResources, CameraUniform, Projection},
    config::ViewerConfig,
    customize,
    data_structures::{model, skin, texture},
    pipelines::{
        Layouts, Pipelines,
        light::{LightResources, LightUniform},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButtonState {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    pub pressed: MouseButtonState,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub material_layout: wgpu::BindGroupLayout,
    pub skin_layout: wgpu::BindGroupLayout,
    /// Identity joint palette bound for meshes without a skin.
    pub default_skin: wgpu::BindGroup,
    pub clear_colour: wgpu::Color,
    pub mouse: MouseState,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an sRGB surface for encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let defaults = ViewerConfig::default();
        let camera = camera::Camera::looking_at(defaults.camera_position, defaults.camera_target);
        let projection = camera::Projection::new(
            config.width,
            config.height,
            cgmath::Deg(defaults.fovy_degrees),
            defaults.znear,
            defaults.zfar,
        );
        let camera_controller = camera::OrbitController::new(0.005, 0.1);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let camera = CameraResources {
            camera,
            controller: camera_controller,
            uniform: camera_uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        let depth_texture = texture::Texture::depth(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(light_uniform(&defaults), &device);
        let material_layout = model::material_layout(&device);
        let skin_layout = skin::skin_layout(&device);
        let default_skin = skin::identity_bind_group(&device, &skin_layout);

        let pipelines = Pipelines::new(
            &device,
            &config,
            Layouts {
                material: &material_layout,
                camera: &camera.bind_group_layout,
                light: &light.bind_group_layout,
                skin: &skin_layout,
            },
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            pipelines,
            material_layout,
            skin_layout,
            default_skin,
            clear_colour: customize::hex_to_wgpu_colour(defaults.background),
            mouse: MouseState::default(),
        })
    }

    /// Apply the viewer's camera, projection, light and background settings.
    pub fn configure(&mut self, config: &ViewerConfig) {
        self.camera.camera =
            camera::Camera::looking_at(config.camera_position, config.camera_target);
        self.projection.set_fovy(cgmath::Deg(config.fovy_degrees));
        self.projection.set_clip_planes(config.znear, config.zfar);
        self.light.uniform = light_uniform(config);
        self.light.write(&self.queue);
        self.clear_colour = customize::hex_to_wgpu_colour(config.background);
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

fn light_uniform(config: &ViewerConfig) -> LightUniform {
    let scaled = |hex: u32, intensity: f32| customize::hex_to_linear(hex).map(|c| c * intensity);
    LightUniform::new(
        config.light_position,
        scaled(config.light_colour, config.light_intensity),
        scaled(config.ambient_colour, config.ambient_intensity),
    )
}

/// The parts of [`Context`] a flow constructor may use to create GPU resources.
///
/// Device and queue are internally reference counted, cloning them is cheap.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub material_layout: wgpu::BindGroupLayout,
    pub skin_layout: wgpu::BindGroupLayout,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            material_layout: ctx.material_layout.clone(),
            skin_layout: ctx.skin_layout.clone(),
        }
    }
}
