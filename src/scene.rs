//! The 3D part of the viewer: ground plane, the alpaca and its animation.

use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    config::ViewerConfig,
    context::{Context, InitContext},
    data_structures::{
        ground::mk_ground,
        instance::Instance,
        scene_graph::{ModelNode, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    render::Render,
    resources::{LoadedModel, ModelLayouts, load_gltf_asset, load_texture},
    viewer::{ViewerEvent, ViewerState},
};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;

pub const GROUND_ID: u32 = 2;
/// IDs of the model's drawables start here and count up in load order.
pub const MODEL_FIRST_ID: u32 = 3;

pub struct SceneFlow {
    config: ViewerConfig,
    init: InitContext,
    ground: ModelNode,
    model: Option<LoadedModel>,
    title: String,
}

impl SceneFlow {
    /// Build the ground plane. The model is loaded in the background once
    /// [`GraphicsFlow::on_init`] runs; until it arrives only the ground is drawn.
    pub async fn new(init: InitContext, config: ViewerConfig) -> Self {
        let texture = match load_texture(
            &config.asset_root,
            &config.ground_texture_file,
            &init.device,
            &init.queue,
        )
        .await
        {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Ground texture unavailable, using flat grass: {:#}", e);
                None
            }
        };
        let ground = mk_ground(
            &init.device,
            &init.queue,
            &init.material_layout,
            texture,
            config.ground_size,
            config.ground_repeat,
        );
        let ground = ModelNode::from_model(
            None,
            Some("ground".to_string()),
            Instance::new(),
            GROUND_ID,
            &init.device,
            ground,
            None,
        );
        Self {
            config,
            init,
            ground,
            model: None,
            title: String::new(),
        }
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }
}

impl GraphicsFlow<ViewerState, ViewerEvent> for SceneFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ViewerState) -> Out<ViewerEvent> {
        ctx.configure(&self.config);

        let root = self.config.asset_root.clone();
        let file = self.config.model_file.clone();
        let load = async move {
            match load_gltf_asset(&root, &file).await {
                Ok(asset) => ViewerEvent::AssetParsed(asset),
                Err(e) => ViewerEvent::AssetFailed(format!("{:#}", e)),
            }
        };
        Out::FutEvent(vec![Box::pin(load)])
    }

    fn on_click(&mut self, _: &Context, _: &mut ViewerState, _: u32) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut ViewerState,
        dt: Duration,
    ) -> Out<ViewerEvent> {
        state.animation.update(dt.as_secs_f32());
        if let Some(model) = &mut self.model {
            model.pose(&state.animation.pose());
        }

        let title = state.title();
        if title == self.title {
            return Out::Empty;
        }
        self.title = title.clone();
        Out::Configure(Box::new(move |ctx| ctx.window().set_title(&title)))
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        _: &DeviceEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        _: &WindowEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        state: &mut ViewerState,
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        match event {
            ViewerEvent::Command(cmd) => {
                match &mut self.model {
                    Some(model) => state.apply(&cmd, model),
                    None => state.apply(&cmd, &mut ()),
                }
                None
            }
            ViewerEvent::AssetParsed(asset) => {
                let layouts = ModelLayouts {
                    material: &self.init.material_layout,
                    skin: &self.init.skin_layout,
                };
                let mut model = LoadedModel::upload(
                    asset,
                    &self.init.device,
                    &self.init.queue,
                    layouts,
                    MODEL_FIRST_ID,
                );
                state.on_model_loaded(std::mem::take(&mut model.clips));
                model.pose(&state.animation.pose());
                self.model = Some(model);
                None
            }
            ViewerEvent::AssetFailed(e) => {
                log::error!("Cannot load the model, showing the empty scene: {}", e);
                state.on_model_failed();
                None
            }
        }
    }

    fn on_render(&self) -> Render<'_> {
        let ground: &dyn SceneNode = &self.ground;
        let mut renders = vec![ground.into()];
        if let Some(model) = &self.model {
            renders.push(model.root.as_ref().into());
        }
        Render::Composed(renders)
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut ViewerState,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}
