//! Viewer state shared by the scene and the panel, and the events between them.

use crate::{
    animation::{AnimationClip, AnimationSelector},
    command::Command,
    config::ViewerConfig,
    customize::{ColorTable, SubMeshColors},
    flow::{self, FlowConstructor, GraphicsFlow},
    panel::PanelFlow,
    resources::asset::GltfAsset,
    scene::SceneFlow,
};

pub enum ViewerEvent {
    /// A panel interaction.
    Command(Command),
    /// The parsed model, still to be uploaded to the GPU.
    AssetParsed(GltfAsset),
    /// The model could not be loaded; carries the rendered error chain.
    AssetFailed(String),
}

impl std::fmt::Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Self::AssetParsed(asset) => f
                .debug_tuple("AssetParsed")
                .field(&asset.sub_mesh_names())
                .finish(),
            Self::AssetFailed(e) => f.debug_tuple("AssetFailed").field(e).finish(),
        }
    }
}

/// Where the model load stands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Default)]
pub struct ViewerState {
    pub colors: ColorTable,
    pub animation: AnimationSelector,
    pub load: LoadState,
}

impl ViewerState {
    /// Take over the clips of a freshly loaded model; the first clip starts playing.
    pub fn on_model_loaded(&mut self, clips: Vec<AnimationClip>) {
        self.animation = AnimationSelector::new(clips);
        self.load = LoadState::Loaded;
    }

    pub fn on_model_failed(&mut self) {
        self.load = LoadState::Failed;
    }

    pub fn is_loaded(&self) -> bool {
        self.load == LoadState::Loaded
    }

    pub fn apply(&mut self, cmd: &Command, target: &mut dyn SubMeshColors) {
        log::debug!("Applying {:?}", cmd);
        match cmd {
            Command::SetColor(slot, hex) => self.colors.set_color(*slot, *hex, target),
            Command::ResetColors => self.colors.reset_all(target),
            Command::SelectClip(name) => {
                self.animation.select_clip(name);
            }
        }
    }

    /// Window title naming the playing clip.
    pub fn title(&self) -> String {
        match self.animation.active_clip() {
            Some(clip) => format!("Alpaca - {}", clip),
            None => "Alpaca".to_string(),
        }
    }
}

/// Build the scene and panel flows and run the viewer until the window closes.
pub fn start() -> anyhow::Result<()> {
    let config = ViewerConfig::from_env();
    let scene: FlowConstructor<ViewerState, ViewerEvent> = Box::new(move |ctx| {
        Box::pin(async move {
            Box::new(SceneFlow::new(ctx, config).await) as Box<dyn GraphicsFlow<_, _>>
        })
    });
    let panel: FlowConstructor<ViewerState, ViewerEvent> = Box::new(|ctx| {
        Box::pin(async move { Box::new(PanelFlow::new(ctx)) as Box<dyn GraphicsFlow<_, _>> })
    });

    flow::run(vec![scene, panel])
}
