//! Static viewer configuration.
//!
//! Everything the viewer needs to know before the first frame lives in
//! [`ViewerConfig`]. There is no config file: the defaults reproduce the
//! alpaca scene and the asset root can be pointed elsewhere natively through
//! the `ALPACA_ASSETS` environment variable.

/// Environment variable overriding [`ViewerConfig::asset_root`] on native targets.
pub const ASSET_ROOT_ENV: &str = "ALPACA_ASSETS";

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Directory (native) or URL path segment (wasm) that holds all assets.
    pub asset_root: String,
    pub model_file: String,
    pub ground_texture_file: String,
    /// sRGB hex of the sky colour used to clear every frame.
    pub background: u32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub ambient_colour: u32,
    pub ambient_intensity: f32,
    pub light_colour: u32,
    pub light_intensity: f32,
    /// The directional light shines from this point towards the origin.
    pub light_position: [f32; 3],
    pub ground_size: f32,
    pub ground_repeat: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            model_file: "Alpaca.gltf".to_string(),
            ground_texture_file: "grass.jpg".to_string(),
            background: 0x87ceeb,
            camera_position: [10.0, 10.0, 10.0],
            camera_target: [0.0, 0.0, 0.0],
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            ambient_colour: 0xffffff,
            ambient_intensity: 0.7,
            light_colour: 0xffffff,
            light_intensity: 1.0,
            light_position: [10.0, 10.0, 10.0],
            ground_size: 100.0,
            ground_repeat: 10.0,
        }
    }
}

impl ViewerConfig {
    /// Defaults with the asset root taken from `ALPACA_ASSETS` when set.
    ///
    /// Under wasm there is no process environment, so this is the same as
    /// [`ViewerConfig::default`].
    pub fn from_env() -> Self {
        let mut config = Self::default();
        #[cfg(not(target_arch = "wasm32"))]
        if let Ok(root) = std::env::var(ASSET_ROOT_ENV) {
            if !root.trim().is_empty() {
                log::info!("Using asset root {} from {}", root, ASSET_ROOT_ENV);
                config.asset_root = root;
            }
        }
        config
    }
}
