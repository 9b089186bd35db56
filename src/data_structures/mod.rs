//! Engine data structures: models, textures, scene graphs, and instances.
//!
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data
//! - `scene_graph` enables hierarchical scene organization
//! - `skin` computes and uploads joint palettes
//! - `ground` builds the tiled ground plane

pub mod ground;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod skin;
pub mod texture;
