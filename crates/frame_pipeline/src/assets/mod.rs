//! Asset management
//!
//! Reference-counted storage for the meshes, effects, sprites and textures
//! that frame entries point at.

pub mod asset_manager;

pub use asset_manager::{AssetError, AssetHandle, AssetManager};
