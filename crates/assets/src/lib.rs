//! Asset access: resources are fetched through a [`ResourceResolver`], decoded
//! once, cached by path and drawn by path or alias.
//!
//! # Invariants
//! - At most one fetch per image path is in flight; concurrent requests share
//!   it.
//! - A load that completes after its drawer is gone touches no state.
//! - Metadata failures never fail an image load.

pub mod image_drawer;
pub mod resolver;
pub mod tiles;

pub use image_drawer::{ImageDrawer, ImageError, LoadImageOptions, PendingImage, Placement};
pub use resolver::{DirResolver, MemoryResolver, ResourceError, ResourceResolver, load_json};
pub use tiles::TileMetadata;

pub fn crate_info() -> &'static str {
    "mapedit-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }
}
