//! Binary-space-partition texture atlas packer.
//!
//! - Algorithm: a binary tree of free/filled regions; each image goes into the first free
//!   leaf that can hold it, splitting that leaf along the axis with more spare room
//! - Pages: a square canvas sized from the total image area; images that do not fit
//!   overflow onto further pages until every image is placed
//! - Pipeline: `pack_images` takes in-memory images and returns pages + metadata,
//!   `build_atlases` loads files and writes `atlas1.png`, `atlas2.png`, ...
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use bsp_atlas_core::{AtlasConfig, InputImage, pack_images};
//! # fn main() -> anyhow::Result<()> {
//! let img1 = ImageReader::open("a.png")?.decode()?;
//! let img2 = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { key: "a".into(), image: img1 },
//!   InputImage { key: "b".into(), image: img2 },
//! ];
//! let out = pack_images(inputs, AtlasConfig::default())?;
//! println!("pages: {}", out.pages.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod sprite;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use sprite::*;

/// Convenience prelude for common types and functions.
/// Importing `bsp_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder, SortOrder};
    pub use crate::error::AtlasError;
    pub use crate::model::{Atlas, Frame, Meta, PackStats, Page, Rect};
    pub use crate::packer::{AtlasNode, PADDING, estimate_canvas_size};
    pub use crate::sprite::{Extent, Size, Sprite};
    pub use crate::{
        BuiltAtlas, InputImage, OutputPage, PackOutput, PagePlan, build_atlases, pack_images,
        pack_images_with, pack_layout, paginate,
    };
}
