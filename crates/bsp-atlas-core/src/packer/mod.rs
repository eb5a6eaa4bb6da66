//! Binary-space-partition packing: the node tree and the canvas size estimate.

pub mod node;
pub mod sizer;

pub use node::AtlasNode;
pub use sizer::estimate_canvas_size;

/// Gap, in pixels, reserved between neighbouring images on a page.
pub const PADDING: u32 = 1;
