use image::RgbaImage;

use crate::model::Rect;

/// Pixel size of something that can be placed in an atlas.
pub trait Extent {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// An image that can draw itself onto an atlas page.
///
/// `rect` is the placed region on `canvas`; its size equals the image size.
pub trait Sprite: Extent {
    fn composite_into(&self, canvas: &mut RgbaImage, rect: &Rect);
}

impl<S: Extent + ?Sized> Extent for &S {
    fn width(&self) -> u32 {
        (**self).width()
    }
    fn height(&self) -> u32 {
        (**self).height()
    }
}

impl<S: Sprite + ?Sized> Sprite for &S {
    fn composite_into(&self, canvas: &mut RgbaImage, rect: &Rect) {
        (**self).composite_into(canvas, rect)
    }
}

impl Extent for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }
    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

impl Sprite for RgbaImage {
    fn composite_into(&self, canvas: &mut RgbaImage, rect: &Rect) {
        crate::compositing::blit_rgba(self, canvas, rect.x, rect.y, rect.w, rect.h);
    }
}

/// Size-only stand-in used by layout passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Extent for Size {
    fn width(&self) -> u32 {
        self.w
    }
    fn height(&self) -> u32 {
        self.h
    }
}
