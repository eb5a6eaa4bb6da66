use serde::{Deserialize, Serialize};

use crate::config::SortOrder;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
///
/// Zero width or height is valid: a split can leave a remainder with no room left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// True if a `w x h` item is no larger than this rect on either axis.
    pub fn fits(&self, w: u32, h: u32) -> bool {
        self.w >= w && self.h >= h
    }
    /// Returns true if `r` lies inside `self`. Degenerate rects sitting on an edge count.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// True if both rects share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !self.is_empty()
            && !r.is_empty()
            && self.x < r.right()
            && r.x < self.right()
            && self.y < r.bottom()
            && r.y < self.bottom()
    }
}

/// A placed image within a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame<K = String> {
    /// User-specified key (e.g., filename or asset path).
    pub key: K,
    /// Placed rectangle within the page.
    pub frame: Rect,
}

/// A single atlas page (logical record). Pages are square and numbered from 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<K = String> {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Frame<K>>,
}

/// Atlas-level metadata written next to the pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub format: String,
    pub padding: u32,
    pub sort_order: SortOrder,
    /// Page file name pattern, `{n}` is the 1-based page number.
    pub page_pattern: String,
}

/// Atlas of pages and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas<K = String> {
    pub pages: Vec<Page<K>>,
    pub meta: Meta,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_pages: usize,
    pub num_frames: usize,
    /// Sum of `width * height` over all pages.
    pub total_page_area: u64,
    /// Sum of `w * h` over all frames.
    pub used_frame_area: u64,
    /// used_frame_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
    /// Side of the largest page.
    pub max_page_side: u32,
}

impl<K> Atlas<K> {
    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> PackStats {
        let mut num_frames = 0;
        let mut total_page_area = 0u64;
        let mut used_frame_area = 0u64;
        let mut max_page_side = 0u32;

        for page in &self.pages {
            total_page_area =
                total_page_area.saturating_add(page.width as u64 * page.height as u64);
            max_page_side = max_page_side.max(page.width.max(page.height));
            for frame in &page.frames {
                num_frames += 1;
                used_frame_area = used_frame_area.saturating_add(frame.frame.area());
            }
        }

        let occupancy = if total_page_area > 0 {
            used_frame_area as f64 / total_page_area as f64
        } else {
            0.0
        };

        PackStats {
            num_pages: self.pages.len(),
            num_frames,
            total_page_area,
            used_frame_area,
            occupancy,
            max_page_side,
        }
    }

    /// Total number of frames across all pages.
    pub fn frame_count(&self) -> usize {
        self.pages.iter().map(|p| p.frames.len()).sum()
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Frames: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Largest Page: {}px",
            self.num_pages,
            self.num_frames,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_frame_area,
            self.max_page_side,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_frame_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_page_area > 0 {
            (self.wasted_area() as f64 / self.total_page_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
