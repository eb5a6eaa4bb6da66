use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, RgbaImage};
use tracing::{debug, instrument};

use crate::config::{AtlasConfig, SortOrder};
use crate::error::{AtlasError, Result};
use crate::model::{Atlas, Frame, Meta, Page, Rect};
use crate::packer::{AtlasNode, estimate_canvas_size};
use crate::sprite::{Extent, Size, Sprite};

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Output RGBA page and its logical page record.
pub struct OutputPage {
    pub page: Page,
    pub rgba: RgbaImage,
}

/// Output of an in-memory packing run: atlas metadata and RGBA pages.
pub struct PackOutput {
    pub atlas: Atlas,
    pub pages: Vec<OutputPage>,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    pub fn stats(&self) -> crate::model::PackStats {
        self.atlas.stats()
    }
}

/// Result of [`build_atlases`]: metadata plus the page files in creation order.
#[derive(Debug, Clone)]
pub struct BuiltAtlas {
    pub atlas: Atlas,
    pub files: Vec<PathBuf>,
}

/// One packing pass: the square canvas side and the tree holding what was placed.
#[derive(Debug)]
pub struct PagePlan<T> {
    /// 1-based page number.
    pub id: usize,
    pub side: u32,
    pub root: AtlasNode<T>,
}

/// Page-by-page packing of an already sorted working set.
///
/// Each step sizes a fresh canvas for whatever is still unplaced, inserts the items in
/// order and carries the ones that did not fit over to the next page.
pub struct Pages<T> {
    remaining: Vec<T>,
    padding: u32,
    next_id: usize,
}

/// Starts the page loop over `items`, which are inserted in the given order.
pub fn paginate<T: Extent>(items: Vec<T>, padding: u32) -> Pages<T> {
    Pages {
        remaining: items,
        padding,
        next_id: 1,
    }
}

impl<T: Extent> Pages<T> {
    /// Items not yet placed on any page.
    pub fn remaining(&self) -> &[T] {
        &self.remaining
    }
}

impl<T: Extent> Iterator for Pages<T> {
    type Item = Result<PagePlan<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let side = estimate_canvas_size(&self.remaining);
        let total = self.remaining.len();
        let mut root = AtlasNode::root(side, self.padding);
        let mut deferred = Vec::new();
        for item in self.remaining.drain(..) {
            if let Err(item) = root.insert(item) {
                deferred.push(item);
            }
        }

        // The canvas always covers the largest remaining item, so at least one must land.
        if deferred.len() == total {
            return Some(Err(AtlasError::Invariant(format!(
                "page {} ({side}x{side}) placed none of {total} images",
                self.next_id
            ))));
        }

        let id = self.next_id;
        self.next_id += 1;
        debug!(
            page = id,
            side,
            placed = total - deferred.len(),
            deferred = deferred.len(),
            occupancy = root.occupied_area() as f64 / (side as f64 * side as f64),
            "page packed"
        );
        self.remaining = deferred;
        Some(Ok(PagePlan { id, side, root }))
    }
}

/// Orders items for packing. `SumDesc` puts the largest `width + height` first; the sort
/// is stable so equal sums keep their input order.
pub fn sort_for_packing<S: Extent>(items: &mut [S], order: SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::SumDesc => {
            items.sort_by(|a, b| {
                let sa = a.width() as u64 + a.height() as u64;
                let sb = b.width() as u64 + b.height() as u64;
                sb.cmp(&sa)
            });
        }
    }
}

trait Keyed {
    fn key(&self) -> &str;
}

impl<S: Keyed + ?Sized> Keyed for &S {
    fn key(&self) -> &str {
        (**self).key()
    }
}

struct Prep {
    key: String,
    rgba: RgbaImage,
}

impl Keyed for Prep {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Extent for Prep {
    fn width(&self) -> u32 {
        self.rgba.width()
    }
    fn height(&self) -> u32 {
        self.rgba.height()
    }
}

impl Sprite for Prep {
    fn composite_into(&self, canvas: &mut RgbaImage, rect: &Rect) {
        self.rgba.composite_into(canvas, rect)
    }
}

struct LayoutEntry {
    key: String,
    size: Size,
}

impl Keyed for LayoutEntry {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Extent for LayoutEntry {
    fn width(&self) -> u32 {
        self.size.w
    }
    fn height(&self) -> u32 {
        self.size.h
    }
}

fn page_record<T: Keyed>(plan: &PagePlan<T>) -> Page {
    let frames = plan
        .root
        .placements()
        .into_iter()
        .map(|(frame, item)| Frame {
            key: item.key().to_string(),
            frame,
        })
        .collect();
    Page {
        id: plan.id,
        width: plan.side,
        height: plan.side,
        frames,
    }
}

fn run_pages<T, F>(mut items: Vec<T>, cfg: &AtlasConfig, mut on_page: F) -> Result<Vec<Page>>
where
    T: Extent + Keyed,
    F: FnMut(&PagePlan<T>, &Page) -> Result<()>,
{
    sort_for_packing(&mut items, cfg.sort_order);
    let mut pages = Vec::new();
    for plan in paginate(items, cfg.padding) {
        let plan = plan?;
        let page = page_record(&plan);
        on_page(&plan, &page)?;
        pages.push(page);
    }
    Ok(pages)
}

/// Frame keys name placements in the exported metadata, so each must be unique.
fn ensure_unique_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(AtlasError::DuplicateKey(key.to_string()));
        }
    }
    Ok(())
}

fn build_meta(cfg: &AtlasConfig) -> Meta {
    Meta {
        schema_version: "1".into(),
        app: "bsp-atlas".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        format: "RGBA8888".into(),
        padding: cfg.padding,
        sort_order: cfg.sort_order,
        page_pattern: format!("{}{{n}}.png", cfg.name),
    }
}

#[instrument(skip_all)]
/// Packs `inputs` page by page, handing every composed page to `sink` as soon as it is
/// ready. Returns the atlas metadata for all pages.
///
/// An error from `sink` stops the run; pages already handed over are not revisited.
pub fn pack_images_with<F>(inputs: Vec<InputImage>, cfg: AtlasConfig, mut sink: F) -> Result<Atlas>
where
    F: FnMut(OutputPage) -> Result<()>,
{
    cfg.validate()?;

    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }
    ensure_unique_keys(inputs.iter().map(|inp| inp.key.as_str()))?;

    let prepared: Vec<Prep> = inputs
        .into_iter()
        .map(|inp| Prep {
            key: inp.key,
            rgba: inp.image.to_rgba8(),
        })
        .collect();
    let refs: Vec<&Prep> = prepared.iter().collect();

    let pages = run_pages(refs, &cfg, |plan, page| {
        let mut canvas = RgbaImage::new(plan.side, plan.side);
        plan.root.merge_to(&mut canvas);
        sink(OutputPage {
            page: page.clone(),
            rgba: canvas,
        })
    })?;

    Ok(Atlas {
        pages,
        meta: build_meta(&cfg),
    })
}

/// Packs `inputs` into atlas pages and returns metadata and RGBA pages.
pub fn pack_images(inputs: Vec<InputImage>, cfg: AtlasConfig) -> Result<PackOutput> {
    let mut pages = Vec::new();
    let atlas = pack_images_with(inputs, cfg, |page| {
        pages.push(page);
        Ok(())
    })?;
    Ok(PackOutput { atlas, pages })
}

#[instrument(skip_all)]
/// Packs sizes into pages without compositing pixel data.
/// Inputs are (key, width, height); placement matches [`pack_images`] for the same sizes.
pub fn pack_layout<K: Into<String>>(inputs: Vec<(K, u32, u32)>, cfg: AtlasConfig) -> Result<Atlas> {
    cfg.validate()?;

    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }
    let entries: Vec<LayoutEntry> = inputs
        .into_iter()
        .map(|(k, w, h)| LayoutEntry {
            key: k.into(),
            size: Size { w, h },
        })
        .collect();
    ensure_unique_keys(entries.iter().map(|e| e.key.as_str()))?;
    let refs: Vec<&LayoutEntry> = entries.iter().collect();
    let pages = run_pages(refs, &cfg, |_, _| Ok(()))?;
    Ok(Atlas {
        pages,
        meta: build_meta(&cfg),
    })
}

/// Decodes the image at `path`, guessing the format from its contents.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let load = || -> std::result::Result<DynamicImage, image::ImageError> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    };
    load().map_err(|source| AtlasError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads `path` as an [`InputImage`] keyed by its path (forward slashes).
pub fn load_input(path: &Path) -> Result<InputImage> {
    let image = load_image(path)?;
    let key = path.to_string_lossy().replace('\\', "/");
    Ok(InputImage { key, image })
}

/// Writes `page` as `{out_dir}/{name}{id}.png` and returns the path.
pub fn save_page(page: &OutputPage, out_dir: &Path, cfg: &AtlasConfig) -> Result<PathBuf> {
    let path = out_dir.join(cfg.page_file_name(page.page.id));
    page.rgba.save(&path)?;
    debug!(?path, page = page.page.id, "page written");
    Ok(path)
}

#[instrument(skip_all, fields(inputs = paths.len()))]
/// Loads every image in `paths`, packs them and writes `atlas1.png`, `atlas2.png`, ...
/// into `out_dir`.
///
/// Any image that fails to load, or a path listed twice, aborts the run before any page is
/// written. A failed page write aborts the remaining pages.
pub fn build_atlases<P: AsRef<Path>>(
    paths: &[P],
    out_dir: &Path,
    cfg: AtlasConfig,
) -> Result<BuiltAtlas> {
    cfg.validate()?;
    let inputs = paths
        .iter()
        .map(|p| load_input(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    ensure_unique_keys(inputs.iter().map(|inp| inp.key.as_str()))?;

    fs::create_dir_all(out_dir)?;
    let mut files = Vec::new();
    let save_cfg = cfg.clone();
    let atlas = pack_images_with(inputs, cfg, |page| {
        files.push(save_page(&page, out_dir, &save_cfg)?);
        Ok(())
    })?;
    Ok(BuiltAtlas { atlas, files })
}
