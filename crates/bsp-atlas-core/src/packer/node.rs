use image::RgbaImage;
use tracing::trace;

use crate::model::Rect;
use crate::sprite::{Extent, Sprite};

/// What a node currently is. A split node always owns exactly two children.
#[derive(Debug)]
enum NodeState<T> {
    Free,
    Filled(T),
    Split(Box<(AtlasNode<T>, AtlasNode<T>)>),
}

/// One region of a page in the binary partition tree.
///
/// A node is a free leaf, a filled leaf carrying its occupant, or an internal node with
/// two children that exactly tile its rect (minus the padding gap).
#[derive(Debug)]
pub struct AtlasNode<T> {
    rect: Rect,
    padding: u32,
    state: NodeState<T>,
}

impl<T> AtlasNode<T> {
    /// Free leaf covering `rect`. `padding` is inherited by every child split from it.
    pub fn new(rect: Rect, padding: u32) -> Self {
        Self {
            rect,
            padding,
            state: NodeState::Free,
        }
    }

    /// Square free root of side `side` at the origin.
    pub fn root(side: u32, padding: u32) -> Self {
        Self::new(Rect::new(0, 0, side, side), padding)
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn is_free(&self) -> bool {
        matches!(self.state, NodeState::Free)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.state, NodeState::Filled(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.state, NodeState::Split(_))
    }

    pub fn occupant(&self) -> Option<&T> {
        match &self.state {
            NodeState::Filled(item) => Some(item),
            _ => None,
        }
    }

    /// `(first, second)` for internal nodes.
    pub fn children(&self) -> Option<(&AtlasNode<T>, &AtlasNode<T>)> {
        match &self.state {
            NodeState::Split(children) => Some((&children.0, &children.1)),
            _ => None,
        }
    }

    /// Every filled leaf as `(rect, occupant)`, depth-first, first child before second.
    pub fn placements(&self) -> Vec<(Rect, &T)> {
        let mut out = Vec::new();
        self.collect_placements(&mut out);
        out
    }

    fn collect_placements<'a>(&'a self, out: &mut Vec<(Rect, &'a T)>) {
        match &self.state {
            NodeState::Free => {}
            NodeState::Filled(item) => out.push((self.rect, item)),
            NodeState::Split(children) => {
                children.0.collect_placements(out);
                children.1.collect_placements(out);
            }
        }
    }

    /// Sum of the areas of all filled leaves.
    pub fn occupied_area(&self) -> u64 {
        match &self.state {
            NodeState::Free => 0,
            NodeState::Filled(_) => self.rect.area(),
            NodeState::Split(children) => {
                children.0.occupied_area() + children.1.occupied_area()
            }
        }
    }

    /// Splits this free leaf so that its first child is `w` wide (vertical cut) or `h`
    /// tall (horizontal cut). The remainder child loses `padding` pixels; it saturates at
    /// zero size and never starts past the parent's far edge.
    fn split(&mut self, w: u32, h: u32) {
        let r = self.rect;
        let pad = self.padding;
        let width_diff = r.w - w;
        let height_diff = r.h - h;

        let (first, second) = if width_diff > height_diff {
            let x = (r.x + w).saturating_add(pad).min(r.right());
            (
                Rect::new(r.x, r.y, w, r.h),
                Rect::new(x, r.y, r.right() - x, r.h),
            )
        } else {
            let y = (r.y + h).saturating_add(pad).min(r.bottom());
            (
                Rect::new(r.x, r.y, r.w, h),
                Rect::new(r.x, y, r.w, r.bottom() - y),
            )
        };
        trace!(?r, ?first, ?second, "split node");
        self.state = NodeState::Split(Box::new((
            AtlasNode::new(first, pad),
            AtlasNode::new(second, pad),
        )));
    }
}

impl<T: Extent> AtlasNode<T> {
    /// Places `item` somewhere in this subtree, first fit, depth first.
    ///
    /// Returns the filled leaf now holding the item, or gives the item back when it does
    /// not fit anywhere here so the caller can defer it.
    pub fn insert(&mut self, item: T) -> Result<&AtlasNode<T>, T> {
        if self.is_internal() {
            return self.insert_into_children(item);
        }

        let (w, h) = (item.width(), item.height());
        if self.is_filled() || !self.rect.fits(w, h) {
            return Err(item);
        }

        if self.rect.w == w && self.rect.h == h {
            self.state = NodeState::Filled(item);
            return Ok(&*self);
        }

        self.split(w, h);
        match &mut self.state {
            NodeState::Split(children) => children.0.insert(item),
            _ => Err(item),
        }
    }

    fn insert_into_children(&mut self, item: T) -> Result<&AtlasNode<T>, T> {
        match &mut self.state {
            NodeState::Split(children) => {
                let (first, second) = &mut **children;
                match first.insert(item) {
                    Ok(node) => Ok(node),
                    Err(item) => second.insert(item),
                }
            }
            _ => Err(item),
        }
    }
}

impl<T: Sprite> AtlasNode<T> {
    /// Draws every occupant of this subtree onto `canvas` at its placed rect.
    pub fn merge_to(&self, canvas: &mut RgbaImage) {
        match &self.state {
            NodeState::Free => {}
            NodeState::Filled(item) => item.composite_into(canvas, &self.rect),
            NodeState::Split(children) => {
                children.0.merge_to(canvas);
                children.1.merge_to(canvas);
            }
        }
    }
}
