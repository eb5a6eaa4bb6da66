use bsp_atlas_core::prelude::*;
use bsp_atlas_core::sort_for_packing;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_sizes(seed: u64, n: usize, max: u32) -> Vec<Size> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Size {
            w: rng.gen_range(1..=max),
            h: rng.gen_range(1..=max),
        })
        .collect()
}

fn check_containment<T>(node: &AtlasNode<T>) {
    if let Some((first, second)) = node.children() {
        assert!(node.rect().contains(first.rect()), "{:?} outside {:?}", first.rect(), node.rect());
        assert!(node.rect().contains(second.rect()), "{:?} outside {:?}", second.rect(), node.rect());
        assert!(!first.rect().intersects(second.rect()));
        assert!(node.occupant().is_none());
        check_containment(first);
        check_containment(second);
    }
}

/// Grows `r` by the gap on its right and bottom edges.
fn padded(r: &Rect, pad: u32) -> Rect {
    Rect::new(r.x, r.y, r.w + pad, r.h + pad)
}

#[test]
fn random_pages_keep_leaves_disjoint_and_contained() {
    for seed in 0..8u64 {
        let mut items = random_sizes(seed, 150, 48);
        sort_for_packing(&mut items, SortOrder::SumDesc);
        let total = items.len();

        let mut placed = 0;
        for plan in paginate(items, PADDING) {
            let plan = plan.expect("page");
            let page = Rect::new(0, 0, plan.side, plan.side);
            assert_eq!(plan.root.rect(), &page);
            check_containment(&plan.root);

            let leaves = plan.root.placements();
            assert!(!leaves.is_empty());
            for (rect, item) in &leaves {
                assert!(page.contains(rect));
                assert_eq!((rect.w, rect.h), (item.w, item.h));
            }
            for i in 0..leaves.len() {
                for j in (i + 1)..leaves.len() {
                    let a = padded(&leaves[i].0, PADDING);
                    let b = padded(&leaves[j].0, PADDING);
                    assert!(!a.intersects(&b), "{:?} touches {:?}", leaves[i].0, leaves[j].0);
                }
            }
            placed += leaves.len();
        }
        assert_eq!(placed, total);
    }
}

#[test]
fn first_page_always_places_the_largest_item() {
    for seed in 100..120u64 {
        let mut items = random_sizes(seed, 30, 200);
        sort_for_packing(&mut items, SortOrder::SumDesc);
        let largest = items[0];
        let plan = paginate(items, PADDING).next().expect("page").expect("ok");
        let (rect, item) = plan.root.placements()[0];
        assert_eq!(*item, largest);
        assert_eq!((rect.x, rect.y), (0, 0));
    }
}
