use std::collections::HashMap;

use bsp_atlas_core::prelude::*;
use bsp_atlas_core::sort_for_packing;

fn sides(atlas: &Atlas) -> Vec<u32> {
    atlas.pages.iter().map(|p| p.width).collect()
}

#[test]
fn small_scenario_overflows_because_of_the_gap() {
    let cfg = AtlasConfig::default();
    let atlas = pack_layout(vec![("a", 10, 10), ("b", 5, 5), ("c", 10, 10)], cfg).expect("pack");

    // a fills the 15px canvas corner; the 4px strips left by the gap cannot hold b or c.
    assert_eq!(sides(&atlas), vec![15, 12, 5]);
    let keys: Vec<Vec<&str>> = atlas
        .pages
        .iter()
        .map(|p| p.frames.iter().map(|f| f.key.as_str()).collect())
        .collect();
    assert_eq!(keys, vec![vec!["a"], vec!["c"], vec!["b"]]);
    assert_eq!(atlas.pages[0].frames[0].frame, Rect::new(0, 0, 10, 10));
    assert_eq!(atlas.pages[2].frames[0].frame, Rect::new(0, 0, 5, 5));
    let ids: Vec<usize> = atlas.pages.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn single_page_when_everything_fits() {
    let cfg = AtlasConfig::default();
    let atlas = pack_layout(vec![("a", 16, 7), ("b", 16, 7)], cfg).expect("pack");
    // side = max(ceil(sqrt(224)) = 15, 16) = 16; a on top, gap row 7, b from row 8.
    assert_eq!(sides(&atlas), vec![16]);
    assert_eq!(atlas.pages[0].frames[0].frame, Rect::new(0, 0, 16, 7));
    assert_eq!(atlas.pages[0].frames[1].frame, Rect::new(0, 8, 16, 7));
}

#[test]
fn equal_squares_shrink_the_canvas_page_by_page() {
    let cfg = AtlasConfig::default();
    let atlas = pack_layout(vec![("a", 50, 50), ("b", 50, 50), ("c", 50, 50)], cfg).expect("pack");
    assert_eq!(sides(&atlas), vec![87, 71, 50]);
    for page in &atlas.pages {
        assert_eq!(page.frames.len(), 1);
        assert_eq!(page.width, page.height);
        assert_eq!(page.frames[0].frame, Rect::new(0, 0, 50, 50));
    }
}

#[test]
fn every_image_is_placed_exactly_once() {
    let items: Vec<(String, u32, u32)> = (0..120u32)
        .map(|i| (format!("img{i}"), 3 + (i * 7) % 40, 2 + (i * 13) % 35))
        .collect();
    let atlas = pack_layout(items.clone(), AtlasConfig::default()).expect("pack");

    let mut seen: HashMap<String, usize> = HashMap::new();
    for page in &atlas.pages {
        for f in &page.frames {
            *seen.entry(f.key.clone()).or_default() += 1;
        }
    }
    assert_eq!(seen.len(), items.len());
    assert!(seen.values().all(|&n| n == 1));

    for (key, w, h) in &items {
        let frame = atlas
            .pages
            .iter()
            .flat_map(|p| p.frames.iter())
            .find(|f| &f.key == key)
            .expect("placed");
        assert_eq!((frame.frame.w, frame.frame.h), (*w, *h));
    }
}

#[test]
fn paginate_hands_back_trees_and_drains_the_working_set() {
    let mut items = vec![Size { w: 5, h: 5 }, Size { w: 10, h: 10 }, Size { w: 10, h: 10 }];
    sort_for_packing(&mut items, SortOrder::SumDesc);

    let mut pages = paginate(items, PADDING);
    let first = pages.next().expect("page").expect("ok");
    assert_eq!(first.id, 1);
    assert_eq!(first.side, 15);
    assert_eq!(first.root.placements().len(), 1);
    assert_eq!(pages.remaining().len(), 2);

    let rest: Vec<PagePlan<Size>> = pages.map(|p| p.expect("ok")).collect();
    assert_eq!(rest.iter().map(|p| p.side).collect::<Vec<_>>(), vec![12, 5]);
}

#[test]
fn sort_is_stable_for_equal_sums() {
    let cfg = AtlasConfig::default();
    // all sums are 10; input order must be kept
    let atlas = pack_layout(vec![("x", 2, 8), ("y", 8, 2), ("z", 5, 5)], cfg).expect("pack");
    let order: Vec<&str> = atlas
        .pages
        .iter()
        .flat_map(|p| p.frames.iter())
        .map(|f| f.key.as_str())
        .collect();
    assert_eq!(order.first(), Some(&"x"));
}

#[test]
fn unsorted_order_packs_in_input_order() {
    let cfg = AtlasConfig::builder().sort_order(SortOrder::None).build();
    let atlas = pack_layout(vec![("small", 5, 5), ("big", 10, 10)], cfg).expect("pack");
    // side = max(ceil(sqrt(125)) = 12, 10) = 12; small goes first at the origin.
    assert_eq!(atlas.pages[0].width, 12);
    assert_eq!(atlas.pages[0].frames[0].key, "small");
    assert_eq!(atlas.pages[0].frames[0].frame, Rect::new(0, 0, 5, 5));
}

#[test]
fn zero_padding_packs_tighter() {
    let cfg = AtlasConfig::builder().padding(0).build();
    let atlas = pack_layout(vec![("a", 10, 10), ("b", 5, 5), ("c", 10, 10)], cfg).expect("pack");
    let total: usize = atlas.pages.iter().map(|p| p.frames.len()).sum();
    assert_eq!(total, 3);
    assert!(atlas.pages.len() < 3);
}
