use crate::model::Atlas;
use serde_json::{Value, json};

/// Serialize the whole `Atlas` as a JSON object `{ pages, meta }` (array-of-pages style).
pub fn to_json_array<K: ToString>(atlas: &Atlas<K>) -> Value {
    let pages_val = atlas
        .pages
        .iter()
        .map(|p| {
            let frames_val: Vec<Value> = p
                .frames
                .iter()
                .map(|fr| {
                    json!({
                        "key": fr.key.to_string(),
                        "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
                    })
                })
                .collect();
            json!({
                "id": p.id,
                "width": p.width,
                "height": p.height,
                "frames": frames_val,
            })
        })
        .collect::<Vec<_>>();
    json!({"pages": pages_val, "meta": &atlas.meta})
}

/// Flatten frames keyed by name, with page id/size hints.
/// Shape: `{ frames: { name: { frame, page, pageSize } }, meta }`.
pub fn to_json_hash<K: ToString>(atlas: &Atlas<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for page in &atlas.pages {
        for fr in &page.frames {
            frames.insert(
                fr.key.to_string(),
                json!({
                    "frame": {"x": fr.frame.x, "y": fr.frame.y, "w": fr.frame.w, "h": fr.frame.h},
                    "page": page.id,
                    "pageSize": {"w": page.width, "h": page.height},
                }),
            );
        }
    }
    json!({ "frames": frames, "meta": &atlas.meta })
}

/// Pretty-printed JSON text for `value`.
pub fn to_pretty_string(value: &Value) -> crate::error::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| crate::error::AtlasError::Encode(e.to_string()))
}
