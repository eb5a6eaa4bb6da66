use image::RgbaImage;

/// Copy the top-left `(w, h)` block of `src` into `canvas` at destination `(dx, dy)`.
///
/// Pixels are replaced, alpha included, so a transparent source pixel stays transparent
/// on the page. Anything falling outside either image is clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, w: u32, h: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let w = w.min(sw);
    let h = h.min(sh);

    for yy in 0..h {
        let ty = dy + yy;
        if ty >= ch {
            break;
        }
        for xx in 0..w {
            let tx = dx + xx;
            if tx >= cw {
                break;
            }
            let px = *src.get_pixel(xx, yy);
            canvas.put_pixel(tx, ty, px);
        }
    }
}
