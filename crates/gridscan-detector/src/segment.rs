use gridscan_core::{map_range, GrayImage};

/// Left edge of each of the `grid_size` tile columns, remapped from the
/// rectified image (`[0, rectified_width]`) onto the rendered one
/// (`[0, rendered_width]`).
///
/// Offsets are multiples of the unpadded `tile_width`; the half-tile
/// padding on either side adds up to one tile, so the last column ends at
/// the right border.
pub fn column_offsets(
    grid_size: usize,
    tile_width: f64,
    rectified_width: f64,
    rendered_width: f64,
) -> Vec<f64> {
    if rectified_width <= 0.0 {
        return Vec::new();
    }
    (0..grid_size)
        .map(|i| map_range(i as f64 * tile_width, 0.0, rectified_width, 0.0, rendered_width))
        .collect()
}

/// Outline the `grid_size`×`grid_size` tile cells of edge `tile_width`
/// starting at the image origin, one pixel wide, clipped to the image.
pub fn draw_tile_outlines(image: &mut GrayImage, grid_size: usize, tile_width: f64, value: u8) {
    let (w, h) = (image.width as i64, image.height as i64);
    let mut put = |x: i64, y: i64| {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            image.data[(y * w + x) as usize] = value;
        }
    };

    for row in 0..grid_size {
        for col in 0..grid_size {
            let x0 = (col as f64 * tile_width).round() as i64;
            let y0 = (row as f64 * tile_width).round() as i64;
            let x1 = ((col + 1) as f64 * tile_width).round() as i64;
            let y1 = ((row + 1) as f64 * tile_width).round() as i64;
            for x in x0..=x1 {
                put(x, y0);
                put(x, y1);
            }
            for y in y0..=y1 {
                put(x0, y);
                put(x1, y);
            }
        }
    }
}
