#![allow(dead_code)]

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Black canvas with white `edge`×`edge` squares centred on `centres`.
pub fn render_tiles(width: u32, height: u32, centres: &[(i32, i32)], edge: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    let half = edge as i32 / 2;
    for &(cx, cy) in centres {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(cx - half, cy - half).of_size(edge, edge),
            Rgb([255, 255, 255]),
        );
    }
    img
}

/// Add a white bar, like a line of UI text.
pub fn draw_bar(img: &mut RgbImage, x: i32, y: i32, width: u32, height: u32) {
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(width, height), Rgb([255, 255, 255]));
}

pub fn lattice(xs: &[i32], ys: &[i32]) -> Vec<(i32, i32)> {
    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
        .collect()
}
