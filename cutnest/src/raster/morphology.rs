use crate::raster::Mask;
use ndarray::{Array2, s};
use std::collections::VecDeque;

/// Morphological dilation (max filter) with a square structuring element of
/// `radius` pixels: the kernel spans `2 * radius + 1` pixels per axis and is
/// therefore always odd. A radius of 0 is the identity.
pub fn dilate(mask: &Mask, radius: u32) -> Mask {
    if radius == 0 {
        return mask.clone();
    }
    let r = radius as usize;
    let (h, w) = mask.cells.dim();

    // separable: horizontal max pass, then vertical max pass
    let mut hpass: Array2<u8> = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(w - 1);
            if mask.cells.slice(s![y, lo..=hi]).iter().any(|&v| v != 0) {
                hpass[[y, x]] = 1;
            }
        }
    }
    let mut vpass: Array2<u8> = Array2::zeros((h, w));
    for y in 0..h {
        let lo = y.saturating_sub(r);
        let hi = (y + r).min(h - 1);
        for x in 0..w {
            if hpass.slice(s![lo..=hi, x]).iter().any(|&v| v != 0) {
                vpass[[y, x]] = 1;
            }
        }
    }
    Mask { cells: vpass }
}

/// Fills interior transparent islands of a binary mask.
///
/// The canvas border is treated as always-background: background is
/// flood-filled (4-connected) from every empty border cell, and any empty
/// region the flood cannot reach is an interior hole and becomes occupied.
/// All holes are filled regardless of size.
pub fn fill_holes(mask: &Mask) -> Mask {
    let (h, w) = mask.cells.dim();
    let mut outside: Array2<u8> = Array2::zeros((h, w));
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    let mut seed = |y: usize, x: usize, outside: &mut Array2<u8>, queue: &mut VecDeque<_>| {
        if mask.cells[[y, x]] == 0 && outside[[y, x]] == 0 {
            outside[[y, x]] = 1;
            queue.push_back((y, x));
        }
    };
    for x in 0..w {
        seed(0, x, &mut outside, &mut queue);
        seed(h - 1, x, &mut outside, &mut queue);
    }
    for y in 0..h {
        seed(y, 0, &mut outside, &mut queue);
        seed(y, w - 1, &mut outside, &mut queue);
    }

    while let Some((y, x)) = queue.pop_front() {
        let mut visit = |ny: usize, nx: usize| {
            if mask.cells[[ny, nx]] == 0 && outside[[ny, nx]] == 0 {
                outside[[ny, nx]] = 1;
                queue.push_back((ny, nx));
            }
        };
        if y > 0 {
            visit(y - 1, x);
        }
        if y + 1 < h {
            visit(y + 1, x);
        }
        if x > 0 {
            visit(y, x - 1);
        }
        if x + 1 < w {
            visit(y, x + 1);
        }
    }

    let mut cells: Array2<u8> = Array2::zeros((h, w));
    for ((y, x), cell) in cells.indexed_iter_mut() {
        if mask.cells[[y, x]] != 0 || outside[[y, x]] == 0 {
            *cell = 1;
        }
    }
    Mask { cells }
}

/// Gaussian blur followed by a re-threshold at 0.5, rounding the pixel-stepped
/// silhouette a dilation leaves behind. `sigma <= 0` is the identity.
/// Out-of-canvas samples read as background.
pub fn smooth(mask: &Mask, sigma: f32) -> Mask {
    if sigma <= 0.0 {
        return mask.clone();
    }
    let radius = ((sigma * 3.0).ceil() as usize).max(1);
    let kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let norm: f32 = kernel.iter().sum();

    let (h, w) = mask.cells.dim();
    let src = mask.cells.map(|&v| if v != 0 { 1.0f32 } else { 0.0 });

    let mut hpass: Array2<f32> = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (i, k) in kernel.iter().enumerate() {
                let sx = x as i64 + i as i64 - radius as i64;
                if sx >= 0 && (sx as usize) < w {
                    acc += k * src[[y, sx as usize]];
                }
            }
            hpass[[y, x]] = acc / norm;
        }
    }
    let mut cells: Array2<u8> = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (i, k) in kernel.iter().enumerate() {
                let sy = y as i64 + i as i64 - radius as i64;
                if sy >= 0 && (sy as usize) < h {
                    acc += k * hpass[[sy as usize, x]];
                }
            }
            if acc / norm >= 0.5 {
                cells[[y, x]] = 1;
            }
        }
    }
    Mask { cells }
}
