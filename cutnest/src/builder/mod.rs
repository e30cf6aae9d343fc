//! The piece-construction pipeline: a raw transparent cutout goes in, a
//! print-ready bitmap plus collision footprint comes out.
//!
//! All stages are deterministic pure functions of their inputs, applied in a
//! fixed order: trim, mirror, scale, bleed mask, cut-line mask, composite,
//! final trim.

use crate::entities::{FinishedPiece, PieceConfig, ScaleAxis};
use crate::errors::PieceError;
use crate::raster::{BBox, Mask, dilate, fill_holes, smooth};
use crate::units::PixelScale;
use image::{Rgba, RgbaImage, imageops};
use log::debug;

/// Alpha values at or below this threshold count as background, keeping
/// semi-transparent fringe pixels from corrupting the mask expansion.
pub const ALPHA_THRESHOLD: u8 = 8;

/// Extra canvas padding beyond the expansion radius, so dilation and blur
/// never clip at the canvas edge.
const CANVAS_SLACK: u32 = 2;

const CUT_LINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BLEED_FILL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Builds a finished piece from a raw transparent image.
///
/// The footprint mask is the outermost generated mask: the cut-line mask if a
/// cut line is configured, else the bleed mask, else the bare alpha
/// silhouette. With `bleed` zero no white fill is painted and the footprint
/// equals the trimmed silhouette; a cut line is still drawn around it when
/// explicitly configured.
pub fn build_piece(
    source: &RgbaImage,
    config: &PieceConfig,
    scale: PixelScale,
) -> Result<FinishedPiece, PieceError> {
    config.validate()?;

    let trimmed = trim_to_alpha(source).ok_or(PieceError::EmptyPiece)?;
    let oriented = match config.mirror {
        true => imageops::flip_horizontal(&trimmed),
        false => trimmed,
    };
    let scaled = scale_to_target(&oriented, config, scale)?;
    let alpha = Mask::from_alpha(&scaled, ALPHA_THRESHOLD);
    if alpha.bbox().is_none() {
        // downscaling can blur a sparse silhouette below the alpha threshold
        return Err(PieceError::EmptyPiece);
    }

    let bleed_px = scale.to_px(config.bleed);
    let stroke_px = config.cut_line.map(|s| scale.to_px(s).max(1));
    debug!(
        "[BUILD] scaled to {}x{}, bleed: {bleed_px}px, stroke: {stroke_px:?}px",
        scaled.width(),
        scaled.height()
    );

    if bleed_px == 0 && stroke_px.is_none() {
        return Ok(crop_finished(scaled, alpha));
    }

    let pad = bleed_px + stroke_px.unwrap_or(0) + CANVAS_SLACK;
    let alpha = alpha.pad(pad);

    let base_mask = match bleed_px {
        0 => alpha.clone(),
        _ => {
            let expanded = dilate(&alpha, bleed_px);
            let closed = fill_holes(&expanded);
            let rounded = smooth(&closed, config.smoothing_level as f32);
            // smoothing may erode the rim; the fill must always back the artwork
            rounded.union(&alpha)
        }
    };
    let footprint = match stroke_px {
        Some(stroke) => dilate(&base_mask, stroke),
        None => base_mask.clone(),
    };

    // layer order: cut line (bottom), bleed fill (middle), artwork (top)
    let mut bitmap = RgbaImage::new(footprint.width(), footprint.height());
    if stroke_px.is_some() {
        paint_mask(&mut bitmap, &footprint, CUT_LINE_COLOR);
    }
    if bleed_px > 0 {
        paint_mask(&mut bitmap, &base_mask, BLEED_FILL_COLOR);
    }
    imageops::overlay(&mut bitmap, &scaled, pad as i64, pad as i64);

    Ok(crop_finished(bitmap, footprint))
}

/// Crops a source image to the tight bounding box of its non-transparent
/// pixels. `None` if the image is fully transparent.
fn trim_to_alpha(image: &RgbaImage) -> Option<RgbaImage> {
    let bbox = Mask::from_alpha(image, ALPHA_THRESHOLD).bbox()?;
    Some(crop_image(image, bbox))
}

/// Resizes so the configured scale axis lands exactly on the target pixel
/// size, preserving aspect ratio. Lanczos3 resampling keeps the silhouette
/// edge smooth for the bleed expansion downstream.
fn scale_to_target(
    image: &RgbaImage,
    config: &PieceConfig,
    scale: PixelScale,
) -> Result<RgbaImage, PieceError> {
    let target_px = scale.to_px(config.target_size);
    if target_px == 0 {
        return Err(PieceError::InvalidConfig(format!(
            "target size {} is smaller than one pixel",
            config.target_size
        )));
    }
    let (w, h) = image.dimensions();
    let driving = match config.scale_axis {
        ScaleAxis::LongestEdge => w.max(h),
        ScaleAxis::Width => w,
        ScaleAxis::Height => h,
    };
    let ratio = target_px as f32 / driving as f32;
    let mut new_w = ((w as f32 * ratio).round() as u32).max(1);
    let mut new_h = ((h as f32 * ratio).round() as u32).max(1);
    // pin the driving axis, rounding must not drift it off target
    match config.scale_axis {
        ScaleAxis::LongestEdge => match w >= h {
            true => new_w = target_px,
            false => new_h = target_px,
        },
        ScaleAxis::Width => new_w = target_px,
        ScaleAxis::Height => new_h = target_px,
    }
    Ok(imageops::resize(
        image,
        new_w,
        new_h,
        imageops::FilterType::Lanczos3,
    ))
}

fn paint_mask(bitmap: &mut RgbaImage, mask: &Mask, color: Rgba<u8>) {
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.is_set(x, y) {
                bitmap.put_pixel(x, y, color);
            }
        }
    }
}

fn crop_image(image: &RgbaImage, bbox: BBox) -> RgbaImage {
    imageops::crop_imm(image, bbox.x_min, bbox.y_min, bbox.width(), bbox.height()).to_image()
}

/// Final trim: crops bitmap and footprint to the footprint's bounding box to
/// minimize the downstream placement footprint.
fn crop_finished(bitmap: RgbaImage, footprint: Mask) -> FinishedPiece {
    let bbox = footprint
        .bbox()
        .expect("footprint contains the non-empty alpha silhouette");
    FinishedPiece {
        bitmap: crop_image(&bitmap, bbox),
        mask: footprint.crop(bbox),
    }
}
