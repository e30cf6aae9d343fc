use crate::entities::{FinishedPiece, PieceInstance};
use crate::raster::{BBox, Mask};
use crate::units::PageSpec;
use image::{Rgba, RgbaImage, imageops};
use std::sync::Arc;

/// A piece instance fixed at a position on a sheet.
#[derive(Clone, Debug)]
pub struct PlacedPiece {
    pub instance_id: usize,
    pub piece: Arc<FinishedPiece>,
    pub x: u32,
    pub y: u32,
}

/// A fixed-size page canvas under construction. The working canvas stays
/// transparent so the occupancy mask can distinguish "empty" from "printed
/// here"; [`Sheet::finalize`] flattens it onto an opaque white background.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub page: PageSpec,
    canvas: RgbaImage,
    occupancy: Mask,
    pub placed: Vec<PlacedPiece>,
}

impl Sheet {
    pub fn new(page: PageSpec) -> Self {
        Sheet {
            page,
            canvas: RgbaImage::new(page.width_px, page.height_px),
            occupancy: Mask::empty(page.width_px, page.height_px),
            placed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Accumulated footprint of everything placed so far.
    pub fn occupancy(&self) -> &Mask {
        &self.occupancy
    }

    /// Pastes the instance's bitmap at `(x, y)` and ORs its footprint into the
    /// occupancy mask. The piece must lie fully within the page.
    pub fn place(&mut self, instance: &PieceInstance, x: u32, y: u32) {
        let piece = &instance.piece;
        assert!(
            x + piece.width() <= self.page.width_px && y + piece.height() <= self.page.height_px,
            "piece placed out of bounds"
        );
        imageops::overlay(&mut self.canvas, &piece.bitmap, x as i64, y as i64);
        self.occupancy.union_from(&piece.mask, x, y);
        self.placed.push(PlacedPiece {
            instance_id: instance.id,
            piece: piece.clone(),
            x,
            y,
        });
    }

    /// Bounding box of the painted content, `None` for an empty sheet.
    pub fn content_bbox(&self) -> Option<BBox> {
        self.occupancy.bbox()
    }

    /// Shifts the entire sheet content so its bounding box is centered on the
    /// page. Cosmetic only; applied at most once, after placement is done.
    pub fn center_content(&mut self) {
        let Some(bbox) = self.content_bbox() else {
            return;
        };
        let target_x = (self.page.width_px - bbox.width()) / 2;
        let target_y = (self.page.height_px - bbox.height()) / 2;
        let dx = target_x as i64 - bbox.x_min as i64;
        let dy = target_y as i64 - bbox.y_min as i64;
        if dx == 0 && dy == 0 {
            return;
        }

        let content = imageops::crop_imm(
            &self.canvas,
            bbox.x_min,
            bbox.y_min,
            bbox.width(),
            bbox.height(),
        )
        .to_image();
        let mut canvas = RgbaImage::new(self.page.width_px, self.page.height_px);
        imageops::overlay(&mut canvas, &content, target_x as i64, target_y as i64);
        self.canvas = canvas;

        let content_mask = self.occupancy.crop(bbox);
        let mut occupancy = Mask::empty(self.page.width_px, self.page.height_px);
        occupancy.union_from(&content_mask, target_x, target_y);
        self.occupancy = occupancy;

        for pp in &mut self.placed {
            pp.x = (pp.x as i64 + dx) as u32;
            pp.y = (pp.y as i64 + dy) as u32;
        }
    }

    /// Flattens the working canvas onto an opaque white background.
    pub fn finalize(&self) -> RgbaImage {
        let mut out = RgbaImage::from_pixel(
            self.page.width_px,
            self.page.height_px,
            Rgba([255, 255, 255, 255]),
        );
        imageops::overlay(&mut out, &self.canvas, 0, 0);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn opaque_instance(id: usize, w: u32, h: u32) -> Result<PieceInstance> {
        let bitmap = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]));
        let mut mask = Mask::empty(w, h);
        for y in 0..h {
            for x in 0..w {
                mask.set(x, y);
            }
        }
        Ok(PieceInstance {
            id,
            piece: Arc::new(FinishedPiece::new(bitmap, mask)?),
        })
    }

    #[test]
    fn occupancy_tracks_placements() -> Result<()> {
        let mut sheet = Sheet::new(PageSpec::try_new(20, 20)?);
        sheet.place(&opaque_instance(0, 4, 4)?, 0, 0);
        sheet.place(&opaque_instance(1, 4, 4)?, 10, 10);
        assert_eq!(sheet.occupancy().count_ones(), 32);
        assert!(!sheet.is_empty());
        Ok(())
    }

    #[test]
    fn center_content_moves_bbox_to_page_center() -> Result<()> {
        let mut sheet = Sheet::new(PageSpec::try_new(20, 20)?);
        sheet.place(&opaque_instance(0, 4, 4)?, 0, 0);
        sheet.center_content();
        let bbox = sheet.content_bbox().unwrap();
        assert_eq!(bbox.x_min, 8);
        assert_eq!(bbox.y_min, 8);
        assert_eq!(sheet.occupancy().count_ones(), 16);
        assert_eq!(sheet.placed[0].x, 8);
        assert_eq!(sheet.placed[0].y, 8);
        Ok(())
    }

    #[test]
    fn finalize_flattens_to_opaque_white() -> Result<()> {
        let mut sheet = Sheet::new(PageSpec::try_new(10, 10)?);
        sheet.place(&opaque_instance(0, 2, 2)?, 4, 4);
        let flat = sheet.finalize();
        assert_eq!(flat.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(flat.get_pixel(4, 4), &Rgba([10, 20, 30, 255]));
        Ok(())
    }
}
