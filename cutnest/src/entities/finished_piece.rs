use crate::raster::Mask;
use anyhow::{Result, ensure};
use image::RgbaImage;
use std::sync::Arc;

/// A print-ready rectangular bitmap plus its binary footprint mask, immutable
/// once built. The mask is the physical extent to keep separated from
/// neighbors during packing; it covers every bitmap pixel above the alpha
/// threshold (a faint sub-threshold fringe may remain outside it).
#[derive(Clone, Debug)]
pub struct FinishedPiece {
    pub bitmap: RgbaImage,
    pub mask: Mask,
}

impl FinishedPiece {
    pub fn new(bitmap: RgbaImage, mask: Mask) -> Result<Self> {
        ensure!(
            bitmap.width() == mask.width() && bitmap.height() == mask.height(),
            "bitmap ({}x{}) and mask ({}x{}) dimensions differ",
            bitmap.width(),
            bitmap.height(),
            mask.width(),
            mask.height()
        );
        ensure!(
            bitmap.width() > 0 && bitmap.height() > 0,
            "finished piece must not be zero-sized"
        );
        Ok(FinishedPiece { bitmap, mask })
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Number of occupied footprint pixels.
    pub fn footprint_area(&self) -> usize {
        self.mask.count_ones()
    }
}

/// One placement request for a [`FinishedPiece`]. Instances originating from
/// the same config are interchangeable clones sharing one built piece by
/// reference.
#[derive(Clone, Debug)]
pub struct PieceInstance {
    pub id: usize,
    pub piece: Arc<FinishedPiece>,
}

impl PieceInstance {
    pub fn clone_with_id(&self, id: usize) -> PieceInstance {
        PieceInstance {
            id,
            piece: self.piece.clone(),
        }
    }
}

/// Expands `(piece, quantity)` pairs into a flat list of placement requests
/// with sequential instance ids. A quantity of zero contributes nothing.
pub fn expand_quantities(pieces: &[(Arc<FinishedPiece>, usize)]) -> Vec<PieceInstance> {
    let mut instances = Vec::new();
    for (piece, quantity) in pieces {
        for _ in 0..*quantity {
            instances.push(PieceInstance {
                id: instances.len(),
                piece: piece.clone(),
            });
        }
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_piece(w: u32, h: u32) -> Arc<FinishedPiece> {
        let bitmap = RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255]));
        let mut mask = Mask::empty(w, h);
        for y in 0..h {
            for x in 0..w {
                mask.set(x, y);
            }
        }
        Arc::new(FinishedPiece::new(bitmap, mask).unwrap())
    }

    #[test]
    fn mismatched_mask_dimensions_are_rejected() {
        let bitmap = RgbaImage::new(4, 4);
        assert!(FinishedPiece::new(bitmap, Mask::empty(4, 5)).is_err());
    }

    #[test]
    fn expansion_assigns_sequential_ids_and_skips_zero_quantities() {
        let a = dummy_piece(2, 2);
        let b = dummy_piece(3, 3);
        let instances = expand_quantities(&[(a.clone(), 2), (b, 0), (a, 1)]);
        assert_eq!(instances.len(), 3);
        assert_eq!(
            instances.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(Arc::ptr_eq(&instances[0].piece, &instances[1].piece));
    }
}
