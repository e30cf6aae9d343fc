use anyhow::{Result, ensure};
use image::RgbaImage;
use ndarray::{Array2, s};

/// Axis-aligned pixel bounding box, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl BBox {
    pub fn try_new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<Self> {
        ensure!(
            x_min <= x_max && y_min <= y_max,
            "invalid bbox, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }
}

/// Binary occupancy grid: 0 = empty, nonzero = occupied.
/// Backed by a row-major `Array2<u8>` indexed `[y, x]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    pub(crate) cells: Array2<u8>,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        Mask {
            cells: Array2::zeros((height as usize, width as usize)),
        }
    }

    /// Strict binary threshold of the alpha channel: alpha above `threshold`
    /// becomes occupied. Keeps semi-transparent fringe pixels out of the mask.
    pub fn from_alpha(image: &RgbaImage, threshold: u8) -> Self {
        let mut cells = Array2::zeros((image.height() as usize, image.width() as usize));
        for (x, y, px) in image.enumerate_pixels() {
            if px.0[3] > threshold {
                cells[[y as usize, x as usize]] = 1;
            }
        }
        Mask { cells }
    }

    pub fn width(&self) -> u32 {
        self.cells.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.cells.nrows() as u32
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.cells[[y as usize, x as usize]] != 0
    }

    pub fn set(&mut self, x: u32, y: u32) {
        self.cells[[y as usize, x as usize]] = 1;
    }

    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Tight bounding box of all occupied pixels, `None` if fully empty.
    pub fn bbox(&self) -> Option<BBox> {
        let mut bbox: Option<BBox> = None;
        for ((y, x), &v) in self.cells.indexed_iter() {
            if v != 0 {
                let (x, y) = (x as u32, y as u32);
                bbox = Some(match bbox {
                    None => BBox {
                        x_min: x,
                        y_min: y,
                        x_max: x,
                        y_max: y,
                    },
                    Some(b) => BBox {
                        x_min: b.x_min.min(x),
                        y_min: b.y_min.min(y),
                        x_max: b.x_max.max(x),
                        y_max: b.y_max.max(y),
                    },
                });
            }
        }
        bbox
    }

    pub fn crop(&self, bbox: BBox) -> Mask {
        let window = self.cells.slice(s![
            bbox.y_min as usize..=bbox.y_max as usize,
            bbox.x_min as usize..=bbox.x_max as usize
        ]);
        Mask {
            cells: window.to_owned(),
        }
    }

    /// Copy of the mask with `border` empty pixels added on all four sides.
    pub fn pad(&self, border: u32) -> Mask {
        let b = border as usize;
        let mut cells = Array2::zeros((self.cells.nrows() + 2 * b, self.cells.ncols() + 2 * b));
        cells
            .slice_mut(s![b..b + self.cells.nrows(), b..b + self.cells.ncols()])
            .assign(&self.cells);
        Mask { cells }
    }

    /// Pixelwise union of two same-size masks.
    pub fn union(&self, other: &Mask) -> Mask {
        assert_eq!(self.cells.dim(), other.cells.dim());
        let mut cells = self.cells.clone();
        cells.zip_mut_with(&other.cells, |a, &b| *a |= b);
        Mask { cells }
    }

    /// True if any occupied pixel of `piece`, offset by `(x, y)`, lands on an
    /// occupied pixel of `self`. Parts of `piece` falling outside `self` are
    /// ignored.
    pub fn overlaps(&self, piece: &Mask, x: i64, y: i64) -> bool {
        let (sw, sh) = (self.width() as i64, self.height() as i64);
        let (pw, ph) = (piece.width() as i64, piece.height() as i64);
        let px0 = 0.max(-x);
        let py0 = 0.max(-y);
        let px1 = pw.min(sw - x);
        let py1 = ph.min(sh - y);
        if px0 >= px1 || py0 >= py1 {
            return false;
        }
        let window = self.cells.slice(s![
            (y + py0) as usize..(y + py1) as usize,
            (x + px0) as usize..(x + px1) as usize
        ]);
        let piece_window = piece
            .cells
            .slice(s![py0 as usize..py1 as usize, px0 as usize..px1 as usize]);
        window
            .iter()
            .zip(piece_window.iter())
            .any(|(&a, &b)| a & b != 0)
    }

    /// ORs `piece` into `self` at `(x, y)`. The piece must lie fully inside.
    pub fn union_from(&mut self, piece: &Mask, x: u32, y: u32) {
        let (x, y) = (x as usize, y as usize);
        let (pw, ph) = (piece.width() as usize, piece.height() as usize);
        assert!(x + pw <= self.cells.ncols() && y + ph <= self.cells.nrows());
        self.cells
            .slice_mut(s![y..y + ph, x..x + pw])
            .zip_mut_with(&piece.cells, |a, &b| *a |= b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let mut mask = Mask::empty(rows[0].len() as u32, rows.len() as u32);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x as u32, y as u32);
                }
            }
        }
        mask
    }

    #[test]
    fn bbox_of_empty_mask_is_none() {
        assert_eq!(Mask::empty(10, 10).bbox(), None);
    }

    #[test]
    fn bbox_is_tight() {
        let mask = mask_from_rows(&["....", ".#..", ".##.", "...."]);
        let bbox = mask.bbox().unwrap();
        assert_eq!(
            bbox,
            BBox {
                x_min: 1,
                y_min: 1,
                x_max: 2,
                y_max: 2
            }
        );
    }

    #[test]
    fn crop_to_bbox_is_idempotent() {
        let mask = mask_from_rows(&["....", ".##.", "....", "...."]);
        let trimmed = mask.crop(mask.bbox().unwrap());
        let retrimmed = trimmed.crop(trimmed.bbox().unwrap());
        assert_eq!(trimmed, retrimmed);
        assert_eq!(trimmed.width(), 2);
        assert_eq!(trimmed.height(), 1);
    }

    #[test]
    fn overlaps_detects_single_shared_pixel() {
        let mut sheet = Mask::empty(10, 10);
        sheet.set(5, 5);
        let piece = mask_from_rows(&["#.", ".#"]);
        assert!(sheet.overlaps(&piece, 5, 5));
        assert!(sheet.overlaps(&piece, 4, 4));
        assert!(!sheet.overlaps(&piece, 4, 5));
        assert!(!sheet.overlaps(&piece, 6, 6));
    }

    #[test]
    fn overlaps_ignores_out_of_bounds_region() {
        let mut sheet = Mask::empty(4, 4);
        sheet.set(0, 0);
        let piece = mask_from_rows(&["##", "##"]);
        assert!(sheet.overlaps(&piece, -1, -1));
        assert!(!sheet.overlaps(&piece, -2, -2));
        assert!(!sheet.overlaps(&piece, 3, 3));
    }

    #[test]
    fn union_from_accumulates() {
        let mut sheet = Mask::empty(6, 6);
        let piece = mask_from_rows(&["##", "##"]);
        sheet.union_from(&piece, 0, 0);
        sheet.union_from(&piece, 2, 2);
        assert_eq!(sheet.count_ones(), 8);
    }

    #[test]
    fn pad_preserves_content() {
        let mask = mask_from_rows(&["#"]);
        let padded = mask.pad(2);
        assert_eq!(padded.width(), 5);
        assert_eq!(padded.height(), 5);
        assert!(padded.is_set(2, 2));
        assert_eq!(padded.count_ones(), 1);
    }
}
