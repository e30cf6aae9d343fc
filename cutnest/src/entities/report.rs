use crate::entities::Sheet;
use crate::errors::PackFailure;
use image::RgbaImage;

/// A definite position for one piece instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub sheet: usize,
    pub x: u32,
    pub y: u32,
}

/// Outcome of one packing run: the sheets in placement order plus the
/// per-instance failures. Every requested instance is accounted for exactly
/// once, either as a placement or as a failure.
#[derive(Clone, Debug)]
pub struct PackReport {
    pub sheets: Vec<Sheet>,
    pub failures: Vec<PackFailure>,
}

impl PackReport {
    /// All placements across all sheets, as `(instance_id, placement)` pairs.
    pub fn placements(&self) -> impl Iterator<Item = (usize, Placement)> + '_ {
        self.sheets.iter().enumerate().flat_map(|(sheet, s)| {
            s.placed.iter().map(move |pp| {
                (
                    pp.instance_id,
                    Placement {
                        sheet,
                        x: pp.x,
                        y: pp.y,
                    },
                )
            })
        })
    }

    pub fn placement_of(&self, instance_id: usize) -> Option<Placement> {
        self.placements()
            .find(|(id, _)| *id == instance_id)
            .map(|(_, p)| p)
    }

    pub fn n_placed(&self) -> usize {
        self.sheets.iter().map(|s| s.placed.len()).sum()
    }

    /// Total number of instances this run was asked to place.
    pub fn n_requested(&self) -> usize {
        self.n_placed() + self.failures.len()
    }

    /// Every sheet flattened onto an opaque white background, in order,
    /// ready to be encoded for print.
    pub fn pages(&self) -> Vec<RgbaImage> {
        self.sheets.iter().map(Sheet::finalize).collect()
    }
}
