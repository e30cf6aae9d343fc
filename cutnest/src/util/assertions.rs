use crate::entities::{PackReport, Sheet};
use crate::raster::Mask;

//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks and tests

/// True if no two placed pieces on the sheet have intersecting footprints.
/// Rebuilds the occupancy from scratch: the accumulated pixel count must
/// equal the sum of the individual footprints.
pub fn placed_pieces_disjoint(sheet: &Sheet) -> bool {
    let mut acc = Mask::empty(sheet.page.width_px, sheet.page.height_px);
    let mut total = 0;
    for pp in &sheet.placed {
        if acc.overlaps(&pp.piece.mask, pp.x as i64, pp.y as i64) {
            return false;
        }
        acc.union_from(&pp.piece.mask, pp.x, pp.y);
        total += pp.piece.footprint_area();
    }
    acc.count_ones() == total
}

/// True if every placed piece's bounding rectangle lies within the margins.
pub fn placements_within_margins(sheet: &Sheet, margin: u32) -> bool {
    sheet.placed.iter().all(|pp| {
        pp.x >= margin
            && pp.y >= margin
            && pp.x + pp.piece.width() <= sheet.page.width_px - margin
            && pp.y + pp.piece.height() <= sheet.page.height_px - margin
    })
}

/// True if every requested instance is accounted for exactly once, as either
/// a placement or a failure.
pub fn report_accounting_correct(report: &PackReport, n_requested: usize) -> bool {
    report.n_placed() + report.failures.len() == n_requested
}
