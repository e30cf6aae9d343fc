use crate::raster::Mask;
use crate::units::PageSpec;
use log::debug;
use rand::Rng;

/// Searches for a collision-free position for one piece by uniform sampling,
/// exploiting irregular silhouettes to fill gaps between pieces.
///
/// `test_mask` is the piece's footprint padded and then dilated by the
/// inter-piece spacing, so its rect is `2 * spacing` px larger than the piece
/// per axis; `piece_width`/`piece_height` are the raw bounding-rect dimensions
/// that must stay inside the margins. Returns the first accepted `(x, y)`
/// within the sample budget, `None` if the budget runs out or the piece cannot
/// fit the usable area at all.
pub fn sample_position(
    occupancy: &Mask,
    test_mask: &Mask,
    piece_width: u32,
    piece_height: u32,
    page: PageSpec,
    margin: u32,
    spacing: u32,
    n_samples: usize,
    rng: &mut impl Rng,
) -> Option<(u32, u32)> {
    let x_max = (page.width_px - margin).checked_sub(piece_width)?;
    let y_max = (page.height_px - margin).checked_sub(piece_height)?;
    if x_max < margin || y_max < margin {
        return None;
    }

    for i in 0..n_samples {
        let x = rng.random_range(margin..=x_max);
        let y = rng.random_range(margin..=y_max);
        // the padded test mask starts `spacing` px up-left of the piece rect
        let collides = occupancy.overlaps(
            test_mask,
            x as i64 - spacing as i64,
            y as i64 - spacing as i64,
        );
        if !collides {
            debug!("[RAND] accepted sample {}/{n_samples} at ({x},{y})", i + 1);
            return Some((x, y));
        }
    }
    debug!("[RAND] budget of {n_samples} samples exhausted");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn full_mask(w: u32, h: u32) -> Mask {
        let mut mask = Mask::empty(w, h);
        for y in 0..h {
            for x in 0..w {
                mask.set(x, y);
            }
        }
        mask
    }

    #[test]
    fn finds_position_on_empty_sheet() {
        let page = PageSpec {
            width_px: 50,
            height_px: 50,
        };
        let occupancy = Mask::empty(50, 50);
        let mask = full_mask(10, 10);
        let mut rng = SmallRng::seed_from_u64(0);
        let (x, y) =
            sample_position(&occupancy, &mask, 10, 10, page, 5, 0, 100, &mut rng).unwrap();
        assert!((5..=35).contains(&x));
        assert!((5..=35).contains(&y));
    }

    #[test]
    fn rejects_piece_larger_than_usable_area() {
        let page = PageSpec {
            width_px: 50,
            height_px: 50,
        };
        let occupancy = Mask::empty(50, 50);
        let mask = full_mask(45, 45);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            sample_position(&occupancy, &mask, 45, 45, page, 5, 0, 100, &mut rng),
            None
        );
    }

    #[test]
    fn gives_up_on_a_fully_occupied_sheet() {
        let page = PageSpec {
            width_px: 30,
            height_px: 30,
        };
        let occupancy = full_mask(30, 30);
        let mask = full_mask(5, 5);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            sample_position(&occupancy, &mask, 5, 5, page, 2, 0, 200, &mut rng),
            None
        );
    }

    #[test]
    fn rejects_every_gap_narrower_than_the_spacing() {
        use crate::raster::dilate;
        // a 10px neighbor at x=12 on a 24px page: every remaining x leaves
        // less than 4px to it, so no position may be accepted
        let page = PageSpec {
            width_px: 24,
            height_px: 10,
        };
        let piece = full_mask(10, 10);
        let mut occupancy = Mask::empty(24, 10);
        occupancy.union_from(&piece, 12, 0);
        let test_mask = dilate(&piece.pad(4), 4);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            sample_position(&occupancy, &test_mask, 10, 10, page, 0, 4, 500, &mut rng),
            None
        );
    }

    #[test]
    fn same_seed_reproduces_the_same_position() {
        let page = PageSpec {
            width_px: 200,
            height_px: 200,
        };
        let occupancy = Mask::empty(200, 200);
        let mask = full_mask(20, 20);
        let a = sample_position(
            &occupancy,
            &mask,
            20,
            20,
            page,
            0,
            0,
            10,
            &mut SmallRng::seed_from_u64(42),
        );
        let b = sample_position(
            &occupancy,
            &mask,
            20,
            20,
            page,
            0,
            0,
            10,
            &mut SmallRng::seed_from_u64(42),
        );
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
