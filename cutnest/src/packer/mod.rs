//! Distributes finished pieces across a lazily-grown sequence of sheets,
//! either with a deterministic shelf strategy or with randomized placement
//! and pixel-mask collision testing.

mod random;
mod shelf;

#[doc(inline)]
pub use random::sample_position;
#[doc(inline)]
pub use shelf::ShelfCursor;

use crate::entities::{PackReport, PieceInstance, Sheet};
use crate::errors::{PackFailure, PackFailureKind};
use crate::raster::{Mask, dilate};
use crate::units::{Length, PageSpec, PixelScale};
use crate::util::assertions;
use anyhow::{Result, ensure};
use itertools::Itertools;
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Placement strategy for one packing run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Deterministic row-based packing; predictable, best for uniform pieces.
    Shelf,
    /// Randomized placement with mask-overlap rejection; exploits irregular
    /// silhouettes to fill gaps between non-rectangular pieces.
    Random,
}

/// Configuration for a packing run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PackConfig {
    pub page: PageSpec,
    /// Physical-to-pixel conversion used for margin and spacing.
    pub scale: PixelScale,
    /// Border of the page kept empty.
    pub margin: Length,
    /// Minimum separation between pieces. A packing-time concern: applied by
    /// dilating the collision test mask, never baked into the piece.
    pub spacing: Length,
    pub strategy: Strategy,
    /// Position sample budget per piece instance per sheet (randomized
    /// strategy only).
    pub n_samples: usize,
    /// Safety cap on the number of sheets in one run.
    pub max_sheets: usize,
    /// Re-center the painted content of each finished sheet on the page.
    pub center_content: bool,
    /// Seed for the PRNG. If undefined, the run is non-deterministic.
    pub prng_seed: Option<u64>,
    /// Optional wall-clock budget for the whole run. On expiry the sheets
    /// completed so far are still returned.
    pub deadline: Option<Duration>,
}

impl Default for PackConfig {
    fn default() -> Self {
        let scale = PixelScale::default();
        PackConfig {
            page: PageSpec::a4(scale),
            scale,
            margin: Length::mm(10.0),
            spacing: Length::mm(2.0),
            strategy: Strategy::Shelf,
            n_samples: 2000,
            max_sheets: 25,
            center_content: false,
            prng_seed: Some(0),
            deadline: None,
        }
    }
}

/// Packs the given piece instances onto sheets, seeding the PRNG from the
/// config. See [`pack_with_rng`].
pub fn pack(instances: Vec<PieceInstance>, config: &PackConfig) -> Result<PackReport> {
    let mut rng = match config.prng_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    pack_with_rng(instances, config, &mut rng)
}

/// Packs the given piece instances onto sheets with an explicit random
/// source, so runs can be deterministically replayed.
///
/// Sheets are opened lazily, one at a time; instances that do not fit on the
/// current sheet are deferred to the next one. Per-instance failures are
/// collected in the report, never raised: `placed + failed == requested`
/// always holds.
pub fn pack_with_rng(
    instances: Vec<PieceInstance>,
    config: &PackConfig,
    rng: &mut impl Rng,
) -> Result<PackReport> {
    let margin = config.scale.to_px(config.margin);
    let spacing = config.scale.to_px(config.spacing);
    ensure!(
        2 * margin < config.page.width_px && 2 * margin < config.page.height_px,
        "margin of {margin}px leaves no usable area on a {}x{}px page",
        config.page.width_px,
        config.page.height_px
    );
    ensure!(config.max_sheets > 0, "max_sheets must be positive");
    if config.strategy == Strategy::Random {
        ensure!(config.n_samples > 0, "n_samples must be positive");
    }

    let n_requested = instances.len();
    let start = Instant::now();

    // sort largest-first to reduce fragmentation
    let mut pending = match config.strategy {
        Strategy::Shelf => instances
            .into_iter()
            .sorted_by_key(|inst| Reverse(inst.piece.height()))
            .collect_vec(),
        Strategy::Random => instances
            .into_iter()
            .sorted_by_key(|inst| Reverse(inst.piece.footprint_area()))
            .collect_vec(),
    };

    let mut sheets: Vec<Sheet> = Vec::new();
    let mut failures: Vec<PackFailure> = Vec::new();
    // collision test masks, one per unique built piece: the footprint padded
    // and dilated by the spacing, so it reaches past the piece rect on all sides
    let mut test_masks: HashMap<usize, Mask> = HashMap::new();

    while !pending.is_empty() {
        if sheets.len() == config.max_sheets {
            warn!(
                "[PACK] sheet cap of {} reached, {} instances left unplaced",
                config.max_sheets,
                pending.len()
            );
            for inst in pending.drain(..) {
                failures.push(unplaceable(&inst));
            }
            break;
        }

        let mut sheet = Sheet::new(config.page);
        let mut cursor = ShelfCursor::new(margin);
        let mut deferred = Vec::new();

        for inst in pending.drain(..) {
            if deadline_expired(config, start) {
                failures.push(PackFailure {
                    instance_id: inst.id,
                    kind: PackFailureKind::DeadlineExceeded,
                });
                continue;
            }

            let position = match config.strategy {
                Strategy::Shelf => cursor.try_place(
                    inst.piece.width(),
                    inst.piece.height(),
                    config.page,
                    margin,
                    spacing,
                ),
                Strategy::Random => {
                    let key = Arc::as_ptr(&inst.piece) as usize;
                    let test_mask = test_masks
                        .entry(key)
                        .or_insert_with(|| dilate(&inst.piece.mask.pad(spacing), spacing));
                    sample_position(
                        sheet.occupancy(),
                        test_mask,
                        inst.piece.width(),
                        inst.piece.height(),
                        config.page,
                        margin,
                        spacing,
                        config.n_samples,
                        rng,
                    )
                }
            };

            match position {
                Some((x, y)) => sheet.place(&inst, x, y),
                // retrying on another empty sheet can never succeed
                None if sheet.is_empty() => failures.push(unplaceable(&inst)),
                None => deferred.push(inst),
            }
        }
        pending = deferred;

        if !sheet.is_empty() {
            if config.center_content {
                sheet.center_content();
            }
            debug_assert!(assertions::placed_pieces_disjoint(&sheet));
            debug_assert!(assertions::placements_within_margins(&sheet, margin));
            sheets.push(sheet);
        }
    }

    let report = PackReport { sheets, failures };
    debug_assert!(assertions::report_accounting_correct(&report, n_requested));
    info!(
        "[PACK] placed {}/{} instances on {} sheet(s), {} failure(s), in {:?}",
        report.n_placed(),
        n_requested,
        report.sheets.len(),
        report.failures.len(),
        start.elapsed()
    );
    Ok(report)
}

fn unplaceable(inst: &PieceInstance) -> PackFailure {
    PackFailure {
        instance_id: inst.id,
        kind: PackFailureKind::Unplaceable {
            width_px: inst.piece.width(),
            height_px: inst.piece.height(),
        },
    }
}

fn deadline_expired(config: &PackConfig, start: Instant) -> bool {
    config
        .deadline
        .is_some_and(|deadline| start.elapsed() > deadline)
}
