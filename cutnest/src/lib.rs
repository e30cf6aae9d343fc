//! Piece building and sheet nesting engine for print-and-cut workflows.
//!
//! Two cooperating components, consumed by an external UI layer:
//! - [`builder`] turns a raw transparent cutout into a [`entities::FinishedPiece`]:
//!   resized to a physical target size, optionally expanded with a bleed
//!   border and ringed with a cut-guide line, plus a binary footprint mask.
//! - [`packer`] distributes finished pieces across fixed-size sheets without
//!   collisions, using deterministic shelf packing or randomized placement
//!   with pixel-mask rejection.
//!
//! The engine is a pure in-memory transform: single-threaded, stateless
//! between calls, with all randomness behind an explicit seedable source.
//! Encoding the returned sheets to PNG or PDF is the caller's concern.

pub mod builder;
pub mod entities;
pub mod errors;
pub mod packer;
pub mod raster;
pub mod units;
pub mod util;
