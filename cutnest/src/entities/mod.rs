mod piece_config;
mod finished_piece;
mod report;
mod sheet;

#[doc(inline)]
pub use piece_config::PieceConfig;
#[doc(inline)]
pub use piece_config::ScaleAxis;
#[doc(inline)]
pub use finished_piece::FinishedPiece;
#[doc(inline)]
pub use finished_piece::PieceInstance;
#[doc(inline)]
pub use finished_piece::expand_quantities;
#[doc(inline)]
pub use sheet::PlacedPiece;
#[doc(inline)]
pub use sheet::Sheet;
#[doc(inline)]
pub use report::PackReport;
#[doc(inline)]
pub use report::Placement;
