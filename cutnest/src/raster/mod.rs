mod mask;
mod morphology;

#[doc(inline)]
pub use mask::BBox;
#[doc(inline)]
pub use mask::Mask;
#[doc(inline)]
pub use morphology::dilate;
#[doc(inline)]
pub use morphology::fill_holes;
#[doc(inline)]
pub use morphology::smooth;
