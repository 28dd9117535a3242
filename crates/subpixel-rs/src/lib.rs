pub mod nn;
pub mod ops;
pub mod profiling;
pub mod tensor;

pub use nn::layers::{PixelShuffle, PixelShuffleConfig};
pub use ops::pixel_shuffle::{Geometry, ShuffleError, ShufflePlan};
pub use tensor::{Element, Matrix};
