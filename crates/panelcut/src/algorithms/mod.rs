pub mod binarization;
pub mod extraction;
pub mod simplification;
pub mod detection;
pub mod gutters;
pub mod merge;
pub mod expansion;
pub mod compose;

pub use binarization::*;
pub use extraction::*;
pub use simplification::*;
pub use detection::*;
pub use gutters::*;
pub use merge::*;
pub use expansion::*;
pub use compose::*;
