pub mod clip;
pub mod values;

pub use clip::{Animation, Keyframe, Track};
pub use values::Interpolatable;
