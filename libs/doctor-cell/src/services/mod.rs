pub mod registry;
pub mod verification;

pub use registry::*;
pub use verification::*;
