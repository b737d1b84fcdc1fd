pub mod booking;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod visibility;

pub use booking::*;
pub use ledger::*;
pub use lifecycle::*;
pub use locks::*;
pub use visibility::*;
