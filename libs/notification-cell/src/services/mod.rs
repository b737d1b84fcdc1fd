pub mod dispatcher;
pub mod email;
pub mod worker;

pub use dispatcher::*;
pub use email::*;
pub use worker::*;
