//! Release workflow orchestration

mod release;
mod reporter;
mod step;

pub use release::*;
pub use reporter::*;
pub use step::*;
