pub mod context;
pub mod gate;

pub use context::*;
pub use gate::*;
