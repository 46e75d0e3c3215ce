pub mod entities;
pub mod selection;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use selection::*;
pub use services::*;
pub use value_objects::*;
