pub mod entity;
pub mod intent;
pub mod result;

pub use entity::*;
pub use intent::*;
pub use result::*;
