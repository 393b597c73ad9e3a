pub mod input;
pub mod movie;

pub use input::*;
pub use movie::*;
