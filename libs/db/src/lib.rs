mod enums;
mod schema;

pub use enums::*;
pub use schema::*;
