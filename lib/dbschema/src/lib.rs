mod constraint;
mod error;
mod metadata;
mod relation;

pub use constraint::*;
pub use error::*;
pub use metadata::*;
pub use relation::*;
