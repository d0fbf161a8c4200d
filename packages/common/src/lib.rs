pub mod error;
pub mod result;
pub mod sanitize;
pub mod visitor;
pub mod warning;

pub use error::*;
pub use result::*;
pub use sanitize::*;
pub use visitor::*;
pub use warning::*;
