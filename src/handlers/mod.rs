pub mod diagnostics;
pub mod health;
pub mod page_get;

pub use diagnostics::*;
pub use health::*;
pub use page_get::*;
