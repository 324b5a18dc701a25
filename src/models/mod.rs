pub mod block;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod messages;
pub mod page;
pub mod ready;
pub mod user;

pub use block::*;
pub use diagnostics::*;
pub use error::*;
pub use health::*;
pub use messages::*;
pub use page::*;
pub use ready::*;
pub use user::*;
