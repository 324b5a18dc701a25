pub mod presence;
pub mod rooms;
pub mod session;
pub mod userctx;
