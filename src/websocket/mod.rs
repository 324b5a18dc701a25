pub mod handler;
pub mod msg_blocks_handler;
pub mod msg_ephemeral_handler;
pub mod msg_history_handler;
pub mod msg_join_handler;
pub mod msg_settings_handler;
