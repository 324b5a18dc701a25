pub mod auth_service;
pub mod page_edit_service;
