pub mod hosted;
pub mod http;
pub mod identity;
pub mod menu_backend;
pub mod storage;
