pub mod http_menu_backend;

pub use http_menu_backend::HttpMenuBackend;
