pub mod allergy;
pub mod authentication;
pub mod common;
pub mod health;
pub mod menu;
pub mod profile;
pub mod safety;
pub mod session;
pub mod storage;
pub mod workflow;
