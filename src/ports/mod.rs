pub mod board_repository;
pub mod config_store;

pub use board_repository::*;
pub use config_store::*;
