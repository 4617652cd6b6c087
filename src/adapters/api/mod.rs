pub mod board_repo;
pub mod client;
pub mod dto;

pub use board_repo::*;
pub use client::*;
pub use dto::*;
