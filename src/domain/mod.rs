pub mod draft;
pub mod task;
pub mod user;

pub use draft::*;
pub use task::*;
pub use user::*;
