//! Request handlers.

pub mod health;
pub mod images;
pub mod predict;

pub use health::*;
pub use images::*;
pub use predict::*;
