pub mod chat;
pub mod health;
pub mod index;

pub use chat::*;
pub use health::*;
pub use index::*;
