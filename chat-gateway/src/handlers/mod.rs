pub mod auth;
pub mod chat;
pub mod health;

pub use auth::{login, register};
pub use chat::{chat, history};
pub use health::health_check;
