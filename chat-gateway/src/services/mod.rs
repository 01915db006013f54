pub mod auth;
pub mod chat;
pub mod error;
pub mod history;
pub mod inference;
pub mod jwt;
pub mod users;

pub use auth::AuthService;
pub use chat::ChatService;
pub use error::ServiceError;
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use inference::{HuggingFaceClient, InferenceClient, MockInferenceClient, ProviderError};
pub use jwt::{SessionClaims, SessionService};
pub use users::{InMemoryUserStore, UserStore};
