pub mod chat_record;
pub mod user;

pub use chat_record::ChatRecord;
pub use user::User;
