use crate::utils::PasswordHashString;

/// A registered account. Only the salted hash of the password is kept.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub password_hash: PasswordHashString,
}

impl User {
    pub fn new(username: String, password_hash: PasswordHashString) -> Self {
        Self {
            username,
            password_hash,
        }
    }
}
