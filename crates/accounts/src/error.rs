use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account with this username.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The password did not match the stored credentials.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The username is already registered.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Malformed registration or update input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
