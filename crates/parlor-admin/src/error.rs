use parlor_types::models::UserId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("Username must not be empty!")]
    EmptyUsername,
    #[error("Password confirmation does not match!")]
    PasswordMismatch,
    #[error("no row for user {0}")]
    UnknownUser(UserId),
    #[error("the password dialog is not open")]
    ModalClosed,
    #[error("invalid admin client configuration: {0}")]
    Config(String),
    #[error("update request failed: {0}")]
    Request(String),
}
