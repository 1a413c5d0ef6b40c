/// Core error type for the bot.
///
/// Adapter crates map their specific failures into this type so the menu
/// layer can turn every error into a user-visible message and a safe state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown content key: {0}")]
    NotFound(String),

    #[error("entitlement denied: {0}")]
    Denied(crate::entitlement::DenyReason),

    #[error("content already delivered")]
    AlreadyDelivered,

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
