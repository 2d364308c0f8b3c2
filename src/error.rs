use thiserror::Error;

/// Failure of a provider refresh-token exchange.
///
/// Separate from [`IdentityError`] so callers holding only a refresh token
/// (and no store) get a precise error without the storage variants.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("provider rejected the refresh token: {0}")]
    ProviderRejected(String),

    #[error("network error talking to provider: {0}")]
    Network(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// No credential/user/entity for the given key. Usually recoverable by
    /// creating the missing record.
    #[error("record not found: {0}")]
    NotFound(&'static str),

    /// Unique-constraint violation. `constraint` carries the violated index
    /// name so callers can distinguish handle collisions from key collisions.
    #[error("unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// The provider exchange failed; "no live token" is a valid terminal
    /// outcome callers must handle.
    #[error("provider refresh failed: {0}")]
    ProviderRefresh(#[from] RefreshError),

    /// Underlying persistence error. Always surfaced, never swallowed.
    #[error("store failure: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => IdentityError::NotFound("row"),
            sqlx::Error::Database(db) if db.is_unique_violation() => IdentityError::Conflict {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            },
            _ => IdentityError::Store(err.to_string()),
        }
    }
}

impl IdentityError {
    /// True when this is a unique violation on the given constraint/index.
    pub fn is_conflict_on(&self, name: &str) -> bool {
        matches!(self, IdentityError::Conflict { constraint } if constraint == name)
    }
}
