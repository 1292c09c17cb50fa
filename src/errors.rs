use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterErrorKind {
    ConfigInvalid,
    TokenNotFound,
    Transport,
    GasPriceUnavailable,
    Internal,
}

/// Request-fatal router failure. Per-call quote failures and pools that do
/// not hydrate are recovered locally and never reach this type.
#[derive(Debug)]
pub struct RouterError {
    kind: RouterErrorKind,
    message: String,
}

impl RouterError {
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self {
            kind: RouterErrorKind::ConfigInvalid,
            message: message.into(),
        }
    }

    pub fn token_not_found<T: Into<String>>(message: T) -> Self {
        Self {
            kind: RouterErrorKind::TokenNotFound,
            message: message.into(),
        }
    }

    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self {
            kind: RouterErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn gas_price<T: Into<String>>(message: T) -> Self {
        Self {
            kind: RouterErrorKind::GasPriceUnavailable,
            message: message.into(),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self {
            kind: RouterErrorKind::Internal,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            RouterErrorKind::ConfigInvalid => StatusCode::BAD_REQUEST,
            RouterErrorKind::TokenNotFound => StatusCode::NOT_FOUND,
            RouterErrorKind::Transport | RouterErrorKind::GasPriceUnavailable => {
                StatusCode::BAD_GATEWAY
            }
            RouterErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> RouterErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RouterError {}
