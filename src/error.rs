use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("{0}")] Network(#[from] NetworkError),

    #[error("Not found: {0}")] NotFound(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

/// Catalog failures normalized into the categories the screens show.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Bad Request")]
    BadRequest,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not Found")]
    NotFound,

    #[error("Too Many Requests")]
    TooManyRequests,

    #[error("Server Error: {0}")] ServerError(String),

    #[error("No Internet Connection")]
    NoInternet,

    #[error("Request Timeout")]
    Timeout,

    #[error("{0}")] Unknown(String),
}

impl NetworkError {
    /// Map a non-success HTTP status onto a category.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        use reqwest::StatusCode;

        match status {
            StatusCode::BAD_REQUEST => NetworkError::BadRequest,
            StatusCode::UNAUTHORIZED => NetworkError::Unauthorized,
            StatusCode::FORBIDDEN => NetworkError::Forbidden,
            StatusCode::NOT_FOUND => NetworkError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => NetworkError::TooManyRequests,
            s if s.is_server_error() => NetworkError::ServerError(s.to_string()),
            s if s.is_redirection() => NetworkError::Unknown(format!("Redirect Error: {}", s)),
            s => NetworkError::Unknown(format!("Client Error: {}", s)),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            NetworkError::BadRequest => "BAD_REQUEST",
            NetworkError::Unauthorized => "UNAUTHORIZED",
            NetworkError::Forbidden => "FORBIDDEN",
            NetworkError::NotFound => "NOT_FOUND",
            NetworkError::TooManyRequests => "RATE_LIMITED",
            NetworkError::ServerError(_) => "SERVER_ERROR",
            NetworkError::NoInternet => "NO_CONNECTIVITY",
            NetworkError::Timeout => "TIMEOUT",
            NetworkError::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else if e.is_connect() {
            NetworkError::NoInternet
        } else if let Some(status) = e.status() {
            NetworkError::from_status(status)
        } else if e.is_decode() {
            NetworkError::Unknown(format!("Unexpected payload: {}", e))
        } else {
            NetworkError::Unknown(e.to_string())
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e.into())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Network(e) => e.code(),
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
