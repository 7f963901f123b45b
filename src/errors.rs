pub type AuthzResult<T> = Result<T, AuthzError>;

#[derive(thiserror::Error, Debug)]
pub enum AuthzError {
    #[error("unknown module: {0}")]
    UnknownModule(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("token error: {0}")]
    Token(String),
}

impl AuthzError {
    pub fn unknown_module(module: impl Into<String>) -> Self {
        Self::UnknownModule(module.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile(message.into())
    }

    pub fn token(err: impl Into<String>) -> Self {
        Self::Token(err.into())
    }

    /// Short machine-readable tag, used by the CLI's JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthzError::UnknownModule(_) => "unknown_module",
            AuthzError::Configuration(_) => "configuration",
            AuthzError::InvalidProfile(_) => "invalid_profile",
            AuthzError::Token(_) => "token",
        }
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for AuthzError {
    fn from(value: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = value.path().to_string();
        Self::InvalidProfile(format!("{path}: {}", value.into_inner()))
    }
}
