use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use crate::authz::UserAuthProfile;
use crate::config::SessionConfig;
use crate::errors::AuthzError;
use crate::models::profile::SessionProfile;
use crate::utils::utc_now;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<i64>,
    pub exp: usize,
    pub iat: usize,
    pub profile: SessionProfile,
}

/// Signs and verifies session tokens carrying the authorization profile.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    config: SessionConfig,
}

impl SessionCodec {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self, AuthzError> {
        SessionConfig::from_env().map(Self::new)
    }

    pub fn encode(&self, profile: &UserAuthProfile) -> Result<String, AuthzError> {
        use chrono::Duration;

        let now = utc_now();
        let exp = now + Duration::hours(self.config.exp_hours);

        let claims = SessionClaims {
            sub: profile.user_id,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            profile: profile.to_session(),
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.config.secret),
        )
        .map_err(|err| AuthzError::token(err.to_string()))
    }

    pub fn decode_claims(&self, token: &str) -> Result<SessionClaims, AuthzError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&self.config.secret),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| AuthzError::token(err.to_string()))
    }

    /// Verify `token` and return the normalized profile it carries.
    pub fn decode(&self, token: &str) -> Result<UserAuthProfile, AuthzError> {
        let claims = self.decode_claims(token)?;
        tracing::debug!(user_id = ?claims.sub, "decoded session token");
        Ok(UserAuthProfile::from(claims.profile))
    }
}
