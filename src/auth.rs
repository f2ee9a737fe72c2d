//! # Authentication and Authorization
//!
//! Signed, time-limited access tokens (HS256 JWT), the login flow and the
//! middleware guarding every protected route. A request is either rejected
//! with 401 before it reaches a handler, or carries a [`CurrentUser`] in its
//! extensions.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{AppConfig, ConfigError};
use crate::error::{ApiError, unauthorized};
use crate::models::user::{Model as UserModel, Role};
use crate::password::PasswordHasher;
use crate::repositories::UserRepository;
use crate::server::AppState;

pub const MISSING_TOKEN: &str = "Token manquant";
pub const INVALID_TOKEN: &str = "Token invalide";
pub const INVALID_CREDENTIALS: &str = "Identifiants incorrects";

/// Token signing secret, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token verification failures
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token rejected: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies access tokens
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SigningSecret,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;
        let hours = i64::try_from(config.token_ttl_hours).map_err(|_| {
            ConfigError::InvalidTokenTtl {
                value: config.token_ttl_hours,
            }
        })?;

        Ok(Self::new(
            SigningSecret::new(secret.as_bytes()),
            Duration::hours(hours),
        ))
    }

    /// Sign a token for `user_id`, valid from now for the configured lifetime.
    pub fn issue(&self, user_id: i32) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: i32,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| TokenError::Signing(err.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry; no leeway is granted.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            other => TokenError::Invalid(format!("{other:?}")),
        })
    }
}

/// The authenticated user, available to handlers behind [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

impl From<UserModel> for CurrentUser {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            last_name: user.last_name,
            first_name: user.first_name,
            email: user.email,
            role: user.role,
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some(MISSING_TOKEN)))
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserModel,
    pub token: IssuedToken,
}

/// Check credentials, stamp the login time and issue a token.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, ApiError> {
    let users = UserRepository::new(&state.db);

    let user = match users.find_by_email(email).await? {
        Some(user) if state.hasher.verify(password, &user.password_hash) => user,
        Some(user) => {
            counter!("auth_login_total", "outcome" => "invalid_credentials").increment(1);
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(unauthorized(Some(INVALID_CREDENTIALS)));
        }
        None => {
            // Same PBKDF2 cost as a real check so timing does not reveal the address.
            let _ = state.hasher.verify(password, &dummy_hash(&state.hasher));
            counter!("auth_login_total", "outcome" => "invalid_credentials").increment(1);
            tracing::info!("Login rejected: unknown email");
            return Err(unauthorized(Some(INVALID_CREDENTIALS)));
        }
    };

    users.record_login(user.id).await?;

    let token = state.tokens.issue(user.id).map_err(|err| {
        tracing::error!(error = %err, "Failed to sign access token");
        ApiError::from(anyhow::Error::new(err))
    })?;

    counter!("auth_login_total", "outcome" => "success").increment(1);
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(LoginOutcome { user, token })
}

fn dummy_hash(hasher: &PasswordHasher) -> String {
    format!(
        "pbkdf2:sha256:{}${}${}",
        hasher.iterations(),
        "00".repeat(16),
        "00".repeat(32)
    )
}

/// Resolve the bearer of a request to a user, or reject it with 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match request.headers().get(AUTHORIZATION) {
        None => return Err(missing_token()),
        Some(value) => {
            let header = value.to_str().map_err(|_| reject("malformed_header"))?;
            match extract_token(header) {
                "" => return Err(missing_token()),
                token => token.to_string(),
            }
        }
    };

    let claims = state.tokens.verify(&token).map_err(|err| {
        tracing::debug!(error = %err, "Access token rejected");
        match err {
            TokenError::Expired => reject("expired"),
            _ => reject("invalid"),
        }
    })?;

    let user_id: i32 = claims.sub.parse().map_err(|_| reject("invalid_subject"))?;
    let user = UserRepository::new(&state.db)
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| reject("unknown_user"))?;

    tracing::debug!(user_id = user.id, "Authenticated request");
    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

/// Accept both `Bearer <token>` and a bare token.
fn extract_token(header: &str) -> &str {
    let header = header.trim();
    if header.eq_ignore_ascii_case("bearer") {
        return "";
    }
    match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => header,
    }
}

fn missing_token() -> ApiError {
    counter!("auth_token_rejected_total", "reason" => "missing").increment(1);
    unauthorized(Some(MISSING_TOKEN))
}

fn reject(reason: &'static str) -> ApiError {
    counter!("auth_token_rejected_total", "reason" => reason).increment(1);
    unauthorized(Some(INVALID_TOKEN))
}
