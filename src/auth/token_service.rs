/// Token issuing and verification.
///
/// One HS256 signing primitive serves both token kinds; only the session
/// variant touches the revocation ledger. A session token is not considered
/// issued until its ledger registration succeeds: handing out a signed token
/// whose ledger write failed would create a credential nothing can revoke.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{ApiTokenClaims, SessionClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::ledger::RevocationLedger;

#[derive(Clone)]
pub struct TokenService {
    settings: JwtSettings,
    ledger: RevocationLedger,
}

impl TokenService {
    pub fn new(settings: JwtSettings, ledger: RevocationLedger) -> Self {
        Self { settings, ledger }
    }

    pub fn ledger(&self) -> &RevocationLedger {
        &self.ledger
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: a token one second past exp is expired.
        validation.leeway = 0;
        validation
    }

    fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Mints a session token for `user` and registers it with the ledger.
    ///
    /// # Errors
    /// Fails as a whole when the ledger write fails; no token is returned.
    pub async fn issue_session_token(
        &self,
        user: &crate::identity::User,
    ) -> Result<String, AppError> {
        let claims = SessionClaims::new(user, self.settings.session_token_expiry);
        let token = self.sign(&claims)?;

        self.ledger.add_token(user.id, &token).await?;

        tracing::debug!(user_id = %user.id, "Session token issued");
        Ok(token)
    }

    /// Validates signature + expiry, then cross-checks the ledger.
    ///
    /// # Errors
    /// - `TokenExpired` past the expiry claim
    /// - `TokenInvalid` on a malformed token or bad signature
    /// - `TokenRevoked` when the ledger no longer holds the token (surfaced
    ///   to HTTP identically to `TokenInvalid`)
    pub async fn verify_session_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("Session token validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Auth(AuthError::TokenExpired)
                }
                _ => AppError::Auth(AuthError::TokenInvalid),
            }
        })?;

        let user_id = claims.user_id()?;
        if !self.ledger.verify_token(user_id, token).await? {
            tracing::warn!(user_id = %user_id, "Signature-valid session token not in ledger");
            return Err(AppError::Auth(AuthError::TokenRevoked));
        }

        Ok(claims)
    }

    /// Mints a long-lived API token. No ledger interaction; the caller is
    /// responsible for persisting the string on the identity record.
    pub fn issue_api_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = ApiTokenClaims::new(user_id, self.settings.api_token_expiry);
        self.sign(&claims)
    }

    /// Signature + expiry check only, returning the owning user id.
    ///
    /// Query-style: a missing or invalid bearer on an optionally
    /// authenticated route is a frequent, normal outcome, so any failure is
    /// `None` rather than an error.
    pub fn verify_api_token(&self, token: &str) -> Option<Uuid> {
        let claims = decode::<ApiTokenClaims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .ok()?;

        claims.user_id().ok()
    }
}
