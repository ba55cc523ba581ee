/// Authentication service - JWT and password handling
use crate::{
    config::AuthSettings,
    error::{Result, ServerError},
};
use chirp_core::{User, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    bcrypt_cost: u32,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
    reset_token_expiration: Duration,
    verify_token_expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub token_type: TokenType,
    /// Reset tokens: fingerprint of the password hash they were issued against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fgpt: Option<String>,
    /// Verify tokens: the email being confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
    Reset,
    Verify,
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64, refresh_expiration_days: u64) -> Self {
        Self {
            secret,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
            refresh_token_expiration: Duration::days(refresh_expiration_days as i64),
            reset_token_expiration: Duration::hours(1),
            verify_token_expiration: Duration::hours(1),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.jwt_secret.clone(),
            settings.jwt_expiration_hours,
            settings.jwt_refresh_expiration_days,
        )
        .with_bcrypt_cost(settings.bcrypt_cost)
        .with_one_time_token_minutes(settings.reset_token_minutes, settings.verify_token_minutes)
    }

    /// Override the bcrypt work factor (tests use the minimum of 4)
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn with_one_time_token_minutes(mut self, reset_minutes: u64, verify_minutes: u64) -> Self {
        self.reset_token_expiration = Duration::minutes(reset_minutes as i64);
        self.verify_token_expiration = Duration::minutes(verify_minutes as i64);
        self
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(
            user_id,
            TokenType::Access,
            self.access_token_expiration,
            None,
            None,
        )
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(
            user_id,
            TokenType::Refresh,
            self.refresh_token_expiration,
            None,
            None,
        )
    }

    /// Create a password reset token bound to the user's current password
    ///
    /// The token stops verifying as soon as the password hash changes.
    pub fn create_reset_token(&self, user: &User) -> Result<String> {
        self.create_token(
            &user.id,
            TokenType::Reset,
            self.reset_token_expiration,
            Some(password_fingerprint(&user.password_hash)),
            None,
        )
    }

    /// Create an email verification token bound to the user's current email
    pub fn create_verify_token(&self, user: &User) -> Result<String> {
        self.create_token(
            &user.id,
            TokenType::Verify,
            self.verify_token_expiration,
            None,
            Some(user.email.clone()),
        )
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify that a token is an access token
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_typed(token, TokenType::Access)?;
        parse_subject(&claims)
    }

    /// Verify that a token is a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_typed(token, TokenType::Refresh)?;
        parse_subject(&claims)
    }

    /// Verify a reset token and return its subject and password fingerprint
    pub fn verify_reset_token(&self, token: &str) -> Result<(UserId, String)> {
        let claims = self.verify_typed(token, TokenType::Reset)?;
        let user_id = parse_subject(&claims)?;
        let fingerprint = claims
            .fgpt
            .ok_or_else(|| ServerError::Auth("Reset token has no fingerprint".to_string()))?;
        Ok((user_id, fingerprint))
    }

    /// Verify a verification token and return its subject and email
    pub fn verify_verify_token(&self, token: &str) -> Result<(UserId, String)> {
        let claims = self.verify_typed(token, TokenType::Verify)?;
        let user_id = parse_subject(&claims)?;
        let email = claims
            .email
            .ok_or_else(|| ServerError::Auth("Verify token has no email".to_string()))?;
        Ok((user_id, email))
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(claims)
    }

    fn create_token(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        expiration: Duration,
        fgpt: Option<String>,
        email: Option<String>,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
            fgpt,
            email,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}

/// Short digest of a password hash, embedded in reset tokens
pub fn password_fingerprint(password_hash: &str) -> String {
    blake3::hash(password_hash.as_bytes()).to_hex().to_string()
}

fn parse_subject(claims: &Claims) -> Result<UserId> {
    claims
        .sub
        .parse()
        .map_err(|_| ServerError::Auth("Malformed token subject".to_string()))
}
