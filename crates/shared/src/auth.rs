use domain::{Caller, UserId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub is_superuser: bool,
    pub exp: i64,
}

impl Claims {
    /// 有効期限付きのクレームを作成
    pub fn new(user_id: UserId, is_superuser: bool, ttl: chrono::Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            is_superuser,
            exp: (chrono::Utc::now() + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingToken,

    #[error("invalid Authorization header format")]
    InvalidScheme,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid subject claim: {0}")]
    InvalidSubject(String),
}

/// HS256 で署名された Bearer トークンを検証する
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// `Authorization` ヘッダーの値から呼び出し元を得る
    pub fn caller_from_header(&self, header: Option<&str>) -> Result<Caller, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?
            .trim();

        let claims = self.validate_token(token)?;
        caller_from_claims(&claims)
    }
}

pub fn caller_from_claims(claims: &Claims) -> Result<Caller, AuthError> {
    let id =
        UserId::parse(&claims.sub).ok_or_else(|| AuthError::InvalidSubject(claims.sub.clone()))?;
    Ok(Caller {
        id,
        is_superuser: claims.is_superuser,
    })
}

/// ローカル開発・テスト用のトークン発行
pub fn sign_token(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}
