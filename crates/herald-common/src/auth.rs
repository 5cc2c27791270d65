//! Bearer credentials: Ed25519-signed JWTs.
//!
//! The login flows of every role issue these tokens; the registry only
//! verifies them to learn which identity owns a device token.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use ed25519_dalek::SigningKey;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Role;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("invalid signing key")]
    InvalidKey,
}

// ── Claims ──────────────────────────────────────────────────────────

/// Claims embedded in a bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity that will own registered device tokens.
    pub sub: String,
    pub iss: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    pub role: Role,
}

impl Claims {
    /// Claims valid from now for `ttl_secs`.
    pub fn new(sub: impl Into<String>, role: Role, issuer: impl Into<String>, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: sub.into(),
            iss: issuer.into(),
            exp: now + ttl_secs,
            iat: now,
            role,
        }
    }
}

// ── JWT context ─────────────────────────────────────────────────────

/// JWT signing/verification context.
pub struct JwtContext {
    issuer: String,
    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: jsonwebtoken::DecodingKey,
}

impl JwtContext {
    /// Create a JWT context from an Ed25519 private key (32 bytes, base64-encoded).
    pub fn from_ed25519_seed(seed_b64: &str, issuer: impl Into<String>) -> Result<Self, AuthError> {
        let seed_bytes = BASE64.decode(seed_b64).map_err(|_| AuthError::InvalidKey)?;
        let seed: [u8; 32] = seed_bytes
            .as_slice()
            .try_into()
            .map_err(|_| AuthError::InvalidKey)?;

        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();

        // jsonwebtoken wants the private key as PKCS8v2 DER:
        //   SEQUENCE { INTEGER 0, SEQUENCE { OID 1.3.101.112 }, OCTET STRING { OCTET STRING { seed } } }
        let pkcs8_prefix: &[u8] = &[
            0x30, 0x2e, // SEQUENCE, 46 bytes
            0x02, 0x01, 0x00, // INTEGER 0 (version)
            0x30, 0x05, // SEQUENCE, 5 bytes
            0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
            0x04, 0x22, // OCTET STRING, 34 bytes
            0x04, 0x20, // OCTET STRING, 32 bytes (the seed)
        ];
        let mut pkcs8_der = Vec::with_capacity(48);
        pkcs8_der.extend_from_slice(pkcs8_prefix);
        pkcs8_der.extend_from_slice(&seed);

        Ok(Self {
            issuer: issuer.into(),
            encoding_key: jsonwebtoken::EncodingKey::from_ed_der(&pkcs8_der),
            // Public half is the raw 32-byte key.
            decoding_key: jsonwebtoken::DecodingKey::from_ed_der(verifying_key.as_bytes()),
        })
    }

    /// Generate a fresh random key. Returns `(context, seed_b64)`.
    pub fn generate(issuer: impl Into<String>) -> (Self, String) {
        let signing_key = SigningKey::generate(&mut OsRng);
        let seed_b64 = BASE64.encode(signing_key.to_bytes());
        let ctx = Self::from_ed25519_seed(&seed_b64, issuer)
            .expect("freshly generated key should be valid");
        (ctx, seed_b64)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign `claims`.
    pub fn create_token(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::EdDSA);
        Ok(jsonwebtoken::encode(&header, claims, &self.encoding_key)?)
    }

    /// Validate signature, issuer and expiry, and return the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::EdDSA);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = true;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}
