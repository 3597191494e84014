use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
use chrono::Utc;
use reqwest::blocking::Client;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// The subset of a Google service-account key file we need.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read service account file {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid service account json")
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Debug, Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    typ: &'a str,
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Builds the RS256-signed assertion exchanged for an access token.
pub fn signed_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String> {
    let header = JwtHeader {
        alg: "RS256",
        typ: "JWT",
    };
    let claims = JwtClaims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: key.token_uri(),
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECS,
    };
    let header_json = serde_json::to_vec(&header).context("serialize jwt header")?;
    let claims_json = serde_json::to_vec(&claims).context("serialize jwt claims")?;
    let signing_input = format!(
        "{}.{}",
        BASE64URL.encode(header_json),
        BASE64URL.encode(claims_json)
    );

    let private_key = RsaPrivateKey::from_pkcs8_pem(&key.private_key)
        .map_err(|err| anyhow!("invalid service account private key: {err}"))?;
    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key
        .try_sign(signing_input.as_bytes())
        .map_err(|err| anyhow!("failed to sign jwt: {err}"))?;

    Ok(format!(
        "{signing_input}.{}",
        BASE64URL.encode(signature.to_bytes())
    ))
}

pub fn fetch_access_token(client: &Client, key: &ServiceAccountKey) -> Result<String> {
    let assertion = signed_assertion(key, Utc::now().timestamp())?;
    let resp = client
        .post(key.token_uri())
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .context("token request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading token body")?;
    if !status.is_success() {
        return Err(anyhow!("token endpoint http {}: {}", status, body));
    }
    let token: TokenResponse = serde_json::from_str(&body).context("invalid token json")?;
    Ok(token.access_token)
}
