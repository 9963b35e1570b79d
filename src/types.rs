//! Wire payloads for the authentication API. Field-name variants observed
//! across deployments are absorbed here with serde aliases so callers never
//! branch on them. These payloads carry credentials and tokens and must
//! never be logged.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login success body. Servers name the token either `session_id` or
/// `access_token`; both land in `session_id`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub session_id: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub session_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh success body; the renewed token arrives as `access_token` or
/// plain `token`.
#[derive(Clone, Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Verification success body. The email-link variant returns a fresh
/// session token; the OTP variant returns none and the user logs in
/// afterwards.
#[derive(Clone, Debug, Deserialize)]
pub struct VerifyResponse {
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}
