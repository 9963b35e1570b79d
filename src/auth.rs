//! Auth flows built on top of [`ApiClient`]: login, signup, logout, token
//! refresh, verification (email-link and OTP variants), password-reset
//! request, resend verification, and current-user fetch. The flow object
//! owns the derived auth state machine: `LoggedOut → LoggedIn` via login,
//! `LoggedOut → EmailPending → LoggedIn` via signup and verification, back
//! to `LoggedOut` on logout, refresh failure, or detected expiry.
//!
//! Flows update the session store; rendering and navigation stay with the
//! caller. Credentials and tokens must never be logged here.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::session::UserRecord;
use crate::types::{
    LoginRequest, LoginResponse, LogoutRequest, PasswordResetRequest, RefreshRequest,
    RefreshResponse, ResendVerificationRequest, SignupRequest, VerifyEmailRequest,
    VerifyOtpRequest, VerifyResponse,
};

/// Notice shown for every password-reset request, success or failure, so
/// responses cannot be used to probe which accounts exist.
pub const PASSWORD_RESET_NOTICE: &str =
    "If the account you entered is correct, you will have received a message on it.";

/// Derived auth state; see the module docs for the transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    /// Signup succeeded; the account awaits email/OTP verification.
    EmailPending,
    LoggedIn,
}

pub struct AuthFlow {
    client: ApiClient,
    pending_email: Option<String>,
}

impl AuthFlow {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            pending_email: None,
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Email recorded by a successful signup, until verification completes.
    #[must_use]
    pub fn pending_email(&self) -> Option<&str> {
        self.pending_email.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.client.store().is_active() {
            AuthState::LoggedIn
        } else if self.pending_email.is_some() {
            AuthState::EmailPending
        } else {
            AuthState::LoggedOut
        }
    }

    /// Logs in and stores the returned session. A 401 here means bad
    /// credentials, not an expired session, and leaves the store untouched.
    ///
    /// # Errors
    /// `ApiError::Input` when either field is blank; otherwise the
    /// normalized request error.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Input("email and password are required".to_string()));
        }

        let endpoint = self.client.config().endpoints.login.clone();
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.client.post_json(&endpoint, &request).await?;

        let store = self.client.store();
        store.set_token(SecretString::from(response.session_id));
        if let Some(refresh) = response.refresh_token {
            store.set_refresh_token(SecretString::from(refresh));
        }
        store.set_user(&UserRecord {
            email: email.to_string(),
            username: None,
        });
        self.pending_email = None;
        debug!("login succeeded");

        Ok(())
    }

    /// Creates an account and records the email as pending verification.
    ///
    /// # Errors
    /// `ApiError::Input` when any field is blank; otherwise the normalized
    /// request error.
    pub async fn signup(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Input(
                "username, email, and password are required".to_string(),
            ));
        }

        let endpoint = self.client.config().endpoints.signup.clone();
        let request = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let _: Value = self.client.post_json(&endpoint, &request).await?;

        self.pending_email = Some(email.to_string());
        debug!("signup accepted, verification pending");

        Ok(())
    }

    /// Ends the session. The server is notified best-effort; the local
    /// session is cleared regardless of the request outcome.
    pub async fn logout(&mut self) {
        if let Some(token) = self.client.store().token() {
            let endpoint = self.client.config().endpoints.logout.clone();
            let request = LogoutRequest {
                session_id: token.expose_secret().to_string(),
            };
            if let Err(err) = self.client.post_json::<_, Value>(&endpoint, &request).await {
                warn!("logout request failed: {err}");
            }
        }

        self.client.store().clear();
        self.pending_email = None;
    }

    /// Exchanges the stored refresh token for a new session token. Any
    /// failure tears the session down; the caller re-authenticates.
    ///
    /// # Errors
    /// `ApiError::Unauthenticated` when no refresh token is stored;
    /// otherwise the normalized request error.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let store = self.client.store();
        let Some(refresh) = store.refresh_token() else {
            store.clear();
            return Err(ApiError::Unauthenticated);
        };

        let endpoint = self.client.config().endpoints.refresh.clone();
        let request = RefreshRequest {
            refresh_token: refresh.expose_secret().to_string(),
        };

        match self
            .client
            .post_json::<_, RefreshResponse>(&endpoint, &request)
            .await
        {
            Ok(response) => {
                store.set_token(SecretString::from(response.access_token));
                if let Some(rotated) = response.refresh_token {
                    store.set_refresh_token(SecretString::from(rotated));
                }
                Ok(())
            }
            Err(err) => {
                store.clear();
                Err(err)
            }
        }
    }

    /// Verifies an emailed token. When the response carries a session
    /// token, the session is adopted and the user record fetched.
    ///
    /// # Errors
    /// `ApiError::Input` when the token is blank; otherwise the normalized
    /// request error.
    pub async fn verify_email(&mut self, token: &str) -> Result<(), ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::Input("verification token is required".to_string()));
        }

        let endpoint = self.client.config().endpoints.verify_email.clone();
        let request = VerifyEmailRequest {
            token: token.to_string(),
        };
        let response: VerifyResponse = self.client.post_json(&endpoint, &request).await?;

        self.adopt_verified_session(response).await
    }

    /// Verifies a one-time code sent to the given email. Backends for this
    /// variant usually return no token; the account is then verified and
    /// the user logs in normally.
    ///
    /// # Errors
    /// `ApiError::Input` when either field is blank; otherwise the
    /// normalized request error.
    pub async fn verify_otp(&mut self, email: &str, otp: &str) -> Result<(), ApiError> {
        if email.trim().is_empty() || otp.trim().is_empty() {
            return Err(ApiError::Input("email and OTP are required".to_string()));
        }

        let endpoint = self.client.config().endpoints.verify_otp.clone();
        let request = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        let response: VerifyResponse = self.client.post_json(&endpoint, &request).await?;

        self.adopt_verified_session(response).await
    }

    /// Requests a password-reset email. The outcome is masked: the caller
    /// shows [`PASSWORD_RESET_NOTICE`] whether the account exists, the
    /// request failed, or the server was unreachable.
    ///
    /// # Errors
    /// Only `ApiError::Input`, when the email is blank; request failures
    /// are logged at debug level and swallowed.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::Input("email is required".to_string()));
        }

        let endpoint = self.client.config().endpoints.password_reset_request.clone();
        let request = PasswordResetRequest {
            email: email.to_string(),
        };
        if let Err(err) = self.client.post_json::<_, Value>(&endpoint, &request).await {
            debug!("password reset request failed: {err}");
        }

        Ok(())
    }

    /// Asks the server to send the verification email again.
    ///
    /// # Errors
    /// `ApiError::Input` when the email is blank; otherwise the normalized
    /// request error.
    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        if email.trim().is_empty() {
            return Err(ApiError::Input("email is required".to_string()));
        }

        let endpoint = self.client.config().endpoints.resend_verification.clone();
        let request = ResendVerificationRequest {
            email: email.to_string(),
        };
        let _: Value = self.client.post_json(&endpoint, &request).await?;

        Ok(())
    }

    /// Fetches the signed-in user and refreshes the stored record.
    ///
    /// # Errors
    /// The normalized request error; a 401 clears the session and surfaces
    /// `ApiError::Unauthenticated`.
    pub async fn current_user(&self) -> Result<UserRecord, ApiError> {
        let endpoint = self.client.config().endpoints.me.clone();
        let user: UserRecord = self.client.get_json(&endpoint).await?;
        self.client.store().set_user(&user);
        Ok(user)
    }

    async fn adopt_verified_session(&mut self, response: VerifyResponse) -> Result<(), ApiError> {
        self.pending_email = None;

        if let Some(token) = response.access_token {
            let store = self.client.store();
            store.set_token(SecretString::from(token));
            if let Some(refresh) = response.refresh_token {
                store.set_refresh_token(SecretString::from(refresh));
            }
            self.current_user().await?;
        }

        Ok(())
    }
}
