//! Authentication endpoints.

use tracing::{info, instrument};

use super::client::StayHubClient;
use super::error::Result;
use super::types::{AuthResponse, LoginCredentials, SignupRequest, User};

impl StayHubClient {
    /// Sign in with email and password.
    ///
    /// Calls `POST /auth/sign-in`. The caller decides whether to persist
    /// the returned token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials and
    /// `ApiError::BadRequest` when the server rejects the email format.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let response: AuthResponse = self.post("/auth/sign-in", credentials).await?;
        info!(user_id = %response.user.id, "Signed in");
        Ok(response)
    }

    /// Create an account.
    ///
    /// Calls `POST /auth/users`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self.post("/auth/users", request).await?;
        info!(user_id = %response.user.id, "Account created");
        Ok(response)
    }

    /// Get the authenticated user.
    ///
    /// Calls `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the session token has expired.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        self.get("/auth/me").await
    }
}
