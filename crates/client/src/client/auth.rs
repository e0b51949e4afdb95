//! Sign-in and account API client methods

use reqwest::Method;

use super::{AuthenticatedOrvioClient, ClientError, PublicOrvioClient};
use crate::session::Session;
use crate::types::{
    AccountStats, ApiKey, CreateApiKeyRequest, OtpTransaction, RefreshRequest, RefreshResponse,
    ResendOtpRequest, SendOtpRequest, VerifyOtpRequest,
};

impl PublicOrvioClient {
    /// Send a one-time passcode to a phone number
    pub async fn send_otp(
        &self,
        phone_number: impl Into<String>,
    ) -> Result<OtpTransaction, ClientError> {
        let req = self.request(Method::POST, "/auth/sendOtp").json(&SendOtpRequest {
            phone_number: phone_number.into(),
        });
        self.execute(req).await
    }

    /// Resend the passcode for an existing transaction
    pub async fn resend_otp(
        &self,
        transaction_id: impl Into<String>,
    ) -> Result<OtpTransaction, ClientError> {
        let req = self
            .request(Method::POST, "/auth/resendOtp")
            .json(&ResendOtpRequest {
                transaction_id: transaction_id.into(),
            });
        self.execute(req).await
    }

    /// Verify the passcode the user typed in, yielding a session token pair
    pub async fn verify_otp(
        &self,
        transaction_id: impl Into<String>,
        user_input_otp: impl Into<String>,
    ) -> Result<Session, ClientError> {
        let req = self
            .request(Method::POST, "/auth/verifyOtp")
            .json(&VerifyOtpRequest {
                transaction_id: transaction_id.into(),
                user_input_otp: user_input_otp.into(),
            });
        self.execute(req).await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(
        &self,
        refresh_token: impl Into<String>,
    ) -> Result<RefreshResponse, ClientError> {
        let req = self
            .request(Method::POST, "/auth/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.into(),
            });
        self.execute(req).await
    }
}

impl AuthenticatedOrvioClient {
    /// Fetch account, device and credit statistics
    pub async fn stats(&self) -> Result<AccountStats, ClientError> {
        self.execute(Method::GET, "/auth/stats", None).await
    }

    /// List all API keys on the account
    pub async fn list_api_keys(&self) -> Result<Vec<ApiKey>, ClientError> {
        self.execute(Method::GET, "/auth/apiKey/getAll", None).await
    }

    /// Create a new API key
    pub async fn create_api_key(
        &self,
        request: CreateApiKeyRequest,
    ) -> Result<serde_json::Value, ClientError> {
        self.execute_json(Method::POST, "/auth/apiKey/createNew", &request)
            .await
    }
}
