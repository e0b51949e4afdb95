//! Delivery-service API client methods

use reqwest::Method;

use super::{AuthenticatedOrvioClient, ClientError};
use crate::types::{CreditMode, CreditModeRequest, ServiceSendOtpRequest, ServiceSendOtpResponse};
use crate::validation::{validate_phone_number, validate_reporting_config};

impl AuthenticatedOrvioClient {
    /// Dispatch an OTP message through the delivery service
    ///
    /// Validates the phone number and webhook/secret combination locally
    /// before sending.
    pub async fn send_service_otp(
        &self,
        request: ServiceSendOtpRequest,
    ) -> Result<ServiceSendOtpResponse, ClientError> {
        validate_phone_number(&request.phone_number)?;
        validate_reporting_config(
            request.reporting_webhook.as_deref(),
            request.reporting_secret.as_deref(),
        )?;

        self.execute_json(Method::POST, "/service/sendOtp", &request)
            .await
    }

    /// Change how credits are charged for this account
    pub async fn set_credit_mode(
        &self,
        mode: CreditMode,
    ) -> Result<serde_json::Value, ClientError> {
        self.execute_json(Method::PATCH, "/service/creditMode", &CreditModeRequest { mode })
            .await
    }
}
