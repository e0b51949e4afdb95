//! Request and response types for the Orvio platform API
//!
//! Wire names are camelCase throughout, matching the platform's JSON surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Request body for `POST /auth/sendOtp`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    /// Phone number in `+<country code><number>` form
    pub phone_number: String,
}

/// Correlation handle returned by the OTP send/resend endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpTransaction {
    /// Identifier used to verify or resend this code
    pub transaction_id: String,
}

/// Request body for `POST /auth/resendOtp`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendOtpRequest {
    pub transaction_id: String,
}

/// Request body for `POST /auth/verifyOtp`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub transaction_id: String,
    /// The code the user typed in
    pub user_input_otp: String,
}

/// Request body for `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response from `POST /auth/refresh`
///
/// Only the access token is rotated; the refresh token stays valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Account statistics from `GET /auth/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    /// Delivery-side view: devices this account provides
    pub provider: ProviderStats,
    /// Consumer-side view: API keys this account holds
    pub consumer: ConsumerStats,
    pub credits: CreditInfo,
}

/// Device statistics for the provider side of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    /// The device issuing this request, when it is itself a provider
    pub current_device: Option<JsonValue>,
    pub all_devices: DeviceTotals,
}

/// Aggregate message/device counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTotals {
    pub failed_to_send_ack: u64,
    pub sent_ack_not_verified: u64,
    pub sent_ack_verified: u64,
    pub total_messages_sent: u64,
    pub total_devices: u64,
    pub active_devices: u64,
}

/// API-key statistics for the consumer side of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerStats {
    pub aggregate: KeyAggregates,
    pub keys: Vec<KeySummary>,
}

/// Aggregate API-key counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAggregates {
    pub total_keys: u64,
    pub active_keys: u64,
    /// Epoch timestamps of the oldest/newest/most recently used keys
    pub oldest_key: i64,
    pub newest_key: i64,
    pub last_used_key: i64,
}

/// Per-key entry inside the stats response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub refresh_token: String,
}

/// Credit balance and charging mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditInfo {
    pub balance: i64,
    pub mode: CreditMode,
}

/// How message credits are charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditMode {
    Direct,
    Moderate,
    Strict,
}

impl CreditMode {
    /// Wire name for this mode
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Moderate => "moderate",
            Self::Strict => "strict",
        }
    }
}

impl std::fmt::Display for CreditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a credit mode name
#[derive(Debug, thiserror::Error)]
#[error("unknown credit mode '{0}' (expected direct, moderate or strict)")]
pub struct ParseCreditModeError(String);

impl std::str::FromStr for CreditMode {
    type Err = ParseCreditModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "moderate" => Ok(Self::Moderate),
            "strict" => Ok(Self::Strict),
            other => Err(ParseCreditModeError(other.to_string())),
        }
    }
}

/// Request body for `PATCH /service/creditMode`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditModeRequest {
    pub mode: CreditMode,
}

/// API key record from `GET /auth/apiKey/getAll`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub session: ApiKeySession,
}

/// The long-lived credential attached to an API key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySession {
    pub id: String,
    pub refresh_token: String,
}

/// Request body for `POST /auth/apiKey/createNew`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    /// Display name for the key
    pub name: String,
    /// Organization name shown to message recipients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// Request body for `POST /service/sendOtp`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSendOtpRequest {
    pub phone_number: String,
    /// Webhook to receive delivery-report events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_webhook: Option<String>,
    /// Shared secret for signing webhook deliveries; only valid with a webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

/// Response from `POST /service/sendOtp`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSendOtpResponse {
    pub transaction_id: String,
    pub success: bool,
    pub message: String,
}
