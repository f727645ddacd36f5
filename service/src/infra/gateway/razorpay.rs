//! [`Razorpay`] payment gateway implementation.

use std::time::Duration;

use derive_more::{Display, Error as StdError, From};
use hmac::{Hmac, Mac as _};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use tracerr::Traced;

use crate::{
    domain::payment,
    infra::{
        gateway::{self, CreateOrder, CreateRefund, VerifySignature},
        Gateway,
    },
};

/// [`Razorpay`] client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the API, without a trailing slash.
    pub url: String,

    /// Key ID to authenticate API requests with.
    pub key_id: String,

    /// Key secret to authenticate API requests and to verify
    /// [`payment::Signature`]s with.
    pub key_secret: SecretString,

    /// Timeout of a single API request.
    pub timeout: Duration,
}

/// [`Gateway`] implementation backed by the [Razorpay] API.
///
/// [Razorpay]: https://razorpay.com
#[derive(Clone, Debug)]
pub struct Razorpay {
    /// [`Config`] of this client.
    config: Config,

    /// HTTP client to perform API requests with.
    http: reqwest::Client,
}

impl Razorpay {
    /// Creates a new [`Razorpay`] client out of the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client fails to initialize.
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self { config, http })
    }

    /// Performs a `POST` API request to the provided `path` with the provided
    /// JSON `body`.
    async fn post<Body, Resp>(
        &self,
        path: &str,
        body: &Body,
    ) -> Result<Resp, Traced<Error>>
    where
        Body: Serialize,
        Resp: DeserializeOwned,
    {
        let resp = self
            .http
            .post(format!("{}{path}", self.config.url))
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(body)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        if resp.status().is_success() {
            resp.json().await.map_err(tracerr::from_and_wrap!(=> Error))
        } else {
            let resp: ErrorResponse = resp
                .json()
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))?;
            Err(tracerr::new!(Error::Api(resp.error)))
        }
    }
}

impl Gateway<CreateOrder> for Razorpay {
    type Ok = payment::OrderId;
    type Err = Traced<gateway::Error>;

    async fn execute(&self, op: CreateOrder) -> Result<Self::Ok, Self::Err> {
        let CreateOrder { amount, receipt } = op;

        let minor_units = amount
            .minor_units()
            .ok_or_else(|| tracerr::new!(Error::AmountIsTooBig))
            .map_err(tracerr::map_from)?;
        let req = OrderRequest {
            amount: minor_units,
            currency: amount.currency.to_string(),
            receipt: receipt.to_string(),
            payment_capture: 1,
        };

        let order: Order = self
            .post("/v1/orders", &req)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> gateway::Error))?;

        payment::OrderId::new(order.id)
            .ok_or_else(|| tracerr::new!(Error::MalformedId))
            .map_err(tracerr::map_from)
    }
}

impl Gateway<CreateRefund> for Razorpay {
    type Ok = payment::RefundId;
    type Err = Traced<gateway::Error>;

    async fn execute(&self, op: CreateRefund) -> Result<Self::Ok, Self::Err> {
        let CreateRefund { payment_id, amount, reason } = op;

        let minor_units = amount
            .map(|amount| {
                amount
                    .minor_units()
                    .ok_or_else(|| tracerr::new!(Error::AmountIsTooBig))
            })
            .transpose()
            .map_err(tracerr::map_from)?;
        let req = RefundRequest {
            amount: minor_units,
            speed: "normal",
            notes: reason.map(|reason| RefundNotes { reason }),
        };

        let refund: Refund = self
            .post(&format!("/v1/payments/{payment_id}/refund"), &req)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> gateway::Error))?;

        payment::RefundId::new(refund.id)
            .ok_or_else(|| tracerr::new!(Error::MalformedId))
            .map_err(tracerr::map_from)
    }
}

impl Gateway<VerifySignature> for Razorpay {
    type Ok = bool;
    type Err = Traced<gateway::Error>;

    async fn execute(
        &self,
        op: VerifySignature,
    ) -> Result<Self::Ok, Self::Err> {
        let VerifySignature { order_id, payment_id, signature } = op;

        let payload = format!("{order_id}|{payment_id}");
        Ok(verify_hmac_sha256(
            self.config.key_secret.expose_secret(),
            payload.as_bytes(),
            signature.as_ref(),
        ))
    }
}

/// Verifies the hex-encoded HMAC-SHA256 `signature` of the `payload` in
/// constant time.
fn verify_hmac_sha256(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("any key length is valid");
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

/// Body of an order creation API request.
#[derive(Debug, Serialize)]
struct OrderRequest {
    /// Amount to be collected, in minor currency units.
    amount: i64,

    /// ISO code of the `amount` currency.
    currency: String,

    /// Receipt to attach to the order.
    receipt: String,

    /// `1` to capture authorized payments automatically.
    payment_capture: u8,
}

/// Order entity of an API response.
#[derive(Debug, Deserialize)]
struct Order {
    /// ID of the order.
    id: String,
}

/// Body of a refund creation API request.
#[derive(Debug, Serialize)]
struct RefundRequest {
    /// Amount to be refunded, in minor currency units, or [`None`] for a
    /// full refund.
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<i64>,

    /// Processing speed of the refund.
    speed: &'static str,

    /// [`RefundNotes`] to attach to the refund.
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<RefundNotes>,
}

/// Notes attached to a refund.
#[derive(Debug, Serialize)]
struct RefundNotes {
    /// Reason of the refund.
    reason: String,
}

/// Refund entity of an API response.
#[derive(Debug, Deserialize)]
struct Refund {
    /// ID of the refund.
    id: String,
}

/// Error body of an API response.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    /// [`ApiError`] describing the failure.
    error: ApiError,
}

/// Error entity of an API response.
#[derive(Clone, Debug, Deserialize, Display)]
#[display("{code}: {description}")]
pub struct ApiError {
    /// Machine-readable code of this [`ApiError`].
    pub code: String,

    /// Human-readable description of this [`ApiError`].
    pub description: String,
}

/// [`Razorpay`] client error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Amount cannot be represented in minor currency units.
    #[display("Amount cannot be represented in minor currency units")]
    AmountIsTooBig,

    /// API responded with an [`ApiError`].
    #[display("API responded with an error: {_0}")]
    Api(#[error(not(source))] ApiError),

    /// HTTP request failed.
    #[display("HTTP request failed: {_0}")]
    #[from]
    Http(reqwest::Error),

    /// API response contains a malformed entity ID.
    #[display("API response contains a malformed ID")]
    MalformedId,
}

#[cfg(test)]
mod spec {
    use hmac::Mac as _;

    use super::*;

    fn sign(secret: &str, payload: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("any key length is valid");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_genuine_signature() {
        let payload = "order_EKw1Vs1yYjQnvG|pay_29QQoUBi66xm2f";
        let signature = sign("secret", payload);

        assert!(verify_hmac_sha256(
            "secret",
            payload.as_bytes(),
            &signature,
        ));
    }

    #[test]
    fn rejects_tampered_signature() {
        let payload = "order_EKw1Vs1yYjQnvG|pay_29QQoUBi66xm2f";
        let mut signature = sign("secret", payload);
        let tampered = if signature.pop() == Some('0') { '1' } else { '0' };
        signature.push(tampered);

        assert!(!verify_hmac_sha256(
            "secret",
            payload.as_bytes(),
            &signature,
        ));
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = "order_EKw1Vs1yYjQnvG|pay_29QQoUBi66xm2f";
        let signature = sign("secret", payload);

        assert!(!verify_hmac_sha256(
            "another",
            payload.as_bytes(),
            &signature,
        ));
    }

    #[test]
    fn rejects_malformed_signature() {
        assert!(!verify_hmac_sha256("secret", b"payload", "not a hex"));
    }
}
