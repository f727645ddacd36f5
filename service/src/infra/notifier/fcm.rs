//! [`Fcm`] push notifications implementation.

use std::time::Duration;

use derive_more::{Display, Error as StdError, From};
use reqwest::header;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::infra::{
    notifier::{self, Push},
    Notifier,
};

/// FCM error codes meaning the pushed device token is gone.
const UNREGISTERED_CODES: [&str; 3] =
    ["InvalidRegistration", "MissingRegistration", "NotRegistered"];

/// [`Fcm`] client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// URL of the message sending endpoint.
    pub endpoint: String,

    /// Server key to authenticate requests with.
    pub server_key: SecretString,

    /// Timeout of a single request.
    pub timeout: Duration,
}

/// [`Notifier`] implementation backed by [Firebase Cloud Messaging].
///
/// [Firebase Cloud Messaging]: https://firebase.google.com/docs/cloud-messaging
#[derive(Clone, Debug)]
pub struct Fcm {
    /// [`Config`] of this client.
    config: Config,

    /// HTTP client to perform requests with.
    http: reqwest::Client,
}

impl Fcm {
    /// Creates a new [`Fcm`] client out of the provided [`Config`].
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
}

impl Notifier<Push> for Fcm {
    type Ok = ();
    type Err = Traced<notifier::Error>;

    async fn execute(&self, op: Push) -> Result<Self::Ok, Self::Err> {
        let Push { device_token, message } = op;

        let req = SendRequest {
            to: device_token.to_string(),
            notification: Notification {
                title: message.title,
                body: message.body,
            },
            data: DataPayload {
                kind: message.data.event.to_string(),
                car_id: message.data.car_id.to_string(),
                booking_id: message.data.booking_id.to_string(),
            },
        };

        let resp = self
            .http
            .post(&self.config.endpoint)
            .header(
                header::AUTHORIZATION,
                format!("key={}", self.config.server_key.expose_secret()),
            )
            .json(&req)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        let resp: SendResponse = resp
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        if let Some(code) =
            resp.results.into_iter().next().and_then(|r| r.error)
        {
            return Err(tracerr::new!(classify(code)))
                .map_err(tracerr::map_from);
        }

        Ok(())
    }
}

/// Interprets the FCM error code of an undelivered message.
fn classify(code: String) -> Error {
    if UNREGISTERED_CODES.contains(&code.as_str()) {
        Error::TokenNotRegistered
    } else {
        Error::Undelivered(code)
    }
}

/// Body of a message sending request.
#[derive(Debug, Serialize)]
struct SendRequest {
    /// Registration token of the target device.
    to: String,

    /// [`Notification`] to be displayed on the device.
    notification: Notification,

    /// [`DataPayload`] delivered to the application on the device.
    data: DataPayload,
}

/// Display notification of a [`SendRequest`].
#[derive(Debug, Serialize)]
struct Notification {
    /// Title of the notification.
    title: String,

    /// Body of the notification.
    body: String,
}

/// Data payload of a [`SendRequest`].
///
/// FCM requires all payload values to be strings.
#[derive(Debug, Serialize)]
struct DataPayload {
    /// Kind of the event.
    #[serde(rename = "type")]
    kind: String,

    /// ID of the car the event is about.
    car_id: String,

    /// ID of the booking the event is about.
    booking_id: String,
}

/// Body of a message sending response.
#[derive(Debug, Deserialize)]
struct SendResponse {
    /// Per-message [`SendResult`]s.
    #[serde(default)]
    results: Vec<SendResult>,
}

/// Result of sending a single message.
#[derive(Debug, Deserialize)]
struct SendResult {
    /// Error code, if the message was not delivered.
    error: Option<String>,
}

/// [`Fcm`] client error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed.
    #[display("HTTP request failed: {_0}")]
    #[from]
    Http(reqwest::Error),

    /// Pushed device token is not registered anymore.
    #[display("Device token is not registered")]
    TokenNotRegistered,

    /// FCM rejected the message with an error code.
    #[display("Message rejected: {_0}")]
    Undelivered(#[error(not(source))] String),
}

#[cfg(test)]
mod spec {
    use super::*;

    #[test]
    fn classifies_unregistered_token_codes() {
        for code in UNREGISTERED_CODES {
            assert!(matches!(
                classify(code.into()),
                Error::TokenNotRegistered,
            ));
        }
    }

    #[test]
    fn classifies_other_codes_as_undelivered() {
        assert!(matches!(
            classify("Unavailable".into()),
            Error::Undelivered(code) if code == "Unavailable",
        ));
    }
}
