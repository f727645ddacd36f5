//! REST API definitions.

pub mod auth;
pub mod booking;
pub mod car;
pub mod payment;
pub mod report;
pub mod user;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use common::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::define_error;

/// Builds a [`Router`] serving all the API endpoints.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/code", post(auth::code))
        .route("/auth/session", post(auth::session))
        .route("/users/me", get(user::me))
        .route("/users/me/device", put(user::device))
        .route("/cars", post(car::create).get(car::list))
        .route("/cars/:id", get(car::find).delete(car::delete))
        .route("/cars/:id/availability", patch(car::availability))
        .route("/bookings", post(booking::create).get(booking::list))
        .route("/bookings/all", get(booking::all))
        .route("/bookings/:id", get(booking::find))
        .route("/bookings/:id/cancel", put(booking::cancel))
        .route("/payments", get(payment::list))
        .route("/payments/order", post(payment::order))
        .route("/payments/verify", post(payment::verify))
        .route("/payments/:id/refund", post(payment::refund))
        .route("/host/dashboard", get(report::host_dashboard))
}

/// Envelope of a successful API response.
#[derive(Debug, Serialize)]
pub struct Success<P> {
    /// Success indicator, always `true` here.
    pub success: bool,

    /// Human-readable description of the outcome.
    pub message: String,

    /// Endpoint-specific fields merged into the envelope.
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Success<P> {
    /// Creates a new [`Success`] envelope with the provided `message` and
    /// `payload`.
    pub fn new(message: impl Into<String>, payload: P) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
        }
    }
}

/// Empty [`Success::payload`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Empty {}

/// Money amount crossing the API boundary.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Money {
    /// Amount, as a decimal string.
    pub amount: Decimal,

    /// [`Currency`] of the amount.
    pub currency: Currency,
}

impl From<common::Money> for Money {
    fn from(money: common::Money) -> Self {
        Self {
            amount: money.amount,
            currency: money.currency,
        }
    }
}

impl From<Money> for common::Money {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount,
            currency: money.currency,
        }
    }
}

#[cfg(test)]
mod spec {
    use serde::Serialize;
    use serde_json::json;

    use super::Success;

    #[derive(Serialize)]
    struct Cars {
        count: usize,
        cars: Vec<String>,
    }

    #[test]
    fn success_envelope_flattens_payload() {
        let success = Success::new(
            "Cars fetched successfully",
            Cars {
                count: 1,
                cars: vec!["car".to_owned()],
            },
        );

        assert_eq!(
            serde_json::to_value(&success).unwrap(),
            json!({
                "success": true,
                "message": "Cars fetched successfully",
                "count": 1,
                "cars": ["car"],
            }),
        );
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an administrator"]
        Admin,

        #[code = "NOT_HOST"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a host"]
        Host,
    }
}
