//! `Payment`-related endpoints.

use axum::{extract::Path, Extension, Json};
use common::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, payment},
    query, Query as _,
};
use uuid::Uuid;

use crate::{
    api::{Money, Success},
    define_error, AsError, Auth, Error, Service,
};

/// A `Payment` collected through the payment gateway.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Unique ID of this `Payment`.
    pub id: Uuid,

    /// ID of the `User` who pays.
    pub user_id: Uuid,

    /// ID of the `Booking` this `Payment` pays for, once linked.
    pub booking_id: Option<Uuid>,

    /// Amount of this `Payment`.
    pub amount: Money,

    /// Status of this `Payment`.
    pub status: String,

    /// ID of the gateway order this `Payment` is collected through.
    pub order_id: String,

    /// ID the gateway reports this `Payment` under, once captured.
    pub gateway_payment_id: Option<String>,

    /// ID of the gateway refund of this `Payment`, once refunded.
    pub refund_id: Option<String>,

    /// Date and time when this `Payment` was created, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: payment::CreationDateTime,
}

impl From<domain::Payment> for Payment {
    fn from(payment: domain::Payment) -> Self {
        Self {
            id: payment.id.into(),
            user_id: payment.user_id.into(),
            booking_id: payment.booking_id.map(Into::into),
            amount: payment.amount.into(),
            status: payment.status.to_string(),
            order_id: payment.order_id.to_string(),
            gateway_payment_id: payment
                .gateway_payment_id
                .map(|id| id.to_string()),
            refund_id: payment.refund_id.map(|id| id.to_string()),
            created_at: payment.created_at,
        }
    }
}

/// Payload carrying a single [`Payment`].
#[derive(Debug, Serialize)]
pub struct Single {
    /// The `Payment` itself.
    pub payment: Payment,
}

/// Payload carrying a list of [`Payment`]s.
#[derive(Debug, Serialize)]
pub struct List {
    /// Number of the listed `Payment`s.
    pub count: usize,

    /// The `Payment`s themselves.
    pub payments: Vec<Payment>,
}

/// Key ID identifying the platform to the payment gateway, shared with API
/// clients for checkout initialization.
#[derive(Clone, Debug)]
pub struct GatewayKeyId(pub String);

/// Request body of the payment order endpoint.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct OrderRequest {
    /// Amount to collect, as a decimal string.
    pub amount: Decimal,

    /// Currency of the amount.
    ///
    /// Defaults to the platform currency.
    pub currency: Option<Currency>,
}

/// Created payment order returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// ID of the gateway order to collect the payment through.
    pub order_id: String,

    /// ID of the created `Payment`.
    pub payment_id: Uuid,

    /// Amount to collect, as a decimal string.
    pub amount: Decimal,

    /// Currency of the amount.
    pub currency: Currency,

    /// Gateway key ID to initialize the checkout with.
    pub key_id: String,
}

/// Request body of the payment verification endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// ID of the gateway order the `Payment` is collected through.
    pub order_id: String,

    /// ID the gateway reports the `Payment` under.
    pub payment_id: String,

    /// Capture signature to verify.
    pub signature: String,
}

/// Request body of the refund endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RefundRequest {
    /// Amount to refund, as a decimal string.
    ///
    /// The whole `Payment` amount is refunded when omitted.
    pub amount: Option<Decimal>,

    /// Reason of the refund.
    pub reason: Option<String>,
}

/// Creates a gateway order collecting the provided amount from the
/// authenticated `User`.
///
/// # Errors
///
/// Possible error codes:
/// - `NON_POSITIVE_AMOUNT` - the provided amount is zero or negative.
pub async fn order(
    Extension(service): Extension<Service>,
    Extension(GatewayKeyId(key_id)): Extension<GatewayKeyId>,
    auth: Auth,
    Json(req): Json<OrderRequest>,
) -> Result<(http::StatusCode, Json<Success<Order>>), Error> {
    let currency = req.currency.unwrap_or(service.config().currency);

    let payment = service
        .execute(command::CreatePaymentOrder {
            user_id: auth.user.id,
            amount: common::Money {
                amount: req.amount,
                currency,
            },
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(Success::new(
            "Payment order created successfully",
            Order {
                order_id: payment.order_id.to_string(),
                payment_id: payment.id.into(),
                amount: payment.amount.amount,
                currency: payment.amount.currency,
                key_id,
            },
        )),
    ))
}

/// Verifies a gateway capture and marks the `Payment` as captured.
///
/// The signature proves the capture authenticity, so no session is required.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - the provided fields are malformed;
/// - `PAYMENT_NOT_EXISTS` - no `Payment` with the provided order ID exists;
/// - `WRONG_SIGNATURE` - the provided signature doesn't match;
/// - `PAYMENT_ALREADY_CAPTURED` - the `Payment` is captured with another
///   verification already;
/// - `PAYMENT_ALREADY_REFUNDED` - the `Payment` is refunded already.
pub async fn verify(
    Extension(service): Extension<Service>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Success<Single>>, Error> {
    let order_id = req
        .order_id
        .parse::<payment::OrderId>()
        .map_err(|e| Error::invalid_input(&e))?;
    let gateway_payment_id = req
        .payment_id
        .parse::<payment::GatewayPaymentId>()
        .map_err(|e| Error::invalid_input(&e))?;
    let signature = req
        .signature
        .parse::<payment::Signature>()
        .map_err(|e| Error::invalid_input(&e))?;

    let payment = service
        .execute(command::VerifyPayment {
            order_id,
            gateway_payment_id,
            signature,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Payment verified successfully",
        Single {
            payment: payment.into(),
        },
    )))
}

/// Refunds the `Payment` with the provided ID.
///
/// A partial refund amount is quoted in the platform currency.
///
/// # Errors
///
/// Possible error codes:
/// - `PAYMENT_NOT_EXISTS` - no `Payment` with the provided ID exists;
/// - `FOREIGN_PAYMENT` - the `Payment` belongs to another `User`;
/// - `PAYMENT_NOT_CAPTURED` - the `Payment` is not captured;
/// - `PAYMENT_ALREADY_REFUNDED` - the `Payment` is refunded already;
/// - `NON_POSITIVE_AMOUNT` - the provided amount is zero or negative.
pub async fn refund(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<Success<Single>>, Error> {
    let amount = req.amount.map(|amount| common::Money {
        amount,
        currency: service.config().currency,
    });

    let payment = service
        .execute(command::RefundPayment {
            payment_id: id.into(),
            user_id: auth.user.id,
            amount,
            reason: req.reason,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Payment refunded successfully",
        Single {
            payment: payment.into(),
        },
    )))
}

/// Lists the `Payment`s of the authenticated `User`, newest first.
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<Json<Success<List>>, Error> {
    let payments = service
        .execute(query::payments::OfUser::by(auth.user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Payments fetched successfully",
        List {
            count: payments.len(),
            payments: payments.into_iter().map(Into::into).collect(),
        },
    )))
}

impl AsError for command::create_payment_order::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Gateway(e) => e.try_as_error(),
            Self::NonPositiveAmount => {
                Some(PaymentError::NonPositiveAmount.into())
            }
        }
    }
}

impl AsError for command::verify_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PAYMENT_ALREADY_CAPTURED"]
                #[status = BAD_REQUEST]
                #[message = "`Payment` is captured with another verification \
                             already"]
                AlreadyCaptured,

                #[code = "PAYMENT_ALREADY_REFUNDED"]
                #[status = BAD_REQUEST]
                #[message = "`Payment` is refunded already"]
                AlreadyRefunded,

                #[code = "PAYMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Payment` with the provided order ID is not \
                             exists"]
                NotExists,

                #[code = "WRONG_SIGNATURE"]
                #[status = BAD_REQUEST]
                #[message = "Provided signature does not match the verified \
                             `Payment`"]
                WrongSignature,
            }
        }

        match self {
            Self::AlreadyCaptured(_) => Some(Error::AlreadyCaptured.into()),
            Self::AlreadyRefunded(_) => Some(Error::AlreadyRefunded.into()),
            Self::Db(e) => e.try_as_error(),
            Self::Gateway(e) => e.try_as_error(),
            Self::PaymentNotExists(_) => Some(Error::NotExists.into()),
            Self::WrongSignature => Some(Error::WrongSignature.into()),
        }
    }
}

impl AsError for command::refund_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PAYMENT_ALREADY_REFUNDED"]
                #[status = BAD_REQUEST]
                #[message = "`Payment` with the provided ID is refunded \
                             already"]
                AlreadyRefunded,

                #[code = "FOREIGN_PAYMENT"]
                #[status = FORBIDDEN]
                #[message = "`Payment` with the provided ID belongs to \
                             another `User`"]
                Foreign,

                #[code = "PAYMENT_NOT_CAPTURED"]
                #[status = BAD_REQUEST]
                #[message = "`Payment` with the provided ID is not captured"]
                NotCaptured,
            }
        }

        match self {
            Self::AlreadyRefunded(_) => Some(Error::AlreadyRefunded.into()),
            Self::Db(e) => e.try_as_error(),
            Self::ForeignPayment(_) => Some(Error::Foreign.into()),
            Self::Gateway(e) => e.try_as_error(),
            Self::NonPositiveAmount => {
                Some(PaymentError::NonPositiveAmount.into())
            }
            Self::NotCaptured(_) => Some(Error::NotCaptured.into()),
            Self::PaymentNotExists(_) => Some(PaymentError::NotExists.into()),
        }
    }
}

define_error! {
    enum PaymentError {
        #[code = "NON_POSITIVE_AMOUNT"]
        #[status = BAD_REQUEST]
        #[message = "`Payment` amount must be positive"]
        NonPositiveAmount,

        #[code = "PAYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Payment` with the provided ID is not exists"]
        NotExists,
    }
}
