//! [`Gateway`]-related implementations.

#[cfg(feature = "razorpay")]
pub mod razorpay;

use common::Money;
use derive_more::{Display, Error as StdError, From};

use crate::domain::payment;
#[cfg(doc)]
use crate::domain::Payment;

#[cfg(feature = "razorpay")]
pub use self::razorpay::Razorpay;

/// Payment gateway operation.
pub use common::Handler as Gateway;

/// Operation of creating a new order on a [`Gateway`], collecting the
/// specified amount.
#[derive(Clone, Copy, Debug)]
pub struct CreateOrder {
    /// Amount to be collected through the created order.
    pub amount: Money,

    /// [`payment::Id`] to attach to the created order as its receipt.
    pub receipt: payment::Id,
}

/// Operation of refunding a captured [`Payment`] on a [`Gateway`].
#[derive(Clone, Debug)]
pub struct CreateRefund {
    /// [`payment::GatewayPaymentId`] of the [`Payment`] to be refunded.
    pub payment_id: payment::GatewayPaymentId,

    /// Amount to be refunded, or [`None`] for a full refund.
    pub amount: Option<Money>,

    /// Reason of the refund.
    pub reason: Option<String>,
}

/// Operation of verifying a capture [`payment::Signature`] issued by a
/// [`Gateway`].
#[derive(Clone, Debug)]
pub struct VerifySignature {
    /// [`payment::OrderId`] the [`payment::Signature`] is issued for.
    pub order_id: payment::OrderId,

    /// [`payment::GatewayPaymentId`] the [`payment::Signature`] is issued
    /// for.
    pub payment_id: payment::GatewayPaymentId,

    /// [`payment::Signature`] to be verified.
    pub signature: payment::Signature,
}

/// [`Gateway`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "razorpay")]
    /// [`Razorpay`] error.
    Razorpay(razorpay::Error),
}
