//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, user};
#[cfg(doc)]
use crate::domain::{Booking, User};

/// Payment collected through the payment gateway.
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`User`] who pays.
    pub user_id: user::Id,

    /// ID of the [`Booking`] this [`Payment`] pays for, once linked.
    ///
    /// Set at most once: a linked [`Payment`] cannot pay for another
    /// [`Booking`].
    pub booking_id: Option<booking::Id>,

    /// Amount of this [`Payment`].
    pub amount: Money,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`OrderId`] issued by the gateway for this [`Payment`].
    pub order_id: OrderId,

    /// [`GatewayPaymentId`] reported by the gateway, once captured.
    pub gateway_payment_id: Option<GatewayPaymentId>,

    /// [`Signature`] the capture was verified with, once captured.
    pub signature: Option<Signature>,

    /// [`RefundId`] issued by the gateway, once refunded.
    pub refund_id: Option<RefundId>,

    /// [`DateTime`] when this [`Payment`] was created.
    pub created_at: CreationDateTime,
}

impl Payment {
    /// Indicates whether this [`Payment`] is captured.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self.status, Status::Captured)
    }

    /// Matches a gateway capture against the current state of this
    /// [`Payment`].
    #[must_use]
    pub fn match_capture(
        &self,
        gateway_payment_id: &GatewayPaymentId,
        signature: &Signature,
    ) -> CaptureMatch {
        match self.status {
            Status::Captured => {
                if self.gateway_payment_id.as_ref()
                    == Some(gateway_payment_id)
                    && self.signature.as_ref() == Some(signature)
                {
                    CaptureMatch::Repeated
                } else {
                    CaptureMatch::Conflicting
                }
            }
            Status::Refunded => CaptureMatch::Refunded,
            Status::Created | Status::Authorized | Status::Failed => {
                CaptureMatch::Unverified
            }
        }
    }

    /// Returns the [`RefundEligibility`] of this [`Payment`].
    #[must_use]
    pub fn refund_eligibility(&self) -> RefundEligibility {
        match self.status {
            Status::Refunded => RefundEligibility::AlreadyRefunded,
            Status::Captured if self.gateway_payment_id.is_some() => {
                RefundEligibility::Eligible
            }
            Status::Captured
            | Status::Created
            | Status::Authorized
            | Status::Failed => RefundEligibility::NotCaptured,
        }
    }
}

/// Outcome of matching a gateway capture against a [`Payment`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaptureMatch {
    /// [`Payment`] awaits verification, so the capture may be checked.
    Unverified,

    /// Exactly this capture is verified already, nothing to change.
    Repeated,

    /// Another capture is verified already.
    Conflicting,

    /// [`Payment`] is refunded already.
    Refunded,
}

/// Eligibility of a [`Payment`] for being refunded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefundEligibility {
    /// Captured [`Payment`] carrying its gateway ID, so may be refunded.
    Eligible,

    /// [`Payment`] is refunded already.
    AlreadyRefunded,

    /// [`Payment`] is not captured, so there is nothing to refund.
    NotCaptured,
}

/// ID of a [`Payment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Link of a [`Payment`] to the [`Booking`] it pays for.
#[derive(Clone, Copy, Debug)]
pub struct BookingLink {
    /// ID of the linked [`Payment`].
    pub id: Id,

    /// ID of the [`Booking`] the [`Payment`] pays for.
    pub booking_id: booking::Id,
}

/// ID of a gateway order a [`Payment`] is collected through.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new [`OrderId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`OrderId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`OrderId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 512
    }
}

impl FromStr for OrderId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `OrderId`")
    }
}

/// ID the gateway reports a captured [`Payment`] under.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct GatewayPaymentId(String);

impl GatewayPaymentId {
    /// Creates a new [`GatewayPaymentId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`GatewayPaymentId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`GatewayPaymentId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 512
    }
}

impl FromStr for GatewayPaymentId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `GatewayPaymentId`")
    }
}

/// Signature the gateway signs a captured [`Payment`] with.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Signature(String);

impl Signature {
    /// Creates a new [`Signature`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `signature` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }

    /// Creates a new [`Signature`] if the given `signature` is valid.
    #[must_use]
    pub fn new(signature: impl Into<String>) -> Option<Self> {
        let signature = signature.into();
        Self::check(&signature).then_some(Self(signature))
    }

    /// Checks whether the given `signature` is a valid [`Signature`].
    fn check(signature: impl AsRef<str>) -> bool {
        let signature = signature.as_ref();
        signature.trim() == signature
            && !signature.is_empty()
            && signature.len() <= 512
    }
}

impl FromStr for Signature {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Signature`")
    }
}

/// ID of a gateway refund of a [`Payment`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct RefundId(String);

impl RefundId {
    /// Creates a new [`RefundId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`RefundId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`RefundId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 512
    }
}

impl FromStr for RefundId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `RefundId`")
    }
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "A gateway order is created, no money moved yet."]
        Created = 1,

        #[doc = "The gateway authorized the [`Payment`]."]
        Authorized = 2,

        #[doc = "The gateway captured the money."]
        Captured = 3,

        #[doc = "The captured money is refunded."]
        Refunded = 4,

        #[doc = "The gateway rejected the [`Payment`]."]
        Failed = 5,
    }
}

/// [`DateTime`] when a [`Payment`] was created.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{Currency, Money};
    use rust_decimal::Decimal;

    use super::{
        CaptureMatch, CreationDateTime, GatewayPaymentId, Id, OrderId,
        Payment, RefundEligibility, Signature, Status,
    };
    use crate::domain::user;

    fn payment(status: Status) -> Payment {
        Payment {
            id: Id::new(),
            user_id: user::Id::new(),
            booking_id: None,
            amount: Money {
                amount: Decimal::from(3000),
                currency: Currency::Inr,
            },
            status,
            order_id: OrderId::new("order_N5liorNmdLVrnF").unwrap(),
            gateway_payment_id: None,
            signature: None,
            refund_id: None,
            created_at: CreationDateTime::now(),
        }
    }

    fn captured() -> Payment {
        let mut p = payment(Status::Captured);
        p.gateway_payment_id = GatewayPaymentId::new("pay_N5lfTXGg2cKBqs");
        p.signature = Signature::new("6aa97fa40ea68b09");
        p
    }

    #[test]
    fn repeated_capture_verification_is_a_no_op() {
        let p = captured();

        assert_eq!(
            p.match_capture(
                &GatewayPaymentId::new("pay_N5lfTXGg2cKBqs").unwrap(),
                &Signature::new("6aa97fa40ea68b09").unwrap(),
            ),
            CaptureMatch::Repeated,
        );
    }

    #[test]
    fn different_capture_conflicts_with_the_verified_one() {
        let p = captured();

        assert_eq!(
            p.match_capture(
                &GatewayPaymentId::new("pay_other").unwrap(),
                &Signature::new("6aa97fa40ea68b09").unwrap(),
            ),
            CaptureMatch::Conflicting,
        );
        assert_eq!(
            p.match_capture(
                &GatewayPaymentId::new("pay_N5lfTXGg2cKBqs").unwrap(),
                &Signature::new("forged").unwrap(),
            ),
            CaptureMatch::Conflicting,
        );
    }

    #[test]
    fn unverified_statuses_admit_a_capture() {
        let id = GatewayPaymentId::new("pay_N5lfTXGg2cKBqs").unwrap();
        let signature = Signature::new("6aa97fa40ea68b09").unwrap();

        for status in [Status::Created, Status::Authorized, Status::Failed] {
            assert_eq!(
                payment(status).match_capture(&id, &signature),
                CaptureMatch::Unverified,
            );
        }
    }

    #[test]
    fn refunded_payment_rejects_any_capture() {
        assert_eq!(
            payment(Status::Refunded).match_capture(
                &GatewayPaymentId::new("pay_N5lfTXGg2cKBqs").unwrap(),
                &Signature::new("6aa97fa40ea68b09").unwrap(),
            ),
            CaptureMatch::Refunded,
        );
    }

    #[test]
    fn only_captured_payments_are_refundable() {
        assert_eq!(
            captured().refund_eligibility(),
            RefundEligibility::Eligible,
        );
        for status in [Status::Created, Status::Authorized, Status::Failed] {
            assert_eq!(
                payment(status).refund_eligibility(),
                RefundEligibility::NotCaptured,
            );
        }
        assert_eq!(
            payment(Status::Refunded).refund_eligibility(),
            RefundEligibility::AlreadyRefunded,
        );
    }

    #[test]
    fn captured_payment_without_gateway_id_is_not_refundable() {
        assert_eq!(
            payment(Status::Captured).refund_eligibility(),
            RefundEligibility::NotCaptured,
        );
    }
}
