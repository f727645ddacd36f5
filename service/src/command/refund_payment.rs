//! [`Command`] for refunding a [`Payment`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{payment, user, Payment},
    infra::{database, gateway, Database, Gateway},
    Service,
};

use super::Command;

/// [`Command`] for refunding a captured [`Payment`] through the gateway it
/// was collected by.
#[derive(Clone, Debug)]
pub struct RefundPayment {
    /// [`payment::Id`] of the [`Payment`] to be refunded.
    pub payment_id: payment::Id,

    /// [`user::Id`] of the [`User`] the [`Payment`] belongs to.
    pub user_id: user::Id,

    /// Amount to be refunded, or [`None`] for a full refund.
    pub amount: Option<Money>,

    /// Reason of the refund to be reported to the gateway.
    pub reason: Option<String>,
}

impl<Db, Gw, Nf> Command<RefundPayment> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Payment, payment::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Gw: Gateway<
            gateway::CreateRefund,
            Ok = payment::RefundId,
            Err = Traced<gateway::Error>,
        >,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RefundPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefundPayment {
            payment_id,
            user_id,
            amount,
            reason,
        } = cmd;

        if let Some(amount) = amount {
            if !amount.is_positive() {
                return Err(tracerr::new!(E::NonPositiveAmount));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Payment`.
        tx.execute(Lock(By::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(payment_id))
            .map_err(tracerr::wrap!())?;
        if payment.user_id != user_id {
            return Err(tracerr::new!(E::ForeignPayment(payment_id)));
        }
        match payment.refund_eligibility() {
            payment::RefundEligibility::AlreadyRefunded => {
                return Err(tracerr::new!(E::AlreadyRefunded(payment_id)));
            }
            payment::RefundEligibility::NotCaptured => {
                return Err(tracerr::new!(E::NotCaptured(payment_id)));
            }
            payment::RefundEligibility::Eligible => {}
        }
        // `Eligible` guarantees the gateway ID presence.
        let Some(gateway_payment_id) = payment.gateway_payment_id.clone()
        else {
            return Err(tracerr::new!(E::NotCaptured(payment_id)));
        };

        let refund_id = self
            .gateway()
            .execute(gateway::CreateRefund {
                payment_id: gateway_payment_id,
                amount,
                reason: Some(
                    reason.unwrap_or_else(|| "Booking cancellation".into()),
                ),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        payment.status = payment::Status::Refunded;
        payment.refund_id = Some(refund_id);
        tx.execute(Update(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(payment)
    }
}

/// Error of [`RefundPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payment`] is refunded already.
    #[display("`Payment(id: {_0})` is already refunded")]
    #[from(ignore)]
    AlreadyRefunded(#[error(not(source))] payment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Payment`] belongs to another [`User`].
    #[display("`Payment(id: {_0})` belongs to another `User`")]
    #[from(ignore)]
    ForeignPayment(#[error(not(source))] payment::Id),

    /// [`Gateway`] error.
    #[display("`Gateway` operation failed: {_0}")]
    Gateway(gateway::Error),

    /// Requested refund amount is not positive.
    #[display("Refund amount must be positive")]
    NonPositiveAmount,

    /// [`Payment`] is not captured, so cannot be refunded.
    #[display("`Payment(id: {_0})` is not captured")]
    #[from(ignore)]
    NotCaptured(#[error(not(source))] payment::Id),

    /// [`Payment`] doesn't exist.
    #[display("`Payment(id: {_0})` does not exist")]
    #[from(ignore)]
    PaymentNotExists(#[error(not(source))] payment::Id),
}
