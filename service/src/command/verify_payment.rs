//! [`Command`] for verifying a [`Payment`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, Payment},
    infra::{database, gateway, Database, Gateway},
    Service,
};

use super::Command;

/// [`Command`] for verifying a [`Payment`].
///
/// Checks the gateway signature over the collected [`Payment`] and captures
/// it on success. A mismatched signature marks the [`Payment`] as
/// [`payment::Status::Failed`].
#[derive(Clone, Debug)]
pub struct VerifyPayment {
    /// [`payment::OrderId`] the [`Payment`] was collected through.
    pub order_id: payment::OrderId,

    /// ID assigned to the [`Payment`] by the gateway.
    pub gateway_payment_id: payment::GatewayPaymentId,

    /// [`payment::Signature`] to verify.
    pub signature: payment::Signature,
}

impl<Db, Gw, Nf> Command<VerifyPayment> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Payment>, payment::OrderId>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Payment, payment::OrderId>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Gw: Gateway<
        gateway::VerifySignature,
        Ok = bool,
        Err = Traced<gateway::Error>,
    >,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: VerifyPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VerifyPayment {
            order_id,
            gateway_payment_id,
            signature,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Payment`.
        tx.execute(Lock(By::new(order_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(order_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PaymentNotExists(order_id))
            .map_err(tracerr::wrap!())?;
        match payment.match_capture(&gateway_payment_id, &signature) {
            // Repeated verification of the same capture is a no-op.
            payment::CaptureMatch::Repeated => return Ok(payment),
            payment::CaptureMatch::Conflicting => {
                return Err(tracerr::new!(E::AlreadyCaptured(payment.id)));
            }
            payment::CaptureMatch::Refunded => {
                return Err(tracerr::new!(E::AlreadyRefunded(payment.id)));
            }
            payment::CaptureMatch::Unverified => {}
        }

        let is_genuine = self
            .gateway()
            .execute(gateway::VerifySignature {
                order_id: payment.order_id.clone(),
                payment_id: gateway_payment_id.clone(),
                signature: signature.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !is_genuine {
            payment.status = payment::Status::Failed;
            tx.execute(Update(payment))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            return Err(tracerr::new!(E::WrongSignature));
        }

        payment.status = payment::Status::Captured;
        payment.gateway_payment_id = Some(gateway_payment_id);
        payment.signature = Some(signature);
        tx.execute(Update(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(payment)
    }
}

/// Error of [`VerifyPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payment`] is captured with other gateway credentials already.
    #[display("`Payment(id: {_0})` is already captured")]
    #[from(ignore)]
    AlreadyCaptured(#[error(not(source))] payment::Id),

    /// [`Payment`] is refunded already.
    #[display("`Payment(id: {_0})` is already refunded")]
    #[from(ignore)]
    AlreadyRefunded(#[error(not(source))] payment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Gateway`] error.
    #[display("`Gateway` operation failed: {_0}")]
    Gateway(gateway::Error),

    /// [`Payment`] doesn't exist.
    #[display("`Payment(order_id: {_0})` does not exist")]
    #[from(ignore)]
    PaymentNotExists(#[error(not(source))] payment::OrderId),

    /// Presented [`payment::Signature`] doesn't match the expected one.
    #[display("`Payment` signature mismatch")]
    WrongSignature,
}
