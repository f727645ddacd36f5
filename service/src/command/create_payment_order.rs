//! [`Command`] for creating a [`Payment`] order.

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{payment, user, Payment},
    infra::{database, gateway, Database, Gateway},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Payment`] order.
///
/// The order is opened on the payment gateway first, and the [`Payment`] is
/// persisted in [`payment::Status::Created`] carrying the gateway order ID.
#[derive(Clone, Copy, Debug)]
pub struct CreatePaymentOrder {
    /// ID of the [`User`] paying.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// Amount to collect.
    pub amount: Money,
}

impl<Db, Gw, Nf> Command<CreatePaymentOrder> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Gw: Gateway<
        gateway::CreateOrder,
        Ok = payment::OrderId,
        Err = Traced<gateway::Error>,
    >,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePaymentOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePaymentOrder { user_id, amount } = cmd;

        if !amount.is_positive() {
            return Err(tracerr::new!(E::NonPositiveAmount));
        }

        let id = payment::Id::new();
        let order_id = self
            .gateway()
            .execute(gateway::CreateOrder {
                amount,
                receipt: id,
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let payment = Payment {
            id,
            user_id,
            booking_id: None,
            amount,
            status: payment::Status::Created,
            order_id,
            gateway_payment_id: None,
            signature: None,
            refund_id: None,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(payment)
    }
}

/// Error of [`CreatePaymentOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Gateway`] error.
    #[display("`Gateway` operation failed: {_0}")]
    Gateway(gateway::Error),

    /// Requested amount is not positive.
    #[display("`Payment` amount must be positive")]
    NonPositiveAmount,
}
