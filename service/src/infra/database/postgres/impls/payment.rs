//! [`Payment`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{payment, user, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<payment::Id, Payment>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[payment::Id]>,
{
    type Ok = HashMap<payment::Id, Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<payment::Id, Payment>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[payment::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, user_id, booking_id, \
                   amount, amount_currency, \
                   status, order_id, \
                   gateway_payment_id, signature, refund_id, \
                   created_at \
            FROM payments \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                (
                    id,
                    Payment {
                        id,
                        user_id: row.get("user_id"),
                        booking_id: row.get("booking_id"),
                        amount: Money {
                            amount: row.get("amount"),
                            currency: row.get("amount_currency"),
                        },
                        status: row.get("status"),
                        order_id: row.get("order_id"),
                        gateway_payment_id: row.get("gateway_payment_id"),
                        signature: row.get("signature"),
                        refund_id: row.get("refund_id"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<payment::Id, Payment>, [payment::Id; 1]>>,
        Ok = HashMap<payment::Id, Payment>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Option<Payment>, payment::OrderId>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Payment>, payment::Id>>,
        Ok = Option<Payment>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::OrderId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let order_id: payment::OrderId = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM payments \
            WHERE order_id = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&order_id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            user_id,
            booking_id,
            amount,
            status,
            order_id,
            gateway_payment_id,
            signature,
            refund_id,
            created_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, user_id, booking_id, \
                amount, amount_currency, \
                status, order_id, \
                gateway_payment_id, signature, refund_id, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::NUMERIC, $5::INT2, \
                $6::INT2, $7::VARCHAR, \
                $8::VARCHAR, $9::VARCHAR, $10::VARCHAR, \
                $11::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET user_id = EXCLUDED.user_id, \
                booking_id = EXCLUDED.booking_id, \
                amount = EXCLUDED.amount, \
                amount_currency = EXCLUDED.amount_currency, \
                status = EXCLUDED.status, \
                order_id = EXCLUDED.order_id, \
                gateway_payment_id = EXCLUDED.gateway_payment_id, \
                signature = EXCLUDED.signature, \
                refund_id = EXCLUDED.refund_id, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &booking_id,
                &amount.amount,
                &amount.currency,
                &status,
                &order_id,
                &gateway_payment_id,
                &signature,
                &refund_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<payment::BookingLink>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(link): Update<payment::BookingLink>,
    ) -> Result<Self::Ok, Self::Err> {
        let payment::BookingLink { id, booking_id } = link;

        const SQL: &str = "\
            UPDATE payments \
            SET booking_id = $2::UUID \
            WHERE id = $1::UUID \
              AND booking_id IS NULL";
        self.exec(SQL, &[&id, &booking_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows == 1)
    }
}

impl<C> Database<Select<By<Vec<Payment>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: for<'l> Database<
        Select<By<HashMap<payment::Id, Payment>, &'l [payment::Id]>>,
        Ok = HashMap<payment::Id, Payment>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM payments \
            WHERE user_id = $1::UUID \
            ORDER BY created_at DESC, id DESC";
        let ids = self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<payment::Id>>();

        let mut payments = self
            .execute(Select(By::new(ids.as_slice())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| payments.remove(id)).collect())
    }
}

impl<C> Database<Update<By<read::payment::Relinked, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::payment::Relinked;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(_): Update<By<read::payment::Relinked, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            UPDATE payments \
            SET booking_id = bookings.id \
            FROM bookings \
            WHERE bookings.payment_id = payments.id \
              AND payments.booking_id IS NULL";
        self.exec(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(Into::into)
    }
}

impl<C> Database<Lock<By<Payment, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Payment, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM payments \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Payment, payment::OrderId>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Payment, payment::OrderId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let order_id: payment::OrderId = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM payments \
            WHERE order_id = $1::VARCHAR \
            FOR UPDATE";
        self.query(SQL, &[&order_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
