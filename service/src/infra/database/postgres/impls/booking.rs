//! [`Booking`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Insert, Lock, Select, Update},
    DateTime, Money,
};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{booking, car, user, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<booking::Id, Booking>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[booking::Id]>,
{
    type Ok = HashMap<booking::Id, Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<booking::Id, Booking>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[booking::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, renter_id, car_id, host_id, \
                   start_date, end_date, \
                   amount, amount_currency, \
                   pick_up, drop_off, \
                   status, rental_status, payment_status, \
                   payment_id, created_at \
            FROM bookings \
            WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
            LIMIT $2::INT4";
        Ok(self
            .query(SQL, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                // SAFETY: `bookings` table `CHECK` constraint guarantees
                //         ordered boundaries.
                #[expect(unsafe_code, reason = "invariants are preserved")]
                let window = unsafe {
                    booking::Window::new_unchecked(
                        row.get("start_date"),
                        row.get("end_date"),
                    )
                };
                (
                    id,
                    Booking {
                        id,
                        renter_id: row.get("renter_id"),
                        car_id: row.get("car_id"),
                        host_id: row.get("host_id"),
                        window,
                        amount: Money {
                            amount: row.get("amount"),
                            currency: row.get("amount_currency"),
                        },
                        pick_up: row.get("pick_up"),
                        drop_off: row.get("drop_off"),
                        status: row.get("status"),
                        rental_status: row.get("rental_status"),
                        payment_status: row.get("payment_status"),
                        payment_id: row.get("payment_id"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<booking::Id, Booking>, [booking::Id; 1]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            renter_id,
            car_id,
            host_id,
            window,
            amount,
            pick_up,
            drop_off,
            status,
            rental_status,
            payment_status,
            payment_id,
            created_at,
        } = booking;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, renter_id, car_id, host_id, \
                start_date, end_date, \
                amount, amount_currency, \
                pick_up, drop_off, \
                status, rental_status, payment_status, \
                payment_id, created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ, \
                $7::NUMERIC, $8::INT2, \
                $9::VARCHAR, $10::VARCHAR, \
                $11::INT2, $12::INT2, $13::INT2, \
                $14::UUID, $15::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET renter_id = EXCLUDED.renter_id, \
                car_id = EXCLUDED.car_id, \
                host_id = EXCLUDED.host_id, \
                start_date = EXCLUDED.start_date, \
                end_date = EXCLUDED.end_date, \
                amount = EXCLUDED.amount, \
                amount_currency = EXCLUDED.amount_currency, \
                pick_up = EXCLUDED.pick_up, \
                drop_off = EXCLUDED.drop_off, \
                status = EXCLUDED.status, \
                rental_status = EXCLUDED.rental_status, \
                payment_status = EXCLUDED.payment_status, \
                payment_id = EXCLUDED.payment_id, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &renter_id,
                &car_id,
                &host_id,
                &window.start(),
                &window.end(),
                &amount.amount,
                &amount.currency,
                &pick_up,
                &drop_off,
                &status,
                &rental_status,
                &payment_status,
                &payment_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<read::booking::HasConflict, read::booking::conflict::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::HasConflict, read::booking::conflict::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::conflict::Selector {
            car_id,
            window,
            exclude,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT EXISTS(\
                SELECT 1 \
                FROM bookings \
                WHERE car_id = $1::UUID \
                  AND status != $2::INT2 \
                  AND start_date < $4::TIMESTAMPTZ \
                  AND end_date > $3::TIMESTAMPTZ \
                  AND ($5::UUID IS NULL OR id != $5::UUID)\
            )";
        self.query_opt(
            SQL,
            &[
                &car_id,
                &booking::Status::Cancelled,
                &window.start(),
                &window.end(),
                &exclude,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| {
            read::booking::HasConflict(row.expect("always exists").get(0))
        })
    }
}

impl<C> Database<Select<By<Vec<Booking>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: for<'l> Database<
        Select<By<HashMap<booking::Id, Booking>, &'l [booking::Id]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let renter_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE renter_id = $1::UUID \
            ORDER BY created_at DESC, id DESC";
        let ids = self
            .query(SQL, &[&renter_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<booking::Id>>();

        let mut bookings = self
            .execute(Select(By::new(ids.as_slice())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| bookings.remove(id)).collect())
    }
}

impl<C> Database<Select<By<Vec<Booking>, ()>>> for Postgres<C>
where
    C: Connection,
    Self: for<'l> Database<
        Select<By<HashMap<booking::Id, Booking>, &'l [booking::Id]>>,
        Ok = HashMap<booking::Id, Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Booking>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            ORDER BY created_at DESC, id DESC";
        let ids = self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<booking::Id>>();

        let mut bookings = self
            .execute(Select(By::new(ids.as_slice())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| bookings.remove(id)).collect())
    }
}

impl<C> Database<Select<By<read::booking::ActiveCount, car::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::ActiveCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::booking::ActiveCount, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let car_id: car::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(id)::INT8 \
            FROM bookings \
            WHERE car_id = $1::UUID \
              AND status != $2::INT2 \
              AND end_date > NOW()";
        self.query_opt(SQL, &[&car_id, &booking::Status::Cancelled])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Select<By<read::booking::ActiveRentals, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::ActiveRentals;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::booking::ActiveRentals, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let host_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(id)::INT8 \
            FROM bookings \
            WHERE host_id = $1::UUID \
              AND status = $2::INT2 \
              AND rental_status = $3::INT2";
        self.query_opt(
            SQL,
            &[
                &host_id,
                &booking::Status::Completed,
                &booking::RentalStatus::Active,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Select<By<read::report::Earned, read::report::Earnings>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::report::Earned;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::report::Earned, read::report::Earnings>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::report::Earnings { host_id, since } = by.into_inner();

        const SQL: &str = "\
            SELECT COALESCE(SUM(amount), 0) \
            FROM bookings \
            WHERE host_id = $1::UUID \
              AND status = $2::INT2 \
              AND start_date >= $3::TIMESTAMPTZ";
        self.query_opt(
            SQL,
            &[&host_id, &booking::Status::Completed, &since],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| {
            row.expect("always exists").get::<_, Decimal>(0).into()
        })
    }
}

impl<C> Database<Update<By<read::booking::Swept, DateTime>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::Swept;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<read::booking::Swept, DateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let now: DateTime = by.into_inner();

        const ACTIVATE_SQL: &str = "\
            UPDATE bookings \
            SET rental_status = $2::INT2 \
            WHERE status = $4::INT2 \
              AND rental_status = $3::INT2 \
              AND start_date <= $1::TIMESTAMPTZ \
              AND end_date >= $1::TIMESTAMPTZ";
        let activated = self
            .exec(
                ACTIVATE_SQL,
                &[
                    &now,
                    &booking::RentalStatus::Active,
                    &booking::RentalStatus::Upcoming,
                    &booking::Status::Completed,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        const COMPLETE_SQL: &str = "\
            UPDATE bookings \
            SET rental_status = $2::INT2 \
            WHERE status = $3::INT2 \
              AND rental_status != $2::INT2 \
              AND end_date < $1::TIMESTAMPTZ";
        let completed = self
            .exec(
                COMPLETE_SQL,
                &[
                    &now,
                    &booking::RentalStatus::Completed,
                    &booking::Status::Completed,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::booking::Swept {
            activated,
            completed,
        })
    }
}
