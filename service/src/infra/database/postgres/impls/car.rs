//! [`Car`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    DateTime, Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{booking, car, user, Car},
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read,
};

impl<C, IDs> Database<Select<By<HashMap<car::Id, Car>, IDs>>> for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[car::Id]>,
{
    type Ok = HashMap<car::Id, Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<car::Id, Car>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[car::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap();

        const SQL: &str = "\
            SELECT id, host_id, brand, model, \
                   price_per_day, price_per_day_currency, \
                   original_price, original_price_currency, \
                   is_available, created_at \
            FROM cars \
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
                    Car {
                        id,
                        host_id: row.get("host_id"),
                        brand: row.get("brand"),
                        model: row.get("model"),
                        price_per_day: Money {
                            amount: row.get("price_per_day"),
                            currency: row.get("price_per_day_currency"),
                        },
                        original_price: Money {
                            amount: row.get("original_price"),
                            currency: row.get("original_price_currency"),
                        },
                        is_available: row.get("is_available"),
                        created_at: row.get("created_at"),
                    },
                )
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Car>, car::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<car::Id, Car>, [car::Id; 1]>>,
        Ok = HashMap<car::Id, Car>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Car>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Car>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(car): Insert<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(car)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Car>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(car): Update<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        let Car {
            id,
            host_id,
            brand,
            model,
            price_per_day,
            original_price,
            is_available,
            created_at,
        } = car;

        const SQL: &str = "\
            INSERT INTO cars (\
                id, host_id, brand, model, \
                price_per_day, price_per_day_currency, \
                original_price, original_price_currency, \
                is_available, created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                $5::NUMERIC, $6::INT2, \
                $7::NUMERIC, $8::INT2, \
                $9::BOOLEAN, $10::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET host_id = EXCLUDED.host_id, \
                brand = EXCLUDED.brand, \
                model = EXCLUDED.model, \
                price_per_day = EXCLUDED.price_per_day, \
                price_per_day_currency = EXCLUDED.price_per_day_currency, \
                original_price = EXCLUDED.original_price, \
                original_price_currency = \
                    EXCLUDED.original_price_currency, \
                is_available = EXCLUDED.is_available, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &host_id,
                &brand,
                &model,
                &price_per_day.amount,
                &price_per_day.currency,
                &original_price.amount,
                &original_price.currency,
                &is_available,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Car, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM cars \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Car, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM cars \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Car>, read::car::list::Filter>>> for Postgres<C>
where
    C: Connection,
    Self: for<'l> Database<
        Select<By<HashMap<car::Id, Car>, &'l [car::Id]>>,
        Ok = HashMap<car::Id, Car>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Car>, read::car::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::car::list::Filter {
            available,
            brand,
            min_price,
            max_price,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let available_idx = available.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });
        let brand_pattern =
            brand.as_ref().map(|b| LikePattern::substring(b.as_ref()));
        let brand_idx = brand_pattern.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let min_price_idx = min_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let max_price_idx = max_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM cars \
             WHERE true \
                   {availability} \
                   {brand_filtering} \
                   {min_price_filtering} \
                   {max_price_filtering} \
             ORDER BY created_at DESC, id DESC",
            availability =
                available_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND is_available = ${idx}::BOOLEAN"))
                }),
            brand_filtering =
                brand_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND brand ILIKE ${idx}::VARCHAR"))
                }),
            min_price_filtering =
                min_price_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND price_per_day >= ${idx}::NUMERIC"))
                }),
            max_price_filtering =
                max_price_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND price_per_day <= ${idx}::NUMERIC"))
                }),
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<car::Id>>();

        let mut cars = self
            .execute(Select(By::new(ids.as_slice())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| cars.remove(id)).collect())
    }
}

impl<C> Database<Select<By<Vec<Car>, user::Id>>> for Postgres<C>
where
    C: Connection,
    Self: for<'l> Database<
        Select<By<HashMap<car::Id, Car>, &'l [car::Id]>>,
        Ok = HashMap<car::Id, Car>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Car>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let host_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM cars \
            WHERE host_id = $1::UUID \
            ORDER BY created_at DESC, id DESC";
        let ids = self
            .query(SQL, &[&host_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect::<Vec<car::Id>>();

        let mut cars = self
            .execute(Select(By::new(ids.as_slice())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| cars.remove(id)).collect())
    }
}

impl<C> Database<Update<By<read::car::Reconciled, DateTime>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::car::Reconciled;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<read::car::Reconciled, DateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let now: DateTime = by.into_inner();

        const FREE_SQL: &str = "\
            UPDATE cars \
            SET is_available = true \
            WHERE is_available = false \
              AND NOT EXISTS (\
                  SELECT 1 \
                  FROM bookings \
                  WHERE bookings.car_id = cars.id \
                    AND bookings.status != $2::INT2 \
                    AND bookings.end_date > $1::TIMESTAMPTZ)";
        let freed = self
            .exec(FREE_SQL, &[&now, &booking::Status::Cancelled])
            .await
            .map_err(tracerr::wrap!())?;

        const HOLD_SQL: &str = "\
            UPDATE cars \
            SET is_available = false \
            WHERE is_available = true \
              AND EXISTS (\
                  SELECT 1 \
                  FROM bookings \
                  WHERE bookings.car_id = cars.id \
                    AND bookings.status != $2::INT2 \
                    AND bookings.end_date > $1::TIMESTAMPTZ)";
        let held = self
            .exec(HOLD_SQL, &[&now, &booking::Status::Cancelled])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::car::Reconciled { freed, held })
    }
}

impl<C> Database<Select<By<Vec<read::report::CarOccupancy>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::report::CarOccupancy>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::report::CarOccupancy>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let host_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT c.id AS car_id, c.brand, c.model, \
                   b.id AS booking_id, b.rental_status, \
                   b.start_date, b.end_date, \
                   u.name AS renter_name \
            FROM cars c \
            LEFT JOIN LATERAL (\
                SELECT id, renter_id, rental_status, start_date, end_date \
                FROM bookings \
                WHERE car_id = c.id \
                  AND status = $2::INT2 \
                  AND rental_status IN \
                      (SELECT unnest($3::INT2[]) LIMIT $4::INT4) \
                ORDER BY rental_status DESC, start_date ASC \
                LIMIT 1\
            ) b ON true \
            LEFT JOIN users u ON u.id = b.renter_id \
            WHERE c.host_id = $1::UUID \
            ORDER BY c.created_at DESC, c.id DESC";
        Ok(self
            .query(
                SQL,
                &[
                    &host_id,
                    &booking::Status::Completed,
                    &[
                        booking::RentalStatus::Upcoming,
                        booking::RentalStatus::Active,
                    ]
                    .as_slice(),
                    &2i32,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let rental = row
                    .get::<_, Option<booking::Id>>("booking_id")
                    .map(|booking_id| {
                        // SAFETY: `bookings` table `CHECK` constraint
                        //         guarantees ordered boundaries.
                        #[expect(
                            unsafe_code,
                            reason = "invariants are preserved"
                        )]
                        let window = unsafe {
                            booking::Window::new_unchecked(
                                row.get("start_date"),
                                row.get("end_date"),
                            )
                        };
                        read::report::OccupyingRental {
                            booking_id,
                            rental_status: row.get("rental_status"),
                            renter_name: row.get("renter_name"),
                            window,
                        }
                    });
                read::report::CarOccupancy {
                    car_id: row.get("car_id"),
                    brand: row.get("brand"),
                    model: row.get("model"),
                    rental,
                }
            })
            .collect())
    }
}
