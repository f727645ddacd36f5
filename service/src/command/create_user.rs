//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Phone, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Phone`] of a new [`User`].
    pub phone: user::Phone,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db, Gw, Nf> Command<CreateUser> for Service<Db, Gw, Nf>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Phone>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            phone,
            email,
            role,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&phone)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::PhoneOccupied(phone)));
        }

        let user = User {
            id: user::Id::new(),
            name,
            phone,
            email,
            role,
            device_token: None,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(|e| {
                // Concurrent registration with the same `Phone` lost the
                // race.
                if e.as_ref().is_unique_violation(Some("users_phone_key")) {
                    tracerr::new!(E::PhoneOccupied(user.phone.clone()))
                } else {
                    tracerr::map_from(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Phone`] is already occupied.
    #[display("`{_0}` phone is occupied")]
    PhoneOccupied(#[error(not(source))] user::Phone),
}
