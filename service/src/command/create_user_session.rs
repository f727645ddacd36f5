//! [`Command`] for creating a [`Session`].

use std::time::Duration;

use common::{
    operations::{By, Commit, Delete, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Phone};
use crate::{
    domain::{
        user::{self, login_code, session, LoginCode, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by a [`LoginCode`] issued for a [`Phone`].
    ByLoginCode {
        /// [`Phone`] the [`LoginCode`] was issued for.
        phone: user::Phone,

        /// [`login_code::Code`] presented by the [`User`].
        code: login_code::Code,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

impl CreateUserSession {
    /// [`Duration`] of [`Session`] expiration.
    const EXPIRATION_DURATION: Duration =
        Duration::from_secs(7 * 24 * 60 * 60);
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, Gw, Nf> Command<CreateUserSession> for Service<Db, Gw, Nf>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<LoginCode>, &'l user::Phone>>,
            Ok = Option<LoginCode>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Phone>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Delete<By<LoginCode, &'l user::Phone>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByLoginCode { phone, code } => {
                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                let stored = tx
                    .execute(Select(By::<Option<LoginCode>, _>::new(&phone)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::WrongLoginCode)
                    .map_err(tracerr::wrap!())?;
                if stored.is_expired(DateTime::now()) {
                    tx.execute(Delete(By::<LoginCode, _>::new(&phone)))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    tx.execute(Commit)
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))
                        .map(drop)?;
                    return Err(tracerr::new!(E::LoginCodeExpired));
                }
                if stored.code != code {
                    return Err(tracerr::new!(E::WrongLoginCode));
                }

                let user = tx
                    .execute(Select(By::<Option<User>, _>::new(&phone)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::PhoneNotRegistered(phone.clone()))
                    .map_err(tracerr::wrap!())?;

                // A `LoginCode` is single-use.
                tx.execute(Delete(By::<LoginCode, _>::new(&phone)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                tx.execute(Commit)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let expires_at = (DateTime::now() + Cmd::EXPIRATION_DURATION).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// Presented [`LoginCode`] has expired already.
    #[display("Login code has expired")]
    LoginCodeExpired,

    /// No [`User`] is registered with the provided [`Phone`].
    #[display("`{_0}` phone is not registered")]
    #[from(ignore)]
    PhoneNotRegistered(#[error(not(source))] user::Phone),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// Presented [`LoginCode`] is missing or doesn't match the issued one.
    #[display("Wrong login code")]
    WrongLoginCode,
}
