//! [`Command`] for requesting a [`LoginCode`].

use std::time::Duration;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::{self, login_code, LoginCode},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting a [`LoginCode`].
///
/// The issued [`login_code::Code`] is handed over to an out-of-band delivery
/// channel, so is only logged here.
#[derive(Clone, Debug, From)]
pub struct RequestLoginCode {
    /// [`user::Phone`] to issue a [`LoginCode`] for.
    pub phone: user::Phone,
}

impl RequestLoginCode {
    /// [`Duration`] of [`LoginCode`] expiration.
    const EXPIRATION_DURATION: Duration = Duration::from_secs(60);
}

impl<Db, Gw, Nf> Command<RequestLoginCode> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<LoginCode>, &'l user::Phone>>,
            Ok = Option<LoginCode>,
            Err = Traced<database::Error>,
        > + Database<Insert<LoginCode>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = LoginCode;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestLoginCode,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestLoginCode { phone } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = tx
            .execute(Select(By::<Option<LoginCode>, _>::new(&phone)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(code) = existing {
            if !code.is_expired(DateTime::now()) {
                return Err(tracerr::new!(E::CodeStillActive(phone)));
            }
        }

        let login_code = LoginCode {
            phone,
            code: login_code::Code::generate(),
            expires_at: (DateTime::now()
                + RequestLoginCode::EXPIRATION_DURATION)
                .coerce(),
        };

        tx.execute(Insert(login_code.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // The log record is the only delivery channel wired in.
        log::info!(
            "`LoginCode` for `{}` issued: {}",
            login_code.phone,
            login_code.code,
        );

        Ok(login_code)
    }
}

/// Error of [`RequestLoginCode`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Unexpired [`LoginCode`] has been issued already.
    #[display("`{_0}` phone already has an active login code")]
    #[from(ignore)]
    CodeStillActive(#[error(not(source))] user::Phone),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
