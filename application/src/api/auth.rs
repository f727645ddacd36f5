//! Authentication endpoints.

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user::{self, login_code, session},
};

use crate::{
    api::{self, Empty, Success},
    define_error, AsError, Error, Service,
};

/// Request body of the signup endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Name of the `User` to register.
    pub name: String,

    /// Phone number of the `User` to register.
    pub phone: String,

    /// Email address of the `User` to register.
    pub email: Option<String>,

    /// Indicator whether the `User` registers as a host.
    #[serde(default)]
    pub is_host: bool,
}

/// Request body of the login code endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CodeRequest {
    /// Phone number to issue a login code for.
    pub phone: String,
}

/// Request body of the session creation endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionRequest {
    /// Phone number a login code was issued for.
    pub phone: String,

    /// Login code delivered to the phone.
    pub code: String,
}

/// Opened session returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Access token authenticating subsequent requests.
    pub token: String,

    /// Authenticated `User`.
    pub user: api::user::User,

    /// Date and time when the session expires, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub expires_at: session::ExpirationDateTime,
}

impl From<command::create_user_session::Output> for Session {
    fn from(output: command::create_user_session::Output) -> Self {
        Self {
            token: output.token.to_string(),
            user: output.user.into(),
            expires_at: output.expires_at,
        }
    }
}

/// Registers a new `User` and opens a session for it.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - the provided fields are malformed;
/// - `PHONE_OCCUPIED` - a `User` with the provided phone is registered
///   already.
pub async fn signup(
    Extension(service): Extension<Service>,
    Json(req): Json<SignupRequest>,
) -> Result<(http::StatusCode, Json<Success<Session>>), Error> {
    let name = req
        .name
        .parse::<user::Name>()
        .map_err(|e| Error::invalid_input(&e))?;
    let phone = req
        .phone
        .parse::<user::Phone>()
        .map_err(|e| Error::invalid_input(&e))?;
    let email = req
        .email
        .map(|email| email.parse::<user::Email>())
        .transpose()
        .map_err(|e| Error::invalid_input(&e))?;
    let role = if req.is_host {
        user::Role::Host
    } else {
        user::Role::Renter
    };

    let user = service
        .execute(command::CreateUser {
            name,
            phone,
            email,
            role,
        })
        .await
        .map_err(AsError::into_error)?;
    let session = service
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(Success::new("User registered successfully", session.into())),
    ))
}

/// Issues a login code for the provided phone number.
///
/// The code is delivered out-of-band, so the response carries no payload.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - the provided phone number is malformed;
/// - `CODE_STILL_ACTIVE` - an unexpired code has been issued already.
pub async fn code(
    Extension(service): Extension<Service>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<Success<Empty>>, Error> {
    let phone = req
        .phone
        .parse::<user::Phone>()
        .map_err(|e| Error::invalid_input(&e))?;

    service
        .execute(command::RequestLoginCode { phone })
        .await
        .map(drop)
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new("Login code issued", Empty {})))
}

/// Opens a session by exchanging an issued login code.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - the provided fields are malformed;
/// - `PHONE_NOT_REGISTERED` - no `User` with the provided phone exists;
/// - `LOGIN_CODE_EXPIRED` - the issued code has expired;
/// - `WRONG_LOGIN_CODE` - the presented code doesn't match the issued one.
pub async fn session(
    Extension(service): Extension<Service>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<Success<Session>>, Error> {
    let phone = req
        .phone
        .parse::<user::Phone>()
        .map_err(|e| Error::invalid_input(&e))?;
    let code = req
        .code
        .parse::<login_code::Code>()
        .map_err(|e| Error::invalid_input(&e))?;

    let session = service
        .execute(command::CreateUserSession::ByLoginCode { phone, code })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new("Session opened successfully", session.into())))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PHONE_OCCUPIED"]
                #[status = BAD_REQUEST]
                #[message = "`User` with the provided phone is registered \
                             already"]
                PhoneOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PhoneOccupied(_) => Some(Error::PhoneOccupied.into()),
        }
    }
}

impl AsError for command::request_login_code::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CODE_STILL_ACTIVE"]
                #[status = BAD_REQUEST]
                #[message = "Provided phone already has an active login code"]
                CodeStillActive,
            }
        }

        match self {
            Self::CodeStillActive(_) => Some(Error::CodeStillActive.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_CODE_EXPIRED"]
                #[status = BAD_REQUEST]
                #[message = "Presented login code has expired"]
                LoginCodeExpired,

                #[code = "PHONE_NOT_REGISTERED"]
                #[status = NOT_FOUND]
                #[message = "`User` with the provided phone is not exists"]
                PhoneNotRegistered,

                #[code = "WRONG_LOGIN_CODE"]
                #[status = BAD_REQUEST]
                #[message = "Presented login code does not match the issued \
                             one"]
                WrongLoginCode,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::LoginCodeExpired => Some(Error::LoginCodeExpired.into()),
            Self::PhoneNotRegistered(_) => {
                Some(Error::PhoneNotRegistered.into())
            }
            Self::UserNotExists(_) => None,
            Self::WrongLoginCode => Some(Error::WrongLoginCode.into()),
        }
    }
}
