//! `User`-related endpoints.

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain,
};
use uuid::Uuid;

use crate::{
    api::{Empty, Success},
    AsError, Auth, Error, Service,
};

/// A `User` of the platform.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique ID of this `User`.
    pub id: Uuid,

    /// Name of this `User`.
    pub name: String,

    /// Phone number of this `User`.
    pub phone: String,

    /// Email address of this `User`, if provided.
    pub email: Option<String>,

    /// Role of this `User` on the platform.
    pub role: String,

    /// Date and time when this `User` registered, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: domain::user::CreationDateTime,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            name: user.name.to_string(),
            phone: user.phone.to_string(),
            email: user.email.map(|e| e.to_string()),
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

/// Payload carrying a single [`User`].
#[derive(Debug, Serialize)]
pub struct Profile {
    /// The `User` itself.
    pub user: User,
}

/// Request body of the device registration endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRequest {
    /// Push notifications token of the device.
    pub device_token: String,
}

/// Returns the profile of the authenticated `User`.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn me(auth: Auth) -> Json<Success<Profile>> {
    Json(Success::new(
        "User profile fetched successfully",
        Profile {
            user: auth.user.into(),
        },
    ))
}

/// Registers the push notifications device of the authenticated `User`.
///
/// Subsequent registrations overwrite the previous device.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - the provided device token is malformed.
pub async fn device(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(req): Json<DeviceRequest>,
) -> Result<Json<Success<Empty>>, Error> {
    let device_token = req
        .device_token
        .parse::<domain::user::DeviceToken>()
        .map_err(|e| Error::invalid_input(&e))?;

    service
        .execute(command::RegisterDevice {
            user_id: auth.user.id,
            device_token,
        })
        .await
        .map(drop)
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new("Device registered successfully", Empty {})))
}

impl AsError for command::register_device::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
        }
    }
}
