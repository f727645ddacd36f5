//! [`LoginCode`] definitions.

use std::sync::LazyLock;

use common::{unit, DateTime, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rand::Rng as _;
use regex::Regex;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Short-lived numeric code allowing a [`User`] to log in.
///
/// At most one [`LoginCode`] is active per [`Phone`] at any moment, and a
/// successful login consumes it.
///
/// [`Phone`]: user::Phone
#[derive(Clone, Debug)]
pub struct LoginCode {
    /// [`Phone`] this [`LoginCode`] was issued for.
    ///
    /// [`Phone`]: user::Phone
    pub phone: user::Phone,

    /// [`Code`] to be presented by the [`User`].
    pub code: Code,

    /// [`DateTime`] when this [`LoginCode`] expires.
    pub expires_at: ExpirationDateTime,
}

impl LoginCode {
    /// Indicates whether this [`LoginCode`] is expired at the `now` moment.
    #[must_use]
    pub fn is_expired(&self, now: DateTime) -> bool {
        now > self.expires_at.coerce()
    }
}

/// Six-digit numeric code of a [`LoginCode`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Generates a new random [`Code`].
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen_range(100_000..=999_999).to_string())
    }

    /// Creates a new [`Code`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Code`] format.
        static REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^\d{6}$").expect("valid regex"));

        REGEX.is_match(code.as_ref())
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// [`DateTime`] when a [`LoginCode`] expires.
pub type ExpirationDateTime = DateTimeOf<(LoginCode, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use super::Code;

    #[test]
    fn generates_six_digits() {
        for _ in 0..32 {
            let code = Code::generate().to_string();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn rejects_malformed() {
        assert!(Code::new("12345").is_none());
        assert!(Code::new("1234567").is_none());
        assert!(Code::new("12a456").is_none());
        assert!(Code::new("123456").is_some());
    }
}
