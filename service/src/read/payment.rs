//! [`Payment`]-related read definitions.

use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::{Booking, Payment};

/// Number of [`Payment`]s relinked to the [`Booking`]s they paid for.
///
/// A [`Payment`] needs relinking when its [`Booking`] was persisted, but the
/// backward link on the [`Payment`] itself was lost.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct Relinked(u64);

impl Relinked {
    /// Indicates whether no [`Payment`]s were relinked at all.
    #[must_use]
    pub fn is_zero(self) -> bool {
        u64::from(self) == 0
    }
}
