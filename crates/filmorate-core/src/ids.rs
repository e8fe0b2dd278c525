//! Opaque entity identifiers.
//!
//! Users, films and reviews are owned by the surrounding CRUD layer; the core
//! only ever treats their ids as keys. All ids are positive 64-bit integers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Validates a raw identifier received from outside the core.
            ///
            /// # Errors
            ///
            /// Returns `DomainError::InvalidArgument` if `raw` is not positive.
            pub fn parse(raw: i64) -> Result<Self, DomainError> {
                if raw <= 0 {
                    return Err(DomainError::InvalidArgument(format!(
                        "{} id must be positive, got {raw}",
                        $label
                    )));
                }
                Ok(Self(raw))
            }

            /// Returns the raw integer value.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user.
    UserId,
    "user"
);
entity_id!(
    /// Identifier of a catalog film.
    FilmId,
    "film"
);
entity_id!(
    /// Identifier of a film review.
    ReviewId,
    "review"
);
entity_id!(
    /// Identifier of a feed event, assigned by the event log.
    EventId,
    "event"
);
