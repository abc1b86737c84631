/// ID types for identity manager entities
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::idgen;

/// Prefix for generated user identifiers
pub const USER_ID_PREFIX: &str = "usr-";

/// Prefix for generated group identifiers
pub const GROUP_ID_PREFIX: &str = "grp-";

/// Prefix for generated membership binding identifiers
pub const BINDING_ID_PREFIX: &str = "ugb-";

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh identifier
            pub fn generate() -> Self {
                Self(idgen::new_id($prefix))
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the inner string
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl sqlx::Type<sqlx::Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as sqlx::Type<sqlx::Sqlite>>::type_info()
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Sqlite>>::encode_by_ref(&self.0, args)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $name {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                Ok(Self(s))
            }
        }
    };
}

define_id!(
    /// User identifier
    UserId,
    USER_ID_PREFIX
);

define_id!(
    /// Group identifier, also a segment of every descendant's group path
    GroupId,
    GROUP_ID_PREFIX
);

define_id!(
    /// User/group membership binding identifier
    BindingId,
    BINDING_ID_PREFIX
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_their_prefix() {
        assert!(UserId::generate().as_str().starts_with(USER_ID_PREFIX));
        assert!(GroupId::generate().as_str().starts_with(GROUP_ID_PREFIX));
        assert!(BindingId::generate().as_str().starts_with(BINDING_ID_PREFIX));
    }

    #[test]
    fn user_id_generation_creates_unique_ids() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn group_id_display() {
        let id = GroupId::new("grp-456");
        assert_eq!(format!("{}", id), "grp-456");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = UserId::new("usr-abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"usr-abc\"");
    }
}
