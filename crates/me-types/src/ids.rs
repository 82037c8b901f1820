use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform snowflake ids. Each kind gets its own newtype so a channel id can
/// never be passed where a message id is expected.
macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(MessageId);
snowflake!(ChannelId);
snowflake!(
    /// A guild on the platform. Called a server everywhere in this workspace.
    ServerId
);
snowflake!(UserId);
snowflake!(RoleId);
