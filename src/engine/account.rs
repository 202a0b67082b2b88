//! Ledger identifiers for accounts and fungible tokens.
//!
//! Both are opaque address strings. They are kept as distinct newtypes so
//! that an account can never be passed where a token is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! address_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an address string.
            #[must_use]
            pub fn new(address: impl Into<String>) -> Self {
                Self(address.into())
            }

            /// Returns the address as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(address: &str) -> Self {
                Self(address.to_string())
            }
        }

        impl From<String> for $name {
            fn from(address: String) -> Self {
                Self(address)
            }
        }
    };
}

address_newtype!(
    /// Address of a ledger account: a user, a pool, or a beneficiary.
    AccountId
);

address_newtype!(
    /// Address of a fungible token tracked by the asset ledger.
    TokenId
);
