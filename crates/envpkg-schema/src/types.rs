//! Newtype wrappers for manifest identifiers.
//!
//! All newtypes serialize/deserialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Package identifier, e.g. `hdcycles`.
    PackageName
);

string_newtype!(
    /// One constraint token of a variant tuple, e.g. `platform-windows` or `usd-20.11`.
    Token
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_display_and_as_ref() {
        let name = PackageName::new("hdcycles");
        assert_eq!(name.to_string(), "hdcycles");
        assert_eq!(name.as_str(), "hdcycles");
        assert_eq!(AsRef::<str>::as_ref(&name), "hdcycles");
    }

    #[test]
    fn token_serializes_as_plain_string() {
        let token = Token::new("usd-20.11");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"usd-20.11\"");
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn token_compares_with_str() {
        let token = Token::from("arch-x64");
        assert_eq!(token, "arch-x64");
        assert_eq!(token.into_inner(), "arch-x64");
    }
}
