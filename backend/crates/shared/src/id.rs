//! Opaque Identifier Types
//!
//! Type-safe wrappers for the random identifiers this gateway hands out
//! (authorization codes, access tokens). They carry no meaning beyond being
//! unguessable; their only use is as a lookup key.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// Generic typed identifier
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type CodeId = Id<markers::AuthorizationCode>;
/// let code = CodeId::new();
/// assert_eq!(code.to_string().len(), 36);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: Uuid,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Fresh random identifier (UUID v4, 122 random bits)
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4(),
            _marker: PhantomData,
        }
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Identifiers are bearer secrets; never print them in full
        let s = self.value.to_string();
        write!(f, "Id({}…)", &s[..8])
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

/// Marker types for the identifier kinds
pub mod markers {
    /// Code handed to the OAuth client after the provider callback
    #[derive(PartialEq, Eq)]
    pub struct AuthorizationCode;

    /// Bearer token handed to the OAuth client by the token endpoint
    #[derive(PartialEq, Eq)]
    pub struct AccessToken;
}

pub type AuthorizationCodeId = Id<markers::AuthorizationCode>;
pub type AccessTokenId = Id<markers::AccessToken>;
