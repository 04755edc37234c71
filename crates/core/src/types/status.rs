//! Authentication status as observed by the client.

use serde::{Deserialize, Serialize};

/// Where the client is in its sign-in lifecycle.
///
/// `Loading` is transient: it is reported while a session is being
/// established or restored and carries no cart semantics of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Loading,
    Authenticated,
}

impl AuthStatus {
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

impl std::str::FromStr for AuthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unauthenticated" => Ok(Self::Unauthenticated),
            "loading" => Ok(Self::Loading),
            "authenticated" => Ok(Self::Authenticated),
            _ => Err(format!("invalid auth status: {s}")),
        }
    }
}
