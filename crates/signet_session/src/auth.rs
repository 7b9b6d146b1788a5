//! Credentials of the signed-in administrator.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Administrative role granted at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full access, including team management.
    SuperAdmin,
    /// Regular administrator.
    Admin,
}

impl UserRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string that names no known [`UserRole`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(UserRole::SuperAdmin),
            "ADMIN" => Ok(UserRole::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Everything the shell remembers about the current login.
///
/// All fields are `None` when signed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    /// Bearer token sent with every API request.
    pub access_token: Option<String>,
    /// Token used to obtain a new access token.
    pub refresh_token: Option<String>,
    /// Role granted at login.
    pub role: Option<UserRole>,
    /// Display name of the administrator.
    pub username: Option<String>,
}

impl AuthState {
    /// Creates a signed-in state from the tokens returned by verification.
    #[must_use]
    pub fn signed_in(access_token: impl Into<String>, refresh_token: impl Into<String>, role: UserRole) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            role: Some(role),
            username: None,
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Returns `true` if an access token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_name() {
        for role in [UserRole::SuperAdmin, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
        }
        assert_eq!(
            "OWNER".parse::<UserRole>(),
            Err(UnknownRole("OWNER".to_string()))
        );
    }

    #[test]
    fn auth_state_uses_camel_case_keys() {
        let state = AuthState::signed_in("t1", "r1", UserRole::SuperAdmin).with_username("root");
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["accessToken"], "t1");
        assert_eq!(json["refreshToken"], "r1");
        assert_eq!(json["role"], "SUPER_ADMIN");
        assert_eq!(json["username"], "root");
    }

    #[test]
    fn default_state_is_signed_out() {
        assert!(!AuthState::default().is_authenticated());
    }
}
