//! Account username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a control character (newline, tab, NUL, ...).
    #[error("username must not contain control characters")]
    ControlCharacter,
}

/// An account username.
///
/// Usernames are unique per deployment and immutable once the account exists.
/// Matching is exact: no trimming or case folding is applied.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - No control characters
///
/// ## Examples
///
/// ```
/// use pinmark_core::Username;
///
/// assert!(Username::parse("alice").is_ok());
/// assert!(Username::parse("Bob Smith").is_ok());
///
/// assert!(Username::parse("").is_err());
/// assert!(Username::parse("tab\tname").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Maximum length of a username, in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains a control character.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_control) {
            return Err(UsernameError::ControlCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_usernames() {
        assert!(Username::parse("alice").is_ok());
        assert!(Username::parse("a").is_ok());
        assert!(Username::parse("user.name+tag").is_ok());
        assert!(Username::parse("名字").is_ok());
        assert!(Username::parse(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Username::parse(&"x".repeat(65)),
            Err(UsernameError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 64 three-byte characters is still 64 characters
        assert!(Username::parse(&"名".repeat(64)).is_ok());
    }

    #[test]
    fn test_parse_control_characters() {
        assert_eq!(
            Username::parse("new\nline"),
            Err(UsernameError::ControlCharacter)
        );
        assert_eq!(
            Username::parse("nul\0"),
            Err(UsernameError::ControlCharacter)
        );
    }

    #[test]
    fn test_no_normalisation() {
        let username = Username::parse(" Alice ").unwrap();
        assert_eq!(username.as_str(), " Alice ");
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Username = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(parsed.as_str(), "alice");

        assert!(serde_json::from_str::<Username>("\"\"").is_err());
    }
}
