//! Login email for service accounts.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an email address is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain exactly one @ symbol")]
    BadAtSymbol,
    #[error("email must have a non-empty mailbox and domain")]
    MissingPart,
}

/// A normalized email address.
///
/// Surrounding whitespace is trimmed and the address is lowercased, so
/// `Staff@PVZ.ru` and `staff@pvz.ru` identify the same account.
///
/// ```
/// use pvz_core::Email;
///
/// let email = Email::parse("  Staff@PVZ.ru ").unwrap();
/// assert_eq!(email.as_str(), "staff@pvz.ru");
/// assert!(Email::parse("staff.pvz.ru").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] if the input is empty, too long, or not of
    /// the form `mailbox@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let mut parts = s.split('@');
        let (Some(mailbox), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::BadAtSymbol);
        };
        if mailbox.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(s.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse(" Moderator@Example.COM\n").unwrap();
        assert_eq!(email.as_str(), "moderator@example.com");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at"), Err(EmailError::BadAtSymbol));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::BadAtSymbol));
        assert_eq!(Email::parse("@pvz.ru"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("staff@"), Err(EmailError::MissingPart));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}@pvz.ru", "a".repeat(Email::MAX_LENGTH));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong { .. })));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Email>("\"staff@pvz.ru\"").is_ok());
        assert!(serde_json::from_str::<Email>("\"staff\"").is_err());
    }
}
