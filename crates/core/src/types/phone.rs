//! Contact phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains a character outside digits, `-`, `(`, `)` and spaces.
    #[error("phone number contains an invalid character: {0:?}")]
    InvalidCharacter(char),
    /// The input has too few digits.
    #[error("phone number must contain at least {min} digits")]
    TooFewDigits {
        /// Minimum number of digits.
        min: usize,
    },
}

/// A contact phone number.
///
/// Accepts the loose formats shoppers type into a checkout form: digits
/// separated by dashes, parentheses or spaces. The original formatting is
/// kept; only the digit count is checked.
///
/// ## Examples
///
/// ```
/// use shopline_core::Phone;
///
/// assert!(Phone::parse("0912-345-678").is_ok());
/// assert!(Phone::parse("(02) 2345 6789").is_ok());
///
/// assert!(Phone::parse("1234567").is_err());   // only 7 digits
/// assert!(Phone::parse("+886912345678").is_err()); // '+' not allowed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits in a phone number.
    pub const MIN_DIGITS: usize = 8;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other than
    /// digits, `-`, `(`, `)` and spaces, or has fewer than 8 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(c, '-' | '(' | ')') || c.is_whitespace()))
        {
            return Err(PhoneError::InvalidCharacter(bad));
        }

        if s.chars().filter(char::is_ascii_digit).count() < Self::MIN_DIGITS {
            return Err(PhoneError::TooFewDigits {
                min: Self::MIN_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as typed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns only the digits of the phone number.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_phones() {
        assert!(Phone::parse("0912345678").is_ok());
        assert!(Phone::parse("0912-345-678").is_ok());
        assert!(Phone::parse("(02) 2345-6789").is_ok());
        assert!(Phone::parse("12345678").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Phone::parse("+886912345678"),
            Err(PhoneError::InvalidCharacter('+'))
        );
        assert_eq!(
            Phone::parse("0912abc678"),
            Err(PhoneError::InvalidCharacter('a'))
        );
    }

    #[test]
    fn test_parse_too_few_digits() {
        assert_eq!(
            Phone::parse("123-4567"),
            Err(PhoneError::TooFewDigits { min: 8 })
        );
        assert_eq!(
            Phone::parse("(  ) - -"),
            Err(PhoneError::TooFewDigits { min: 8 })
        );
    }

    #[test]
    fn test_digits() {
        let phone = Phone::parse("(02) 2345-6789").unwrap();
        assert_eq!(phone.digits(), "0223456789");
        assert_eq!(phone.as_str(), "(02) 2345-6789");
    }
}
