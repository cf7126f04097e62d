//! Representation of a validated email address

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    net::IpAddr,
    str::FromStr,
};

use email_address::EmailAddress;
use idna::domain_to_ascii;

use crate::Text;

/// A syntactically valid email address (_user@domain.tld_).
///
/// Mail fields hold free text, which may be anything a user typed. An `Address` is what
/// survives validation: the [`AddressSanitizer`](super::AddressSanitizer) keeps a token
/// only if it parses as an `Address`, and the catch-all address is configured as one.
///
/// # Examples
///
/// ```
/// use mailroom::Address;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let address = "dest1@domain.com".parse::<Address>()?;
/// assert_eq!(address.user(), "dest1");
/// assert_eq!(address.domain(), "domain.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Address {
    /// Complete address
    serialized: String,
    /// Index into `serialized` before the '@'
    at_start: usize,
}

impl Address {
    /// Gets the user portion of the `Address`.
    pub fn user(&self) -> &str {
        &self.serialized[..self.at_start]
    }

    /// Gets the domain portion of the `Address`.
    pub fn domain(&self) -> &str {
        &self.serialized[self.at_start + 1..]
    }

    /// Returns true if `candidate` is a valid addr-spec.
    ///
    /// ```
    /// use mailroom::Address;
    ///
    /// assert!(Address::is_valid("abc/cde@mail.com"));
    /// assert!(!Address::is_valid("not even an address"));
    /// ```
    pub fn is_valid(candidate: &str) -> bool {
        check_address(candidate).is_ok()
    }

    fn check_user(user: &str) -> Result<(), AddressError> {
        if EmailAddress::is_valid_local_part(user) {
            Ok(())
        } else {
            Err(AddressError::InvalidUser)
        }
    }

    fn check_domain(domain: &str) -> Result<(), AddressError> {
        Address::check_domain_ascii(domain).or_else(|_| {
            domain_to_ascii(domain)
                .map_err(|_| AddressError::InvalidDomain)
                .and_then(|domain| Address::check_domain_ascii(&domain))
        })
    }

    fn check_domain_ascii(domain: &str) -> Result<(), AddressError> {
        if EmailAddress::is_valid_domain(domain) {
            return Ok(());
        }

        // IP literal, only accepted between brackets
        if let Some(ip) = domain.strip_prefix('[').and_then(|ip| ip.strip_suffix(']')) {
            if ip.parse::<IpAddr>().is_ok() {
                return Ok(());
            }
        }

        Err(AddressError::InvalidDomain)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.serialized)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(val: &str) -> Result<Self, AddressError> {
        let at_start = check_address(val)?;
        Ok(Address {
            serialized: val.into(),
            at_start,
        })
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(serialized: String) -> Result<Self, AddressError> {
        let at_start = check_address(&serialized)?;
        Ok(Address {
            serialized,
            at_start,
        })
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.serialized
    }
}

impl From<Address> for Text {
    fn from(address: Address) -> Self {
        Text::from(address.serialized)
    }
}

impl From<&Address> for Text {
    fn from(address: &Address) -> Self {
        Text::from(address.serialized.as_str())
    }
}

fn check_address(val: &str) -> Result<usize, AddressError> {
    let mut parts = val.rsplitn(2, '@');
    let domain = parts.next().ok_or(AddressError::MissingParts)?;
    let user = parts.next().ok_or(AddressError::MissingParts)?;

    Address::check_user(user)?;
    Address::check_domain(domain)?;
    Ok(user.len())
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
/// Errors in email addresses parsing
pub enum AddressError {
    /// Missing domain or user
    MissingParts,
    /// Invalid email user
    InvalidUser,
    /// Invalid email domain
    InvalidDomain,
}

impl Error for AddressError {}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AddressError::MissingParts => f.write_str("Missing domain or user"),
            AddressError::InvalidUser => f.write_str("Invalid email user"),
            AddressError::InvalidDomain => f.write_str("Invalid email domain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_address() {
        let addr = Address::from_str("dest1@domain.com").unwrap();
        assert_eq!(addr.user(), "dest1");
        assert_eq!(addr.domain(), "domain.com");
        assert_eq!(addr.to_string(), "dest1@domain.com");
    }

    #[test]
    fn slash_in_local_part() {
        assert!(Address::is_valid("abc/cde@mail.com"));
    }

    #[test]
    fn ip_literal() {
        let addr = Address::from_str("something@[2606:4700:4700::1111]").unwrap();
        assert_eq!(addr.domain(), "[2606:4700:4700::1111]");
        assert!(Address::is_valid("something@[1.1.1.1]"));
    }

    #[test]
    fn internationalized_domain() {
        assert!(Address::is_valid("user@bücher.example"));
    }

    #[test]
    fn rejects_free_text() {
        assert_eq!(
            Address::from_str("notaemail"),
            Err(AddressError::MissingParts)
        );
        assert_eq!(
            Address::from_str("a b@domain.com"),
            Err(AddressError::InvalidUser)
        );
        assert_eq!(
            Address::from_str("user@"),
            Err(AddressError::InvalidDomain)
        );
    }

    #[test]
    fn rejects_overlong_parts() {
        let user = "a".repeat(100);
        assert!(!Address::is_valid(&format!("{user}@domain.com")));
    }
}
