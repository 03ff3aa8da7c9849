//! Local email validation performed before any account lookup.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::mailbox::{MailboxError, parse_mailbox};

const MIN_LENGTH: usize = 6;
const MAX_LENGTH: usize = 150;
const MAX_LOCAL_LENGTH: usize = 64;

/// Dotted labels of letters, digits, `-` and `_`, ending in a 2 to 63
/// character label. Applied to the lower-cased or punycoded domain.
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[_\-a-z0-9]+\.)*([\-a-z0-9]+\.)[\-a-z0-9]{2,63}$").unwrap()
});

/// Validate an email address the way the API expects it.
///
/// Checks run in order and stop at the first failure: overall length,
/// mailbox syntax, a single `@`, local part length, no spaces in the local
/// part, then the domain. Internationalized domains are accepted when their
/// punycode form passes the same domain pattern.
///
/// # Examples
/// ```
/// use hibp_client::{ValidationError, validate_email};
///
/// assert!(validate_email("info@example.com").is_ok());
/// assert_eq!(validate_email("a@b.c"), Err(ValidationError::InvalidLength));
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let length = email.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(reject(email, ValidationError::InvalidLength));
    }

    match parse_mailbox(email) {
        Ok(mailbox) => {
            tracing::trace!(address = %mailbox.address, name = ?mailbox.name, "parsed mailbox");
        }
        Err(MailboxError::LocalPartWhitespace) => {
            return Err(reject(email, ValidationError::InvalidLocalPart));
        }
        Err(_) => return Err(reject(email, ValidationError::MalformedAddress)),
    }

    // The parser may accept an `@` inside a quoted local part.
    let parts: Vec<&str> = email.split('@').collect();
    let [local, domain] = parts.as_slice() else {
        return Err(reject(email, ValidationError::MalformedAddress));
    };

    if local.chars().count() > MAX_LOCAL_LENGTH {
        return Err(reject(email, ValidationError::LocalPartTooLong));
    }
    if local.contains(' ') {
        return Err(reject(email, ValidationError::InvalidLocalPart));
    }
    if !is_valid_domain(domain) {
        return Err(reject(email, ValidationError::InvalidDomain));
    }

    Ok(())
}

fn is_valid_domain(domain: &str) -> bool {
    if DOMAIN_RE.is_match(&domain.to_lowercase()) {
        return true;
    }
    match idna::domain_to_ascii(domain) {
        Ok(ascii) => DOMAIN_RE.is_match(&ascii),
        Err(_) => false,
    }
}

fn reject(email: &str, err: ValidationError) -> ValidationError {
    tracing::trace!(%email, reason = %err, "email rejected");
    err
}
