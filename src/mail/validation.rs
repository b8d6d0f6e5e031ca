//! Email address validation.

use crate::error::{ReportError, Result};
use lettre::Address;

/// Parses an address, failing with a validation error.
pub fn parse_address(email: &str) -> Result<Address> {
    email
        .trim()
        .parse::<Address>()
        .map_err(|e| ReportError::validation(format!("Invalid email address '{email}': {e}")))
}

pub fn is_valid_address(email: &str) -> bool {
    parse_address(email).is_ok()
}

/// Splits recipients into parsed valid addresses and the rejected originals.
pub fn partition_recipients(emails: &[String]) -> (Vec<Address>, Vec<String>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for email in emails {
        match parse_address(email) {
            Ok(address) => valid.push(address),
            Err(_) => rejected.push(email.clone()),
        }
    }

    (valid, rejected)
}
