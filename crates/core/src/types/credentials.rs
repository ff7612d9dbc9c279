//! Courier credentials stored per storefront.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HFD customer number ("client number") assigned to a merchant.
///
/// Only positive values are considered resolved; `0` is what the courier
/// treats as "no client", so it never reaches a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientNumber(i64);

/// Error parsing a client number from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientNumberError {
    #[error("client number is required")]
    Empty,
    #[error("client number must be a whole number, got '{0}'")]
    NotNumeric(String),
    #[error("client number must be positive, got {0}")]
    NotPositive(i64),
}

impl ClientNumber {
    /// Create a client number, rejecting zero and negative values.
    ///
    /// # Errors
    ///
    /// Returns `ClientNumberError::NotPositive` if `value <= 0`.
    pub const fn new(value: i64) -> Result<Self, ClientNumberError> {
        if value <= 0 {
            return Err(ClientNumberError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying numeric value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClientNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientNumber {
    type Err = ClientNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ClientNumberError::Empty);
        }
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| ClientNumberError::NotNumeric(trimmed.to_string()))?;
        Self::new(value)
    }
}

/// Courier credentials for one storefront.
///
/// Saved wholesale from the settings form; a later save replaces every field.
/// `Debug` output never includes the token.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// HFD API bearer token.
    pub courier_token: SecretString,
    /// HFD client number. `None` means the merchant has not resolved one yet.
    pub client_number: Option<ClientNumber>,
    /// Name printed as the orderer on the shipment.
    pub sender_name: Option<String>,
    /// Contact phone of the sender, shown on the settings page.
    pub sender_phone: Option<String>,
}

impl Credentials {
    /// Build credentials with a resolved client number and no sender details.
    #[must_use]
    pub const fn new(courier_token: SecretString, client_number: ClientNumber) -> Self {
        Self {
            courier_token,
            client_number: Some(client_number),
            sender_name: None,
            sender_phone: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_client_number_parses_trimmed_input() {
        let number: ClientNumber = " 9841 ".parse().unwrap();
        assert_eq!(number.as_i64(), 9841);
        assert_eq!(number.to_string(), "9841");
    }

    #[test]
    fn test_client_number_rejects_garbage() {
        assert_eq!("".parse::<ClientNumber>(), Err(ClientNumberError::Empty));
        assert_eq!(
            "98x".parse::<ClientNumber>(),
            Err(ClientNumberError::NotNumeric("98x".to_string()))
        );
        assert_eq!(
            "0".parse::<ClientNumber>(),
            Err(ClientNumberError::NotPositive(0))
        );
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials::new(
            SecretString::from("hfd-bearer-token-value"),
            ClientNumber::new(3399).unwrap(),
        );

        let debug_output = format!("{creds:?}");
        assert!(debug_output.contains("3399"));
        assert!(!debug_output.contains("hfd-bearer-token-value"));
        assert_eq!(creds.courier_token.expose_secret(), "hfd-bearer-token-value");
    }
}
