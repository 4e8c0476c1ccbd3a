use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Longest address we accept. Bech32m and c32check addresses are well under this.
pub const MAX_ADDRESS_LEN: usize = 128;

/// An opaque wallet address handed over by the wallet-connection layer.
///
/// The core never derives or interprets addresses; it only guarantees the
/// value is safe to place in a URL path segment. ASCII letters, digits and
/// the unreserved `.`, `-`, `_` are accepted, which admits contract
/// principals such as `SP….my-vault`. Construction goes through
/// [`WalletAddress::parse`], so every `WalletAddress` in the program is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and wrap an address. Surrounding whitespace is trimmed.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::AddressInvalid("address is empty".into()));
        }
        if trimmed.len() > MAX_ADDRESS_LEN {
            return Err(CoreError::AddressInvalid(format!(
                "address is longer than {MAX_ADDRESS_LEN} characters"
            )));
        }
        if let Some(c) = trimmed.chars().find(|&c| !is_address_char(c)) {
            return Err(CoreError::AddressInvalid(format!(
                "address contains invalid character {c:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
