use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an account string.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("account must start with 'm'")]
    InvalidPrefix,
    #[error("account must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("account payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("account payload must be exactly 32 bytes")]
    InvalidPayloadLength,
}

/// Number of raw bytes in an account identifier.
pub const ACCOUNT_BYTES: usize = 32;
/// Expected string length of an encoded account (prefix + 64 hex chars).
pub const ACCOUNT_STRING_LENGTH: usize = 1 + ACCOUNT_BYTES * 2;

/// Identity of a buyer, recipient or role holder.
///
/// Encoded as `m` followed by the hex of the 32 raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(pub [u8; ACCOUNT_BYTES]);

impl AccountId {
    /// Derive a deterministic account from a human readable handle (e.g. `@alice`).
    pub fn from_handle(handle: &str) -> Self {
        Self(*blake3::hash(handle.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_BYTES] {
        &self.0
    }

    pub fn encode(&self) -> String {
        let mut encoded = String::with_capacity(ACCOUNT_STRING_LENGTH);
        encoded.push('m');
        encoded.push_str(&hex::encode(self.0));
        encoded
    }

    pub fn decode(account: &str) -> Result<Self, AccountError> {
        let payload = account
            .strip_prefix('m')
            .ok_or(AccountError::InvalidPrefix)?;

        if account.len() != ACCOUNT_STRING_LENGTH {
            return Err(AccountError::InvalidLength {
                expected: ACCOUNT_STRING_LENGTH,
                actual: account.len(),
            });
        }

        let bytes: [u8; ACCOUNT_BYTES] = hex::decode(payload)?
            .try_into()
            .map_err(|_| AccountError::InvalidPayloadLength)?;

        Ok(Self(bytes))
    }
}

impl From<[u8; ACCOUNT_BYTES]> for AccountId {
    fn from(value: [u8; ACCOUNT_BYTES]) -> Self {
        Self(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.encode()
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decode(&value)
    }
}

impl FromStr for AccountId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// Short form keeps log lines readable.
impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(m{}..)", hex::encode(&self.0[..4]))
    }
}
