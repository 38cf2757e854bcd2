//! Identity types for the checkpoint
//!
//! Credentials are opaque hex strings read off a card. Two credentials are
//! the same when their first `prefix_len` characters match ignoring case.

use std::fmt;
use std::str::FromStr;

use crate::{CheckpointError, CheckpointResult};

/// Number of identifier characters compared in the reference configuration
pub const DEFAULT_ID_PREFIX_LEN: usize = 8;

/// Credential identity as presented by a lane reader
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn new(raw: impl Into<String>) -> Self {
        CredentialId(raw.into())
    }

    /// Raw identifier exactly as presented
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comparison key: first `prefix_len` characters, uppercased
    pub fn key(&self, prefix_len: usize) -> String {
        self.0
            .trim()
            .chars()
            .take(prefix_len)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Check that the identifier is non-empty hex
    pub fn validate(&self) -> CheckpointResult<()> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CheckpointError::InvalidCredentialId(self.0.clone()));
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.0)
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CredentialId {
    fn from(raw: &str) -> Self {
        CredentialId::new(raw)
    }
}

impl From<String> for CredentialId {
    fn from(raw: String) -> Self {
        CredentialId::new(raw)
    }
}

/// Slot - stable index of one configured credential
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SlotIndex(pub usize);

impl SlotIndex {
    #[inline]
    pub fn new(index: usize) -> Self {
        SlotIndex(index)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scan direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lane {
    Entry,
    Exit,
}

impl Lane {
    /// Lanes in polling priority order
    pub const ALL: [Lane; 2] = [Lane::Entry, Lane::Exit];

    /// Upper-case label used in log and diagnostic lines
    pub fn label(self) -> &'static str {
        match self {
            Lane::Entry => "ENTRY",
            Lane::Exit => "EXIT",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Lane {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" | "enter" | "in" => Ok(Lane::Entry),
            "exit" | "out" => Ok(Lane::Exit),
            other => Err(CheckpointError::UnknownLane(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_truncates_and_uppercases() {
        let id = CredentialId::new("5ada9c80xx");
        assert_eq!(id.key(DEFAULT_ID_PREFIX_LEN), "5ADA9C80");
    }

    #[test]
    fn test_key_shorter_than_prefix() {
        let id = CredentialId::new("abc");
        assert_eq!(id.key(8), "ABC");
    }

    #[test]
    fn test_validate_rejects_non_hex() {
        assert!(CredentialId::new("5ADA9C80").validate().is_ok());
        assert!(CredentialId::new("").validate().is_err());
        assert!(CredentialId::new("ZZZZ").validate().is_err());
    }

    #[test]
    fn test_lane_parse() {
        assert_eq!("in".parse::<Lane>().unwrap(), Lane::Entry);
        assert_eq!("EXIT".parse::<Lane>().unwrap(), Lane::Exit);
        assert_eq!(
            "Sideways".parse::<Lane>(),
            Err(CheckpointError::UnknownLane("sideways".into()))
        );
    }

    #[test]
    fn test_from_owned_string() {
        let raw = format!("{:08X}", 0x5ADA_9C80u32);
        let id = CredentialId::from(raw);
        assert_eq!(id.as_str(), "5ADA9C80");
        assert_eq!(id, CredentialId::from("5ADA9C80"));
    }
}
