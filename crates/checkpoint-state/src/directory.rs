//! Credential directory - the fixed roster loaded at startup

use std::collections::HashMap;

use checkpoint_core::{CheckpointError, CheckpointResult, CredentialId, SlotIndex};

/// One configured credential
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub id: CredentialId,
    pub name: String,
    pub slot: SlotIndex,
}

/// Immutable mapping from credential identifier to display name and slot
#[derive(Clone, Debug)]
pub struct CredentialDirectory {
    credentials: Vec<Credential>,
    /// Truncated, uppercased key -> slot
    index: HashMap<String, SlotIndex>,
    prefix_len: usize,
}

impl CredentialDirectory {
    /// Build the directory. Slots are assigned in the given order.
    ///
    /// Rejects an empty roster, non-hex identifiers, and identifiers that
    /// collide once truncated to `prefix_len` characters.
    pub fn new<I, N>(entries: I, prefix_len: usize) -> CheckpointResult<Self>
    where
        I: IntoIterator<Item = (CredentialId, N)>,
        N: Into<String>,
    {
        if prefix_len == 0 {
            return Err(CheckpointError::InvalidConfig(
                "credential prefix length must be positive".into(),
            ));
        }

        let mut credentials = Vec::new();
        let mut index = HashMap::new();

        for (i, (id, name)) in entries.into_iter().enumerate() {
            id.validate()?;
            let slot = SlotIndex::new(i);
            let key = id.key(prefix_len);
            if let Some(&first) = index.get(&key) {
                return Err(CheckpointError::DuplicateCredential {
                    id: key,
                    first,
                    second: slot,
                });
            }
            index.insert(key, slot);
            credentials.push(Credential {
                id,
                name: name.into(),
                slot,
            });
        }

        if credentials.is_empty() {
            return Err(CheckpointError::EmptyDirectory);
        }

        Ok(CredentialDirectory {
            credentials,
            index,
            prefix_len,
        })
    }

    /// Resolve a presented identifier to its slot.
    /// Only the first `prefix_len` characters are compared, ignoring case.
    pub fn resolve(&self, id: &CredentialId) -> Option<SlotIndex> {
        self.index.get(&id.key(self.prefix_len)).copied()
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&Credential> {
        self.credentials.get(slot.get())
    }

    /// Display name for a slot
    pub fn name(&self, slot: SlotIndex) -> Option<&str> {
        self.get(slot).map(|c| c.name.as_str())
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Iterate in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> CredentialDirectory {
        CredentialDirectory::new(
            vec![
                (CredentialId::new("5ADA9C80"), "Alice"),
                (CredentialId::new("A3F2B71C"), "Bob"),
            ],
            8,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_case_insensitive_prefix() {
        let dir = roster();
        assert_eq!(dir.resolve(&"5ada9c80xx".into()), Some(SlotIndex(0)));
        assert_eq!(dir.resolve(&"a3f2b71c".into()), Some(SlotIndex(1)));
        assert_eq!(dir.name(SlotIndex(1)), Some("Bob"));
    }

    #[test]
    fn test_resolve_unknown() {
        let dir = roster();
        assert_eq!(dir.resolve(&"DEADBEEF".into()), None);
        // Shorter than the prefix does not match a longer configured id
        assert_eq!(dir.resolve(&"5ADA9C".into()), None);
    }

    #[test]
    fn test_duplicate_under_truncation_rejected() {
        let result = CredentialDirectory::new(
            vec![
                (CredentialId::new("5ADA9C80AA"), "Alice"),
                (CredentialId::new("5ada9c80bb"), "Mallory"),
            ],
            8,
        );
        assert_eq!(
            result.unwrap_err(),
            CheckpointError::DuplicateCredential {
                id: "5ADA9C80".into(),
                first: SlotIndex(0),
                second: SlotIndex(1),
            }
        );
    }

    #[test]
    fn test_invalid_rosters() {
        let empty: Vec<(CredentialId, &str)> = Vec::new();
        assert_eq!(
            CredentialDirectory::new(empty, 8).unwrap_err(),
            CheckpointError::EmptyDirectory
        );

        let non_hex = CredentialDirectory::new(vec![(CredentialId::new("NOTHEX!!"), "X")], 8);
        assert!(matches!(non_hex, Err(CheckpointError::InvalidCredentialId(_))));

        let zero_prefix = CredentialDirectory::new(vec![(CredentialId::new("AB"), "X")], 0);
        assert!(matches!(zero_prefix, Err(CheckpointError::InvalidConfig(_))));
    }
}
