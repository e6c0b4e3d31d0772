//! Stable fingerprints used as resolution cache keys

use sha2::{Digest, Sha256};
use std::fmt;

use crate::holder::{Address, Member};
use crate::node::NodeKind;

/// SHA256 fingerprint of a normalized reference target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from string parts.
    ///
    /// Parts are separated by a NUL byte so that `("ab", "c")` and
    /// `("a", "bc")` never collide.
    pub fn from_parts(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                hasher.update([0u8]);
            }
            hasher.update(part.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Fingerprint of a normalized address and the metadata kind requested from it
    pub fn for_target(address: &Address, kind: NodeKind) -> Self {
        let (method, property) = match &address.member {
            Member::None => ("", ""),
            Member::Method(m) => (m.as_str(), ""),
            Member::Property(p) => ("", p.as_str()),
        };
        Self::from_parts(&[&address.type_name, method, property, kind.as_str()])
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
