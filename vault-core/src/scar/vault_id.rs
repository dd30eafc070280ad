use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two cooperating vaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VaultId {
    A,
    B,
}

impl VaultId {
    /// Both vaults, in lock order.
    pub const ALL: [VaultId; 2] = [VaultId::A, VaultId::B];

    /// The other vault of the pair.
    pub fn sibling(self) -> VaultId {
        match self {
            VaultId::A => VaultId::B,
            VaultId::B => VaultId::A,
        }
    }

    /// Stable array index (A = 0, B = 1).
    pub fn index(self) -> usize {
        match self {
            VaultId::A => 0,
            VaultId::B => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VaultId::A => "A",
            VaultId::B => "B",
        }
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VaultId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(VaultId::A),
            "B" | "b" => Ok(VaultId::B),
            other => Err(format!("unknown vault id: {other}")),
        }
    }
}
