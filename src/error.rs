use std::path::PathBuf;

use thiserror::Error;

/// Problems with the content files.  Always fatal at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file}: `{key}` refers to unknown {kind} `{name}`")]
    UnknownReference {
        file: String,
        key: String,
        kind: &'static str,
        name: String,
    },

    #[error("{file}: `{key}` {reason}")]
    InvalidValue {
        file: String,
        key: String,
        reason: String,
    },
}

/// Runtime failures the caller may choose to recover from.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("unknown {kind} `{name}`")]
    UnknownIdentifier { kind: &'static str, name: String },
}

impl GameError {
    pub fn unknown(kind: &'static str, name: &str) -> Self {
        Self::UnknownIdentifier {
            kind,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no free consumable slot")]
pub struct InventoryFull;

/// Why a shop purchase did not go through.  Nothing is spent in any of these
/// cases.
#[derive(Debug, Error, PartialEq)]
pub enum PurchaseError {
    #[error("not enough astral shards: costs {cost}, have {balance}")]
    InsufficientShards { cost: u32, balance: u32 },

    #[error(transparent)]
    NoSpace(#[from] InventoryFull),

    #[error("no shop item at position {0}")]
    NoSuchItem(usize),

    #[error(transparent)]
    Lookup(#[from] GameError),
}
