//! Account state of the sub-registrar program.
//!
//! Every account starts with a one-byte [`AccountTag`]. Each entity has several
//! historical layouts; the decoder for an entity is handed the layout to
//! target and fails cleanly on anything else. Records are immutable snapshots
//! rebuilt from bytes on every read.

use std::fmt;

use serde::Serialize;

use crate::codec::Reader;
use crate::error::{Result, SubRegistrarError};

pub mod mint_record;
pub mod registrar;
pub mod sub_record;

pub use mint_record::{MintRecord, MintRecordV1, MintRecordV2};
pub use registrar::{
    MemcmpFilter, Registrar, RegistrarFilter, RegistrarV1, RegistrarV2, RegistrarV3,
};
pub use sub_record::{SubRecord, SubRecordV1, SubRecordV2, SubRecordV3};

/// Leading discriminant of every program account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum AccountTag {
    Uninitialized = 0,
    Registrar = 1,
    ClosedRegistrar = 2,
    SubRecord = 3,
    ClosedSubRecord = 4,
    MintRecord = 5,
    RevokedSubRecord = 6,
}

impl AccountTag {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Registrar),
            2 => Some(Self::ClosedRegistrar),
            3 => Some(Self::SubRecord),
            4 => Some(Self::ClosedSubRecord),
            5 => Some(Self::MintRecord),
            6 => Some(Self::RevokedSubRecord),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Registrar => "Registrar",
            Self::ClosedRegistrar => "ClosedRegistrar",
            Self::SubRecord => "SubRecord",
            Self::ClosedSubRecord => "ClosedSubRecord",
            Self::MintRecord => "MintRecord",
            Self::RevokedSubRecord => "RevokedSubRecord",
        }
    }

    /// Tag of raw account bytes, without decoding the rest.
    pub fn peek(data: &[u8]) -> Result<Self> {
        let value = Reader::new(data).read_u8("tag")?;
        Self::from_u8(value).ok_or(SubRegistrarError::InvalidDiscriminant { field: "tag", value })
    }
}

impl fmt::Display for AccountTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the tag and checks it against `expected`.
pub(crate) fn expect_tag(r: &mut Reader<'_>, expected: AccountTag) -> Result<()> {
    let value = r.read_u8("tag")?;
    let found = AccountTag::from_u8(value)
        .ok_or(SubRegistrarError::InvalidDiscriminant { field: "tag", value })?;
    if found != expected {
        return Err(SubRegistrarError::UnexpectedAccountTag {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

/// Fails with `TruncatedInput` when `data` is shorter than the layout's fixed
/// prefix, before any field is read.
pub(crate) fn require_prefix(data: &[u8], entity: &'static str, prefix: usize) -> Result<()> {
    if data.len() < prefix {
        return Err(SubRegistrarError::truncated(entity, prefix, data.len()));
    }
    Ok(())
}

/// Base58 serialization of addresses for JSON output.
pub(crate) mod b58 {
    use serde::Serializer;
    use solana_program::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(key)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(key: &Option<Pubkey>, s: S) -> Result<S::Ok, S::Error> {
            match key {
                Some(k) => s.collect_str(k),
                None => s.serialize_none(),
            }
        }
    }
}
