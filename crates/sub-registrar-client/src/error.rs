//! Error types for the sub-registrar client.
//!
//! `SubRegistrarError` covers everything the codec, deriver, decoders and
//! builders can report. None of these are transient: they mean the bytes on
//! the ledger are not what the caller said they would be, or the caller
//! supplied parameters that do not fit the registrar's state.
//!
//! Failures raised by external collaborators (RPC, reverse lookup, transaction
//! submission) are kept out of this enum and only appear in [`ClientError`].

use solana_program::pubkey::Pubkey;
use thiserror::Error;

/// Core error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubRegistrarError {
    /// Fewer bytes remain than the field requires.
    #[error("truncated input reading {field}: needed {needed} byte(s), {remaining} remaining")]
    TruncatedInput {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A presence flag, boolean or tag byte is outside its recognized set.
    #[error("invalid discriminant {value} for {field}")]
    InvalidDiscriminant { field: &'static str, value: u8 },

    /// A string payload is not valid UTF-8.
    #[error("invalid utf-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    /// The account's leading tag is recognized but belongs to another entity.
    #[error("unexpected account tag: expected {expected}, found {found}")]
    UnexpectedAccountTag { expected: String, found: String },

    /// The ledger holds no data at this address.
    #[error("account not found: {address}")]
    AccountNotFound { address: Pubkey },

    /// A price schedule byte region does not split into whole tiers.
    #[error("malformed price schedule: {reason}")]
    MalformedSchedule { reason: String },

    /// None of the 256 bump candidates produced an off-curve address.
    #[error("address derivation exhausted for seed {seed:?}")]
    DerivationExhausted { seed: String },

    /// A subdomain label or domain name the name service cannot address.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: &'static str },

    /// Registrar gating and the supplied or stored NFT data disagree.
    #[error("inconsistent gating state: {reason}")]
    InconsistentGatingState { reason: String },
}

impl SubRegistrarError {
    pub(crate) fn truncated(field: &'static str, needed: usize, remaining: usize) -> Self {
        Self::TruncatedInput {
            field,
            needed,
            remaining,
        }
    }

    pub(crate) fn gating(reason: impl Into<String>) -> Self {
        Self::InconsistentGatingState {
            reason: reason.into(),
        }
    }

    pub(crate) fn label(label: &str, reason: &'static str) -> Self {
        Self::InvalidLabel {
            label: label.to_string(),
            reason,
        }
    }

    pub(crate) fn schedule(reason: impl Into<String>) -> Self {
        Self::MalformedSchedule {
            reason: reason.into(),
        }
    }

    /// Stable short name of the error kind, used by the CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TruncatedInput { .. } => "truncated_input",
            Self::InvalidDiscriminant { .. } => "invalid_discriminant",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
            Self::UnexpectedAccountTag { .. } => "unexpected_account_tag",
            Self::AccountNotFound { .. } => "account_not_found",
            Self::MalformedSchedule { .. } => "malformed_schedule",
            Self::DerivationExhausted { .. } => "derivation_exhausted",
            Self::InvalidLabel { .. } => "invalid_label",
            Self::InconsistentGatingState { .. } => "inconsistent_gating_state",
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, SubRegistrarError>;

/// Error returned by the async client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] SubRegistrarError),

    /// A collaborator call failed (network, RPC, signing, confirmation).
    #[error("collaborator error: {0}")]
    Collaborator(#[source] anyhow::Error),
}

impl ClientError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(e) => e.kind(),
            Self::Collaborator(_) => "collaborator",
        }
    }

    /// Returns the core error, if this is one.
    pub fn as_core(&self) -> Option<&SubRegistrarError> {
        match self {
            Self::Core(e) => Some(e),
            Self::Collaborator(_) => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
