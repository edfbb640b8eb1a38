//! sub-registrar-client
//!
//! Client-side model of the sub-registrar program, which sells or hands out
//! subdomains of a name-service domain under rules stored in a registrar
//! account.
//!
//! It includes:
//! - byte codec primitives and the price schedule model
//! - PDA derivation for program, name-service and token accounts
//! - decoders for every historical registrar, sub-record and mint record layout
//! - instruction payloads and one pure builder per program operation
//! - an async client that reads state through pluggable collaborators
//!
//! The program id and layout family are always taken from a [`ProgramConfig`]
//! passed in by the caller.

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod pda;
pub mod registrar_client;
pub mod schedule;
pub mod state;

pub use config::{
    InstructionLayout, MintRecordLayout, Network, ProgramConfig, RegistrarLayout, SubRecordLayout,
};
pub use constants::*;
pub use error::{ClientError, ClientResult, SubRegistrarError};
pub use instruction::{NftProof, RegistrarInstruction};
pub use ledger::{AccountSource, ReverseLookup, RpcLedger, TransactionSubmitter};
pub use registrar_client::{ResolvedSubdomain, SubRegistrarClient};
pub use schedule::{Price, PriceQuote, Schedule};
pub use state::{AccountTag, MemcmpFilter, MintRecord, Registrar, RegistrarFilter, SubRecord};
