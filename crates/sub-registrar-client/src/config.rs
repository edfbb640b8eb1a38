//! Program configuration.
//!
//! Every deriving and building call takes a `ProgramConfig` explicitly; there is
//! no process-wide program id. The config also pins which account and
//! instruction layout family the caller targets. Layouts are never sniffed
//! from account bytes at runtime.
//!
//! The crate does not read environment variables. Callers (the CLI) resolve
//! flags and env into a `ProgramConfig`.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::constants::{FEE_ACCOUNT_OWNER, MAINNET_PROGRAM_ID};

/// Which deployment of the program to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    /// Any other deployment (devnet, localnet, forks), identified by program id.
    Custom(Pubkey),
}

impl Network {
    pub fn program_id(&self) -> Pubkey {
        match self {
            Self::Mainnet => MAINNET_PROGRAM_ID,
            Self::Custom(id) => *id,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Custom(_) => "custom",
        }
    }
}

macro_rules! layout_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Parse a layout string (e.g. "v2").
            pub fn parse(s: &str) -> Result<Self> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    _ => bail!("unsupported {} layout: {s}", stringify!($name)),
                }
            }

            /// Canonical string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

layout_enum! {
    /// Registrar account layouts.
    ///
    /// - v1: no NFT gating fields
    /// - v2: adds `nft_gated_collection`, `max_nft_mint`, `allow_revoke`
    /// - v3: adds a trailing `revoke_expiry_delay`; keyed by domain only
    RegistrarLayout { V1 => "v1", V2 => "v2", V3 => "v3" }
}

layout_enum! {
    /// Sub-record account layouts.
    ///
    /// - v1: registrar and mint record only
    /// - v2: adds `sub_key` and `expiry_timestamp`
    /// - v3: adds a trailing `allocator`
    SubRecordLayout { V1 => "v1", V2 => "v2", V3 => "v3" }
}

layout_enum! {
    /// Mint record account layouts.
    ///
    /// - v1: count only
    /// - v2: count and mint
    MintRecordLayout { V1 => "v1", V2 => "v2" }
}

layout_enum! {
    /// Instruction payload layouts.
    ///
    /// - v1: register labels are sent bare
    /// - v2: register labels are prefixed with a null byte
    /// - v3: as v2, create-registrar carries `revoke_expiry_delay`
    InstructionLayout { V1 => "v1", V2 => "v2", V3 => "v3" }
}

impl Default for RegistrarLayout {
    fn default() -> Self {
        Self::V2
    }
}

impl Default for SubRecordLayout {
    fn default() -> Self {
        Self::V3
    }
}

impl Default for MintRecordLayout {
    fn default() -> Self {
        Self::V2
    }
}

impl Default for InstructionLayout {
    fn default() -> Self {
        Self::V2
    }
}

/// Per-deployment settings handed to every derive/decode/build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    pub network: Network,
    pub program_id: Pubkey,
    pub registrar_layout: RegistrarLayout,
    pub sub_record_layout: SubRecordLayout,
    pub mint_record_layout: MintRecordLayout,
    pub instruction_layout: InstructionLayout,
    /// Wallet whose token account collects the protocol fee on `register`.
    pub fee_owner: Pubkey,
}

impl ProgramConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            program_id: network.program_id(),
            registrar_layout: RegistrarLayout::default(),
            sub_record_layout: SubRecordLayout::default(),
            mint_record_layout: MintRecordLayout::default(),
            instruction_layout: InstructionLayout::default(),
            fee_owner: FEE_ACCOUNT_OWNER,
        }
    }

    pub fn mainnet() -> Self {
        Self::new(Network::Mainnet)
    }

    pub fn with_registrar_layout(mut self, layout: RegistrarLayout) -> Self {
        self.registrar_layout = layout;
        self
    }

    pub fn with_sub_record_layout(mut self, layout: SubRecordLayout) -> Self {
        self.sub_record_layout = layout;
        self
    }

    pub fn with_mint_record_layout(mut self, layout: MintRecordLayout) -> Self {
        self.mint_record_layout = layout;
        self
    }

    pub fn with_instruction_layout(mut self, layout: InstructionLayout) -> Self {
        self.instruction_layout = layout;
        self
    }

    pub fn with_fee_owner(mut self, fee_owner: Pubkey) -> Self {
        self.fee_owner = fee_owner;
        self
    }

    /// Registrars keyed by domain only (v3) must be created with the v3
    /// instruction layout, and vice versa.
    pub fn validate(&self) -> Result<()> {
        if self.program_id != self.network.program_id() {
            bail!(
                "program id {} does not match {} network",
                self.program_id,
                self.network.as_str()
            );
        }

        let v3_registrar = self.registrar_layout == RegistrarLayout::V3;
        let v3_instructions = self.instruction_layout == InstructionLayout::V3;
        if v3_registrar != v3_instructions {
            bail!(
                "registrar layout {} cannot be paired with instruction layout {}",
                self.registrar_layout,
                self.instruction_layout
            );
        }

        if self.registrar_layout == RegistrarLayout::V1
            && self.mint_record_layout != MintRecordLayout::V1
        {
            bail!("v1 registrars predate NFT gating; mint record layout must be v1");
        }

        Ok(())
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ProgramConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.program_id, MAINNET_PROGRAM_ID);
    }

    #[test]
    fn custom_network_carries_program_id() {
        let id = Pubkey::new_unique();
        let cfg = ProgramConfig::new(Network::Custom(id));
        assert_eq!(cfg.program_id, id);
        cfg.validate().unwrap();
    }

    #[test]
    fn mismatched_program_id_detected() {
        let mut cfg = ProgramConfig::mainnet();
        cfg.program_id = Pubkey::new_unique();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn v3_registrar_requires_v3_instructions() {
        let cfg = ProgramConfig::mainnet().with_registrar_layout(RegistrarLayout::V3);
        assert!(cfg.validate().is_err());
        cfg.with_instruction_layout(InstructionLayout::V3)
            .validate()
            .unwrap();
    }

    #[test]
    fn v1_registrar_requires_v1_mint_records() {
        let cfg = ProgramConfig::mainnet().with_registrar_layout(RegistrarLayout::V1);
        assert!(cfg.validate().is_err());
        cfg.with_mint_record_layout(MintRecordLayout::V1)
            .validate()
            .unwrap();
    }

    #[test]
    fn layouts_parse() {
        assert_eq!(RegistrarLayout::parse("v3").unwrap(), RegistrarLayout::V3);
        assert_eq!("v1".parse::<SubRecordLayout>().unwrap(), SubRecordLayout::V1);
        assert_eq!(InstructionLayout::V2.to_string(), "v2");
        let e = MintRecordLayout::parse("v3").unwrap_err();
        assert!(format!("{e:?}").contains("unsupported MintRecordLayout layout"));
    }
}
