//! One builder per program operation.
//!
//! Builders are pure: they derive the program addresses they need, check the
//! supplied state for gating consistency, and return a ready `Instruction`.
//! Reading state from the ledger is the caller's job (see
//! [`crate::registrar_client`]).

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_program::{system_program, sysvar};

use super::{
    validate_label, AccountsBuilder, CreateRegistrarParams, EditRegistrarParams,
    RegistrarInstruction,
};
use crate::config::ProgramConfig;
use crate::constants::{
    NAME_AUCTIONING_PROGRAM_ID, NAME_PROGRAM_ID, REVERSE_LOOKUP_CLASS, ROOT_DOMAIN_ACCOUNT,
    TOKEN_PROGRAM_ID,
};
use crate::error::{Result, SubRegistrarError};
use crate::pda;
use crate::state::{Registrar, SubRecord};

/// NFT presented for a gated registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftProof {
    /// Token account holding the NFT.
    pub nft_account: Pubkey,
    pub nft_mint: Pubkey,
}

impl NftProof {
    pub fn metadata(&self) -> Result<Pubkey> {
        pda::derive_metadata(&self.nft_mint)
    }

    pub fn mint_record(&self, config: &ProgramConfig, registrar: &Pubkey) -> Result<Pubkey> {
        pda::derive_mint_record(config, registrar, &self.nft_mint).map(|(k, _)| k)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CreateRegistrarAccounts {
    pub domain: Pubkey,
    pub domain_owner: Pubkey,
    pub fee_payer: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct EditRegistrarAccounts {
    pub registrar: Pubkey,
    pub authority: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct CloseRegistrarAccounts {
    pub registrar: Pubkey,
    /// Receives the parent domain back.
    pub new_domain_owner: Pubkey,
    /// Receives the registrar's rent.
    pub lamports_target: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct RegisterAccounts {
    pub registrar: Pubkey,
    pub buyer: Pubkey,
    /// Required iff the registrar is NFT gated.
    pub nft: Option<NftProof>,
}

#[derive(Debug, Clone, Copy)]
pub struct UnregisterAccounts {
    pub registrar: Pubkey,
    pub sub_domain: Pubkey,
    pub owner: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteSubrecordAccounts {
    pub registrar: Pubkey,
    pub sub_domain: Pubkey,
    pub lamports_target: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct AdminRevokeAccounts {
    pub registrar: Pubkey,
    pub sub_domain: Pubkey,
    pub sub_owner: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct NftOwnerRevokeAccounts {
    pub registrar: Pubkey,
    pub sub_domain: Pubkey,
    pub sub_owner: Pubkey,
    pub nft_owner: Pubkey,
    pub nft: NftProof,
}

fn instruction(
    config: &ProgramConfig,
    ix: RegistrarInstruction,
    accounts: AccountsBuilder,
) -> Instruction {
    Instruction {
        program_id: config.program_id,
        accounts: accounts.build(),
        data: ix.pack(config.instruction_layout),
    }
}

/// A gated registrar only issues sub-records that point at a mint record.
/// The reverse does not hold: gating can be switched off after issuance, and
/// the stored mint record is then still passed along.
fn check_sub_record_gating(state: &Registrar, sub_record: &SubRecord) -> Result<()> {
    if state.is_nft_gated() && sub_record.mint_record().is_none() {
        return Err(SubRegistrarError::gating(
            "registrar is NFT gated but the sub-record has no mint record",
        ));
    }
    Ok(())
}

pub fn create_registrar(
    config: &ProgramConfig,
    accounts: &CreateRegistrarAccounts,
    params: &CreateRegistrarParams,
) -> Result<Instruction> {
    if !params.price_schedule.is_sorted() {
        return Err(SubRegistrarError::schedule(
            "tiers must be sorted by ascending length",
        ));
    }
    let (registrar, _) = pda::derive_registrar(config, &accounts.domain, &params.authority)?;
    let metas = AccountsBuilder::new()
        .readonly(&system_program::ID)
        .writable(&registrar)
        .writable(&accounts.domain)
        .signer(&accounts.domain_owner)
        .signer(&accounts.fee_payer)
        .readonly(&NAME_PROGRAM_ID);
    Ok(instruction(
        config,
        RegistrarInstruction::CreateRegistrar(params.clone()),
        metas,
    ))
}

pub fn edit_registrar(
    config: &ProgramConfig,
    accounts: &EditRegistrarAccounts,
    params: &EditRegistrarParams,
) -> Result<Instruction> {
    let metas = AccountsBuilder::new()
        .readonly(&system_program::ID)
        .signer(&accounts.authority)
        .writable(&accounts.registrar);
    Ok(instruction(
        config,
        RegistrarInstruction::EditRegistrar(params.clone()),
        metas,
    ))
}

/// Closes the registrar and hands the parent domain to `new_domain_owner`.
/// The registrar authority signs.
pub fn close_registrar(
    config: &ProgramConfig,
    accounts: &CloseRegistrarAccounts,
    state: &Registrar,
) -> Result<Instruction> {
    let metas = AccountsBuilder::new()
        .readonly(&system_program::ID)
        .writable(&accounts.registrar)
        .writable(state.domain())
        .readonly(&accounts.new_domain_owner)
        .writable(&accounts.lamports_target)
        .signer(state.authority())
        .readonly(&NAME_PROGRAM_ID);
    Ok(instruction(config, RegistrarInstruction::CloseRegistrar, metas))
}

/// Paid registration of `label` under the registrar's domain.
///
/// Fees are drawn from the buyer's associated token account for the
/// registrar mint; the protocol share goes to the fee owner's associated
/// token account, which must exist (see
/// [`crate::registrar_client::SubRegistrarClient::register`]).
pub fn register(
    config: &ProgramConfig,
    accounts: &RegisterAccounts,
    state: &Registrar,
    label: &str,
) -> Result<Instruction> {
    let label = validate_label(label)?;
    match (state.is_nft_gated(), accounts.nft.is_some()) {
        (true, false) => {
            return Err(SubRegistrarError::gating(
                "registrar is NFT gated but no NFT accounts were supplied",
            ))
        }
        (false, true) => {
            return Err(SubRegistrarError::gating(
                "NFT accounts supplied for a registrar that is not NFT gated",
            ))
        }
        _ => {}
    }

    let subdomain = pda::pdas_for_subdomain(config, label, state.domain())?;
    let fee_source = pda::derive_associated_token_account(&accounts.buyer, state.mint())?;
    let protocol_fee = pda::derive_associated_token_account(&config.fee_owner, state.mint())?;

    let (nft_account, nft_metadata, nft_mint_record) = match &accounts.nft {
        Some(nft) => (
            Some(nft.nft_account),
            Some(nft.metadata()?),
            Some(nft.mint_record(config, &accounts.registrar)?),
        ),
        None => (None, None, None),
    };

    let metas = AccountsBuilder::new()
        .readonly(&system_program::ID)
        .readonly(&TOKEN_PROGRAM_ID)
        .readonly(&NAME_PROGRAM_ID)
        .readonly(&sysvar::rent::ID)
        .readonly(&NAME_AUCTIONING_PROGRAM_ID)
        .readonly(&ROOT_DOMAIN_ACCOUNT)
        .readonly(&REVERSE_LOOKUP_CLASS)
        .writable(state.fee_account())
        .writable(&fee_source)
        .writable(&accounts.registrar)
        .writable(state.domain())
        .writable(&subdomain.sub_domain)
        .writable(&subdomain.sub_reverse)
        .signer(&accounts.buyer)
        .writable(&protocol_fee)
        .writable(&subdomain.sub_record.0)
        .readonly_if_present(nft_account.as_ref())
        .readonly_if_present(nft_metadata.as_ref())
        .writable_if_present(nft_mint_record.as_ref());
    Ok(instruction(config, RegistrarInstruction::register(label), metas))
}

/// Free registration by the registrar authority.
pub fn admin_register(
    config: &ProgramConfig,
    registrar: &Pubkey,
    state: &Registrar,
    label: &str,
) -> Result<Instruction> {
    let label = validate_label(label)?;
    let subdomain = pda::pdas_for_subdomain(config, label, state.domain())?;
    let metas = AccountsBuilder::new()
        .readonly(&system_program::ID)
        .readonly(&TOKEN_PROGRAM_ID)
        .readonly(&NAME_PROGRAM_ID)
        .readonly(&sysvar::rent::ID)
        .readonly(&NAME_AUCTIONING_PROGRAM_ID)
        .readonly(&ROOT_DOMAIN_ACCOUNT)
        .readonly(&REVERSE_LOOKUP_CLASS)
        .writable(registrar)
        .writable(state.domain())
        .writable(&subdomain.sub_domain)
        .writable(&subdomain.sub_reverse)
        .writable(&subdomain.sub_record.0)
        .signer(state.authority());
    Ok(instruction(
        config,
        RegistrarInstruction::admin_register(label),
        metas,
    ))
}

/// Subdomain owner gives the subdomain back.
pub fn unregister(
    config: &ProgramConfig,
    accounts: &UnregisterAccounts,
    state: &Registrar,
    sub_record: &SubRecord,
) -> Result<Instruction> {
    check_sub_record_gating(state, sub_record)?;
    let (sub_record_key, _) = pda::derive_sub_record(config, &accounts.sub_domain)?;
    let metas = AccountsBuilder::new()
        .readonly(&system_program::ID)
        .readonly(&NAME_PROGRAM_ID)
        .writable(&accounts.registrar)
        .writable(&accounts.sub_domain)
        .writable(&sub_record_key)
        .signer(&accounts.owner)
        .writable_if_present(sub_record.mint_record());
    Ok(instruction(config, RegistrarInstruction::Unregister, metas))
}

/// Removes a sub-record whose subdomain no longer exists or was revoked.
pub fn delete_subrecord(
    config: &ProgramConfig,
    accounts: &DeleteSubrecordAccounts,
    state: &Registrar,
    sub_record: &SubRecord,
) -> Result<Instruction> {
    check_sub_record_gating(state, sub_record)?;
    let (sub_record_key, _) = pda::derive_sub_record(config, &accounts.sub_domain)?;
    let metas = AccountsBuilder::new()
        .writable(&accounts.registrar)
        .writable(&accounts.sub_domain)
        .writable(&sub_record_key)
        .writable(&accounts.lamports_target)
        .writable_if_present(sub_record.mint_record());
    Ok(instruction(config, RegistrarInstruction::DeleteSubrecord, metas))
}

/// Registrar authority revokes a subdomain.
pub fn admin_revoke(
    config: &ProgramConfig,
    accounts: &AdminRevokeAccounts,
    state: &Registrar,
    sub_record: &SubRecord,
) -> Result<Instruction> {
    check_sub_record_gating(state, sub_record)?;
    let (sub_record_key, _) = pda::derive_sub_record(config, &accounts.sub_domain)?;
    let metas = AccountsBuilder::new()
        .writable(&accounts.registrar)
        .writable(&accounts.sub_domain)
        .writable(&sub_record_key)
        .readonly(&accounts.sub_owner)
        .readonly(state.domain())
        .signer(state.authority())
        .readonly(&Pubkey::default())
        .readonly(&NAME_PROGRAM_ID)
        .writable_if_present(sub_record.mint_record());
    Ok(instruction(config, RegistrarInstruction::AdminRevoke, metas))
}

/// Current holder of the NFT a subdomain was registered with revokes it.
pub fn nft_owner_revoke(
    config: &ProgramConfig,
    accounts: &NftOwnerRevokeAccounts,
    state: &Registrar,
    sub_record: &SubRecord,
) -> Result<Instruction> {
    if !state.is_nft_gated() {
        return Err(SubRegistrarError::gating(
            "nft owner revoke requires an NFT gated registrar",
        ));
    }
    check_sub_record_gating(state, sub_record)?;

    let mint_record = accounts.nft.mint_record(config, &accounts.registrar)?;
    if sub_record.mint_record() != Some(&mint_record) {
        return Err(SubRegistrarError::gating(format!(
            "sub-record was not registered with NFT mint {}",
            accounts.nft.nft_mint
        )));
    }

    let (sub_record_key, _) = pda::derive_sub_record(config, &accounts.sub_domain)?;
    let metas = AccountsBuilder::new()
        .writable(&accounts.registrar)
        .writable(&accounts.sub_domain)
        .writable(&sub_record_key)
        .readonly(&accounts.sub_owner)
        .readonly(state.domain())
        .signer(&accounts.nft_owner)
        .readonly(&accounts.nft.nft_account)
        .readonly(&accounts.nft.metadata()?)
        .writable(&mint_record)
        .readonly(&Pubkey::default())
        .readonly(&NAME_PROGRAM_ID);
    Ok(instruction(config, RegistrarInstruction::NftOwnerRevoke, metas))
}
