//! Async client for the sub-registrar program.
//!
//! The client reads and decodes state through its ledger, derives the
//! addresses each operation needs, and hands everything to the pure builders
//! in [`crate::instruction`]. Every call goes to the ledger; nothing is
//! cached between calls.

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use tracing::{debug, info};

use crate::config::ProgramConfig;
use crate::constants::TOKEN_PROGRAM_ID;
use crate::error::{ClientError, ClientResult, SubRegistrarError};
use crate::instruction::{
    self, AdminRevokeAccounts, CloseRegistrarAccounts, CreateRegistrarAccounts,
    CreateRegistrarParams, DeleteSubrecordAccounts, EditRegistrarAccounts, EditRegistrarParams,
    NftOwnerRevokeAccounts, NftProof, RegisterAccounts, UnregisterAccounts,
};
use crate::ledger::{AccountSource, ReverseLookup, TransactionSubmitter};
use crate::pda;
use crate::schedule::PriceQuote;
use crate::state::{AccountTag, MintRecord, Registrar, RegistrarFilter, SubRecord};

#[derive(Debug, Clone)]
pub struct SubRegistrarClient<L> {
    config: ProgramConfig,
    ledger: L,
}

/// A subdomain resolved against its registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubdomain {
    pub sub_domain: Pubkey,
    pub sub_record: Pubkey,
}

fn collaborator(e: anyhow::Error) -> ClientError {
    ClientError::Collaborator(e)
}

fn quote(state: &Registrar, label: &str) -> ClientResult<PriceQuote> {
    let label = instruction::validate_label(label)?;
    state
        .price_schedule()
        .quote(label)
        .ok_or_else(|| SubRegistrarError::schedule("registrar has no price tiers").into())
}

impl<L> SubRegistrarClient<L> {
    pub fn new(config: ProgramConfig, ledger: L) -> Self {
        Self { config, ledger }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// No reads needed: the registrar address is derived from the domain and
    /// the new authority.
    pub fn create_registrar(
        &self,
        accounts: &CreateRegistrarAccounts,
        params: &CreateRegistrarParams,
    ) -> ClientResult<Vec<Instruction>> {
        Ok(vec![instruction::create_registrar(
            &self.config,
            accounts,
            params,
        )?])
    }
}

impl<L: AccountSource> SubRegistrarClient<L> {
    /// Account data, or `AccountNotFound` when absent or empty.
    async fn fetch_bytes(&self, address: &Pubkey) -> ClientResult<Vec<u8>> {
        match self
            .ledger
            .get_account_bytes(address)
            .await
            .map_err(collaborator)?
        {
            Some(data) if !data.is_empty() => Ok(data),
            _ => Err(SubRegistrarError::AccountNotFound { address: *address }.into()),
        }
    }

    pub async fn fetch_registrar(&self, address: &Pubkey) -> ClientResult<Registrar> {
        let data = self.fetch_bytes(address).await?;
        let registrar = Registrar::decode(&data, self.config.registrar_layout)?;
        debug!(registrar = %address, layout = %registrar.layout(), "fetched registrar");
        Ok(registrar)
    }

    pub async fn fetch_sub_record(&self, address: &Pubkey) -> ClientResult<SubRecord> {
        let data = self.fetch_bytes(address).await?;
        Ok(SubRecord::decode(&data, self.config.sub_record_layout)?)
    }

    /// Like [`Self::fetch_sub_record`] but also accepts revoked records.
    pub async fn fetch_sub_record_any(&self, address: &Pubkey) -> ClientResult<(AccountTag, SubRecord)> {
        let data = self.fetch_bytes(address).await?;
        let tag = match AccountTag::peek(&data)? {
            AccountTag::RevokedSubRecord => AccountTag::RevokedSubRecord,
            _ => AccountTag::SubRecord,
        };
        let record = SubRecord::decode_as(&data, self.config.sub_record_layout, tag)?;
        Ok((tag, record))
    }

    pub async fn fetch_mint_record(&self, address: &Pubkey) -> ClientResult<MintRecord> {
        let data = self.fetch_bytes(address).await?;
        Ok(MintRecord::decode(&data, self.config.mint_record_layout)?)
    }

    /// Registrars matching `filter`, in ledger order. Fails on the first
    /// account that does not decode under the configured layout.
    pub async fn find_registrars(
        &self,
        filter: RegistrarFilter,
    ) -> ClientResult<Vec<(Pubkey, Registrar)>> {
        let hits = self
            .ledger
            .get_accounts_by_filter(&self.config.program_id, &filter.filters())
            .await
            .map_err(collaborator)?;
        debug!(?filter, count = hits.len(), "registrar scan");
        hits.into_iter()
            .map(|(key, data)| {
                Registrar::decode(&data, self.config.registrar_layout)
                    .map(|r| (key, r))
                    .map_err(ClientError::from)
            })
            .collect()
    }

    pub async fn edit_registrar(
        &self,
        registrar: &Pubkey,
        params: &EditRegistrarParams,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let accounts = EditRegistrarAccounts {
            registrar: *registrar,
            authority: *state.authority(),
        };
        Ok(vec![instruction::edit_registrar(
            &self.config,
            &accounts,
            params,
        )?])
    }

    pub async fn close_registrar(
        &self,
        registrar: &Pubkey,
        new_domain_owner: &Pubkey,
        lamports_target: &Pubkey,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let accounts = CloseRegistrarAccounts {
            registrar: *registrar,
            new_domain_owner: *new_domain_owner,
            lamports_target: *lamports_target,
        };
        Ok(vec![instruction::close_registrar(
            &self.config,
            &accounts,
            &state,
        )?])
    }

    /// Paid registration. When the fee owner's token account for the
    /// registrar mint does not exist yet, an idempotent creation instruction
    /// paid by the buyer is placed first.
    pub async fn register(
        &self,
        registrar: &Pubkey,
        buyer: &Pubkey,
        label: &str,
        nft: Option<NftProof>,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let quote = quote(&state, label)?;
        debug!(%label, price = quote.price, protocol_fee = quote.protocol_fee, "registration price");

        if let (Some(nft), Some(max)) = (&nft, state.max_nft_mint()) {
            let mint_record = nft.mint_record(&self.config, registrar)?;
            match self.fetch_mint_record(&mint_record).await {
                Ok(record) if record.is_at_cap(max) => {
                    return Err(SubRegistrarError::gating(format!(
                        "NFT mint {} already used {} of {max} time(s)",
                        nft.nft_mint,
                        record.count()
                    ))
                    .into())
                }
                Ok(_) => {}
                Err(ClientError::Core(SubRegistrarError::AccountNotFound { .. })) => {}
                Err(e) => return Err(e),
            }
        }

        let mut ixs = Vec::with_capacity(2);
        let fee_ata = pda::derive_associated_token_account(&self.config.fee_owner, state.mint())?;
        let fee_ata_exists = self
            .ledger
            .account_exists(&fee_ata)
            .await
            .map_err(collaborator)?;
        if !fee_ata_exists {
            info!(account = %fee_ata, "fee account missing, prepending creation");
            ixs.push(create_associated_token_account_idempotent(
                buyer,
                &self.config.fee_owner,
                state.mint(),
                &TOKEN_PROGRAM_ID,
            ));
        }

        let accounts = RegisterAccounts {
            registrar: *registrar,
            buyer: *buyer,
            nft,
        };
        ixs.push(instruction::register(&self.config, &accounts, &state, label)?);
        Ok(ixs)
    }

    /// Price the program will charge for `label` under `registrar`.
    pub async fn quote_registration(&self, registrar: &Pubkey, label: &str) -> ClientResult<PriceQuote> {
        let state = self.fetch_registrar(registrar).await?;
        quote(&state, label)
    }

    pub async fn admin_register(
        &self,
        registrar: &Pubkey,
        label: &str,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        Ok(vec![instruction::admin_register(
            &self.config,
            registrar,
            &state,
            label,
        )?])
    }
}

impl<L: AccountSource + ReverseLookup> SubRegistrarClient<L> {
    /// Resolves `label` under the registrar's domain by name: the domain key
    /// is reverse-looked-up and `label.<parent>` is derived.
    pub async fn resolve_subdomain(
        &self,
        state: &Registrar,
        label: &str,
    ) -> ClientResult<ResolvedSubdomain> {
        let parent = self
            .ledger
            .reverse_lookup(state.domain())
            .await
            .map_err(collaborator)?;
        let label = instruction::validate_label(label)?;
        let key = pda::derive_domain_key(&format!("{label}.{parent}"))?;
        let (sub_record, _) = pda::derive_sub_record(&self.config, &key.pubkey)?;
        debug!(%label, %parent, sub_domain = %key.pubkey, "resolved subdomain");
        Ok(ResolvedSubdomain {
            sub_domain: key.pubkey,
            sub_record,
        })
    }

    pub async fn unregister(
        &self,
        registrar: &Pubkey,
        label: &str,
        owner: &Pubkey,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let sub = self.resolve_subdomain(&state, label).await?;
        let sub_record = self.fetch_sub_record(&sub.sub_record).await?;
        let accounts = UnregisterAccounts {
            registrar: *registrar,
            sub_domain: sub.sub_domain,
            owner: *owner,
        };
        Ok(vec![instruction::unregister(
            &self.config,
            &accounts,
            &state,
            &sub_record,
        )?])
    }

    /// Works on live and revoked sub-records.
    pub async fn delete_subrecord(
        &self,
        registrar: &Pubkey,
        label: &str,
        lamports_target: &Pubkey,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let sub = self.resolve_subdomain(&state, label).await?;
        let (tag, sub_record) = self.fetch_sub_record_any(&sub.sub_record).await?;
        debug!(sub_record = %sub.sub_record, %tag, "deleting sub-record");
        let accounts = DeleteSubrecordAccounts {
            registrar: *registrar,
            sub_domain: sub.sub_domain,
            lamports_target: *lamports_target,
        };
        Ok(vec![instruction::delete_subrecord(
            &self.config,
            &accounts,
            &state,
            &sub_record,
        )?])
    }

    pub async fn admin_revoke(
        &self,
        registrar: &Pubkey,
        label: &str,
        sub_owner: &Pubkey,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let sub = self.resolve_subdomain(&state, label).await?;
        let sub_record = self.fetch_sub_record(&sub.sub_record).await?;
        let accounts = AdminRevokeAccounts {
            registrar: *registrar,
            sub_domain: sub.sub_domain,
            sub_owner: *sub_owner,
        };
        Ok(vec![instruction::admin_revoke(
            &self.config,
            &accounts,
            &state,
            &sub_record,
        )?])
    }

    pub async fn nft_owner_revoke(
        &self,
        registrar: &Pubkey,
        label: &str,
        sub_owner: &Pubkey,
        nft_owner: &Pubkey,
        nft: NftProof,
    ) -> ClientResult<Vec<Instruction>> {
        let state = self.fetch_registrar(registrar).await?;
        let sub = self.resolve_subdomain(&state, label).await?;
        let sub_record = self.fetch_sub_record(&sub.sub_record).await?;
        let accounts = NftOwnerRevokeAccounts {
            registrar: *registrar,
            sub_domain: sub.sub_domain,
            sub_owner: *sub_owner,
            nft_owner: *nft_owner,
            nft,
        };
        Ok(vec![instruction::nft_owner_revoke(
            &self.config,
            &accounts,
            &state,
            &sub_record,
        )?])
    }
}

impl<L: TransactionSubmitter> SubRegistrarClient<L> {
    /// Submits `instructions` as one transaction and returns its signature.
    pub async fn send(&self, instructions: &[Instruction], fee_payer: &Pubkey) -> ClientResult<String> {
        let sig = self
            .ledger
            .submit(instructions, fee_payer)
            .await
            .map_err(collaborator)?;
        info!(signature = %sig, count = instructions.len(), "transaction confirmed");
        Ok(sig)
    }
}
