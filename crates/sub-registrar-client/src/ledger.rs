//! Collaborator boundary: everything that touches the network.
//!
//! The client is generic over three small traits so flows can run against the
//! RPC-backed [`RpcLedger`] or an in-memory fake in tests. Trait methods return
//! `anyhow::Result`; the client wraps failures in
//! [`crate::error::ClientError::Collaborator`].

use std::future::Future;

use anyhow::{anyhow, bail, Context, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use tracing::debug;

use crate::codec::Reader;
use crate::constants::NAME_RECORD_HEADER_LEN;
use crate::pda;
use crate::state::MemcmpFilter;

/// Raw account reads.
pub trait AccountSource: Sync {
    /// `None` when the account does not exist.
    fn get_account_bytes(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Every account owned by `program_id` matching all `filters`.
    fn get_accounts_by_filter(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> impl Future<Output = Result<Vec<(Pubkey, Vec<u8>)>>> + Send;

    fn account_exists(&self, address: &Pubkey) -> impl Future<Output = Result<bool>> + Send {
        async move {
            Ok(self
                .get_account_bytes(address)
                .await?
                .is_some_and(|data| !data.is_empty()))
        }
    }
}

/// Name-service reverse lookup: domain key to human-readable name.
pub trait ReverseLookup {
    fn reverse_lookup(&self, domain: &Pubkey) -> impl Future<Output = Result<String>> + Send;
}

/// Signs and submits instructions as one transaction.
pub trait TransactionSubmitter {
    /// Returns the transaction signature.
    fn submit(
        &self,
        instructions: &[Instruction],
        fee_payer: &Pubkey,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Collaborators backed by a JSON-RPC node.
pub struct RpcLedger {
    rpc: RpcClient,
    signer: Option<Keypair>,
}

impl RpcLedger {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed()),
            signer: None,
        }
    }

    /// Enables [`TransactionSubmitter::submit`] with `signer` as fee payer
    /// and sole signer.
    pub fn with_signer(mut self, signer: Keypair) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn signer_pubkey(&self) -> Option<Pubkey> {
        self.signer.as_ref().map(|s| s.pubkey())
    }

    pub fn url(&self) -> String {
        self.rpc.url()
    }
}

impl AccountSource for RpcLedger {
    async fn get_account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let account = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .with_context(|| format!("get account {address}"))?
            .value;
        Ok(account.map(|a| a.data))
    }

    async fn get_accounts_by_filter(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let filters = filters
            .iter()
            .map(|f| RpcFilterType::Memcmp(Memcmp::new_raw_bytes(f.offset, f.bytes.clone())))
            .collect();
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.rpc.commitment()),
                ..Default::default()
            },
            with_context: Some(false),
            ..Default::default()
        };
        let accounts = self
            .rpc
            .get_program_accounts_with_config(program_id, config)
            .await
            .with_context(|| format!("get program accounts of {program_id}"))?;
        debug!(program_id = %program_id, count = accounts.len(), "program accounts");
        Ok(accounts.into_iter().map(|(k, a)| (k, a.data)).collect())
    }
}

impl ReverseLookup for RpcLedger {
    async fn reverse_lookup(&self, domain: &Pubkey) -> Result<String> {
        let reverse = pda::derive_reverse_key(domain, None)?;
        let data = self
            .get_account_bytes(&reverse)
            .await?
            .ok_or_else(|| anyhow!("no reverse record for {domain}"))?;
        decode_reverse_record(&data)
    }
}

/// Name stored in a reverse-lookup record: a `u32`-prefixed string after the
/// name-record header.
pub fn decode_reverse_record(data: &[u8]) -> Result<String> {
    let body = data
        .get(NAME_RECORD_HEADER_LEN..)
        .ok_or_else(|| anyhow!("reverse record shorter than the name header"))?;
    Ok(Reader::new(body).read_string("reverse_name")?)
}

impl TransactionSubmitter for RpcLedger {
    async fn submit(&self, instructions: &[Instruction], fee_payer: &Pubkey) -> Result<String> {
        let Some(signer) = self.signer.as_ref() else {
            bail!("rpc ledger has no signer configured");
        };
        if signer.pubkey() != *fee_payer {
            bail!("fee payer {fee_payer} does not match signer {}", signer.pubkey());
        }
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .context("get latest blockhash")?;
        let mut tx = Transaction::new_with_payer(instructions, Some(fee_payer));
        // errors when an instruction needs a signer other than the fee payer
        tx.try_sign(&[signer], blockhash).context("sign transaction")?;
        let sig = self
            .rpc
            .send_and_confirm_transaction(&tx)
            .await
            .context("send transaction")?;
        Ok(sig.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Writer;

    #[test]
    fn reverse_record_name_follows_header() {
        let mut w = Writer::new();
        w.put_raw(&[7u8; NAME_RECORD_HEADER_LEN]).put_string("bonfida");
        assert_eq!(decode_reverse_record(&w.into_bytes()).unwrap(), "bonfida");
        assert!(decode_reverse_record(&[0u8; 10]).is_err());
    }
}
