use anyhow::Result;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use sub_registrar_client::{AccountTag, MintRecord, RpcLedger, SubRecord, SubRegistrarClient};

use crate::output;

#[derive(Debug, Serialize)]
pub struct SubRecordOut {
    pub address: String,
    pub tag: AccountTag,
    pub sub_record: SubRecord,
}

#[derive(Debug, Serialize)]
pub struct MintRecordOut {
    pub address: String,
    pub mint_record: MintRecord,
}

/// Revoked sub-records are shown too; `tag` tells them apart.
pub async fn sub_record(client: SubRegistrarClient<RpcLedger>, address: &Pubkey) -> Result<()> {
    let (tag, sub_record) = client.fetch_sub_record_any(address).await?;
    output::print(&SubRecordOut {
        address: address.to_string(),
        tag,
        sub_record,
    })
}

pub async fn mint_record(client: SubRegistrarClient<RpcLedger>, address: &Pubkey) -> Result<()> {
    let mint_record = client.fetch_mint_record(address).await?;
    output::print(&MintRecordOut {
        address: address.to_string(),
        mint_record,
    })
}
