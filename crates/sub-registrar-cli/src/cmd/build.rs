use anyhow::{anyhow, Result};
use serde::Serialize;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::{read_keypair_file, Signer};
use sub_registrar_client::instruction::{
    CreateRegistrarAccounts, CreateRegistrarParams, EditRegistrarParams,
};
use sub_registrar_client::{NftProof, PriceQuote, ProgramConfig, RpcLedger, SubRegistrarClient};
use tracing::info;

use crate::args::BuildOp;
use crate::output::{self, InstructionOut};

#[derive(Debug, Serialize)]
pub struct BuildOut {
    pub operation: &'static str,
    pub instructions: Vec<InstructionOut>,
    /// Registration price, for `register` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<PriceQuote>,
    pub signature: Option<String>,
}

/// Built instructions plus what `register` will charge.
struct Built {
    operation: &'static str,
    instructions: Vec<Instruction>,
    quote: Option<PriceQuote>,
}

impl Built {
    fn new(operation: &'static str, instructions: Vec<Instruction>) -> Self {
        Self {
            operation,
            instructions,
            quote: None,
        }
    }
}

pub async fn run(
    config: &ProgramConfig,
    rpc_url: &str,
    send: Option<&str>,
    op: BuildOp,
) -> Result<()> {
    let mut ledger = RpcLedger::new(rpc_url);
    if let Some(path) = send {
        let keypair = read_keypair_file(path).map_err(|e| anyhow!("read keypair {path}: {e}"))?;
        info!(signer = %keypair.pubkey(), "loaded keypair");
        ledger = ledger.with_signer(keypair);
    }
    let client = SubRegistrarClient::new(config.clone(), ledger);

    let built = build(&client, op).await?;

    let signature = match client.ledger().signer_pubkey() {
        Some(fee_payer) => Some(client.send(&built.instructions, &fee_payer).await?),
        None => None,
    };

    output::print(&BuildOut {
        operation: built.operation,
        instructions: built.instructions.iter().map(InstructionOut::from).collect(),
        quote: built.quote,
        signature,
    })
}

async fn build(
    client: &SubRegistrarClient<RpcLedger>,
    op: BuildOp,
) -> Result<Built> {
    let out = match op {
        BuildOp::CreateRegistrar {
            domain,
            domain_owner,
            fee_payer,
            mint,
            fee_account,
            authority,
            schedule,
            nft_collection,
            max_nft_mint,
            allow_revoke,
            revoke_expiry_delay,
        } => {
            let accounts = CreateRegistrarAccounts {
                domain,
                domain_owner,
                fee_payer,
            };
            let params = CreateRegistrarParams {
                mint,
                fee_account,
                authority,
                price_schedule: schedule,
                nft_gated_collection: nft_collection,
                max_nft_mint,
                allow_revoke,
                revoke_expiry_delay,
            };
            Built::new("create_registrar", client.create_registrar(&accounts, &params)?)
        }
        BuildOp::EditRegistrar {
            registrar,
            new_authority,
            new_mint,
            new_fee_account,
            new_schedule,
            new_max_nft_mint,
        } => {
            let params = EditRegistrarParams {
                new_authority,
                new_mint,
                new_fee_account,
                new_price_schedule: new_schedule,
                new_max_nft_mint,
            };
            if params.is_empty() {
                return Err(anyhow!("edit-registrar needs at least one --new-* flag"));
            }
            Built::new("edit_registrar", client.edit_registrar(&registrar, &params).await?)
        }
        BuildOp::CloseRegistrar {
            registrar,
            new_domain_owner,
            lamports_target,
        } => Built::new(
            "close_registrar",
            client
                .close_registrar(&registrar, &new_domain_owner, &lamports_target)
                .await?,
        ),
        BuildOp::Register {
            registrar,
            buyer,
            label,
            nft,
        } => {
            let nft = match (nft.nft_account, nft.nft_mint) {
                (Some(nft_account), Some(nft_mint)) => Some(NftProof {
                    nft_account,
                    nft_mint,
                }),
                _ => None,
            };
            let quote = client.quote_registration(&registrar, &label).await?;
            Built {
                operation: "register",
                instructions: client.register(&registrar, &buyer, &label, nft).await?,
                quote: Some(quote),
            }
        }
        BuildOp::AdminRegister { registrar, label } => Built::new(
            "admin_register",
            client.admin_register(&registrar, &label).await?,
        ),
        BuildOp::Unregister {
            registrar,
            label,
            owner,
        } => Built::new(
            "unregister",
            client.unregister(&registrar, &label, &owner).await?,
        ),
        BuildOp::DeleteSubrecord {
            registrar,
            label,
            lamports_target,
        } => Built::new(
            "delete_subrecord",
            client
                .delete_subrecord(&registrar, &label, &lamports_target)
                .await?,
        ),
        BuildOp::AdminRevoke {
            registrar,
            label,
            sub_owner,
        } => Built::new(
            "admin_revoke",
            client.admin_revoke(&registrar, &label, &sub_owner).await?,
        ),
        BuildOp::NftOwnerRevoke {
            registrar,
            label,
            sub_owner,
            nft_owner,
            nft_account,
            nft_mint,
        } => {
            let nft = NftProof {
                nft_account,
                nft_mint,
            };
            Built::new(
                "nft_owner_revoke",
                client
                    .nft_owner_revoke(&registrar, &label, &sub_owner, &nft_owner, nft)
                    .await?,
            )
        }
    };
    Ok(out)
}
