use clap::{Args, Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use sub_registrar_client::{
    InstructionLayout, MintRecordLayout, RegistrarLayout, Schedule, SubRecordLayout,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "sub-registrar", version, about = "Sub-registrar program CLI")]
pub struct Cli {
    /// Print single-line JSON instead of pretty JSON.
    #[arg(long, global = true)]
    pub compact: bool,

    /// Log filter (tracing `EnvFilter` syntax); overridden by RUST_LOG.
    #[arg(long, global = true, default_value = "warn")]
    pub log: String,

    /// JSON-RPC endpoint.
    #[arg(
        long,
        global = true,
        env = "SUB_REGISTRAR_RPC_URL",
        default_value = "https://api.mainnet-beta.solana.com"
    )]
    pub rpc_url: String,

    #[command(flatten)]
    pub program: ProgramArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct ProgramArgs {
    /// Program id of a non-mainnet deployment.
    #[arg(long, global = true, env = "SUB_REGISTRAR_PROGRAM_ID")]
    pub program_id: Option<Pubkey>,

    #[arg(long, global = true, default_value_t = RegistrarLayout::default())]
    pub registrar_layout: RegistrarLayout,

    #[arg(long, global = true, default_value_t = SubRecordLayout::default())]
    pub sub_record_layout: SubRecordLayout,

    #[arg(long, global = true, default_value_t = MintRecordLayout::default())]
    pub mint_record_layout: MintRecordLayout,

    #[arg(long, global = true, default_value_t = InstructionLayout::default())]
    pub instruction_layout: InstructionLayout,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Derive program addresses.
    Pda {
        #[command(subcommand)]
        target: PdaTarget,
    },

    /// Name-service key of `name.sol` or `sub.name.sol`.
    DomainKey { name: String },

    /// Inspect registrars.
    Registrar {
        #[command(subcommand)]
        action: RegistrarAction,
    },

    /// Inspect a sub-record.
    SubRecord {
        #[command(subcommand)]
        action: ShowAction,
    },

    /// Inspect an NFT mint record.
    MintRecord {
        #[command(subcommand)]
        action: ShowAction,
    },

    /// Build one program instruction against live state.
    Build {
        /// Keypair file. When set, the instructions are signed by it and sent.
        #[arg(long, global = true)]
        send: Option<String>,

        #[command(subcommand)]
        op: BuildOp,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PdaTarget {
    /// Registrar of a domain. `--authority` is required for v1/v2 layouts.
    Registrar {
        domain: Pubkey,
        #[arg(long)]
        authority: Option<Pubkey>,
    },
    /// Sub-record of a subdomain key.
    SubRecord { sub_domain: Pubkey },
    /// Mint record of an NFT mint under a registrar.
    MintRecord { registrar: Pubkey, mint: Pubkey },
}

#[derive(Subcommand, Debug, Clone)]
pub enum RegistrarAction {
    Show {
        address: Pubkey,
    },
    /// List registrars by domain or by authority.
    List {
        #[arg(long, conflicts_with = "authority", required_unless_present = "authority")]
        domain: Option<Pubkey>,
        #[arg(long)]
        authority: Option<Pubkey>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShowAction {
    Show { address: Pubkey },
}

#[derive(Args, Debug, Clone)]
pub struct NftArgs {
    /// Token account holding the NFT.
    #[arg(long, requires = "nft_mint")]
    pub nft_account: Option<Pubkey>,
    #[arg(long, requires = "nft_account")]
    pub nft_mint: Option<Pubkey>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BuildOp {
    CreateRegistrar {
        #[arg(long)]
        domain: Pubkey,
        #[arg(long)]
        domain_owner: Pubkey,
        #[arg(long)]
        fee_payer: Pubkey,
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        fee_account: Pubkey,
        #[arg(long)]
        authority: Pubkey,
        /// Tiers as `length:price`, comma separated, in lookup order.
        #[arg(long, value_parser = parse_schedule)]
        schedule: Schedule,
        #[arg(long)]
        nft_collection: Option<Pubkey>,
        #[arg(long, default_value_t = 0)]
        max_nft_mint: u8,
        #[arg(long)]
        allow_revoke: bool,
        /// Seconds; only sent with the v3 instruction layout.
        #[arg(long)]
        revoke_expiry_delay: Option<i64>,
    },
    EditRegistrar {
        #[arg(long)]
        registrar: Pubkey,
        #[arg(long)]
        new_authority: Option<Pubkey>,
        #[arg(long)]
        new_mint: Option<Pubkey>,
        #[arg(long)]
        new_fee_account: Option<Pubkey>,
        #[arg(long, value_parser = parse_schedule)]
        new_schedule: Option<Schedule>,
        #[arg(long)]
        new_max_nft_mint: Option<u8>,
    },
    CloseRegistrar {
        #[arg(long)]
        registrar: Pubkey,
        #[arg(long)]
        new_domain_owner: Pubkey,
        #[arg(long)]
        lamports_target: Pubkey,
    },
    Register {
        #[arg(long)]
        registrar: Pubkey,
        #[arg(long)]
        buyer: Pubkey,
        label: String,
        #[command(flatten)]
        nft: NftArgs,
    },
    AdminRegister {
        #[arg(long)]
        registrar: Pubkey,
        label: String,
    },
    Unregister {
        #[arg(long)]
        registrar: Pubkey,
        label: String,
        #[arg(long)]
        owner: Pubkey,
    },
    DeleteSubrecord {
        #[arg(long)]
        registrar: Pubkey,
        label: String,
        #[arg(long)]
        lamports_target: Pubkey,
    },
    AdminRevoke {
        #[arg(long)]
        registrar: Pubkey,
        label: String,
        #[arg(long)]
        sub_owner: Pubkey,
    },
    NftOwnerRevoke {
        #[arg(long)]
        registrar: Pubkey,
        label: String,
        #[arg(long)]
        sub_owner: Pubkey,
        #[arg(long)]
        nft_owner: Pubkey,
        #[arg(long)]
        nft_account: Pubkey,
        #[arg(long)]
        nft_mint: Pubkey,
    },
}

/// Parses `1:500,2:200,3:50` into tiers, keeping the given order.
pub fn parse_schedule(s: &str) -> anyhow::Result<Schedule> {
    s.split(',')
        .filter(|t| !t.trim().is_empty())
        .map(|tier| -> anyhow::Result<(u64, u64)> {
            let (length, price) = tier
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("tier {tier:?} is not length:price"))?;
            Ok((length.trim().parse::<u64>()?, price.trim().parse::<u64>()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn schedule_keeps_order() {
        let schedule = parse_schedule("3:50, 1:500,2:200").unwrap();
        let lengths: Vec<u64> = schedule.tiers().iter().map(|t| t.length).collect();
        assert_eq!(lengths, vec![3, 1, 2]);
        assert!(parse_schedule("3-50").is_err());
        assert!(parse_schedule("x:1").is_err());
    }

    #[test]
    fn layouts_parse_from_flags() {
        let cli = Cli::try_parse_from([
            "sub-registrar",
            "--registrar-layout",
            "v3",
            "--instruction-layout",
            "v3",
            "domain-key",
            "bonfida.sol",
        ])
        .unwrap();
        assert_eq!(cli.program.registrar_layout, RegistrarLayout::V3);
        assert_eq!(cli.program.instruction_layout, InstructionLayout::V3);
        assert_eq!(cli.program.sub_record_layout, SubRecordLayout::V3);
    }
}
