use anyhow::Result;
use sub_registrar_client::{Network, ProgramConfig, RpcLedger, SubRegistrarClient};

use crate::args::{Cli, Command, ProgramArgs, ShowAction};

mod build;
mod domain;
mod pda;
mod records;
mod registrar;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = program_config(&cli.program)?;
    match cli.command {
        Command::Pda { target } => pda::run(&config, target),
        Command::DomainKey { name } => domain::run(&name),
        Command::Registrar { action } => registrar::run(client(&config, &cli.rpc_url), action).await,
        Command::SubRecord {
            action: ShowAction::Show { address },
        } => records::sub_record(client(&config, &cli.rpc_url), &address).await,
        Command::MintRecord {
            action: ShowAction::Show { address },
        } => records::mint_record(client(&config, &cli.rpc_url), &address).await,
        Command::Build { send, op } => build::run(&config, &cli.rpc_url, send.as_deref(), op).await,
    }
}

fn program_config(args: &ProgramArgs) -> Result<ProgramConfig> {
    let network = match args.program_id {
        Some(id) => Network::Custom(id),
        None => Network::Mainnet,
    };
    let config = ProgramConfig::new(network)
        .with_registrar_layout(args.registrar_layout)
        .with_sub_record_layout(args.sub_record_layout)
        .with_mint_record_layout(args.mint_record_layout)
        .with_instruction_layout(args.instruction_layout);
    config.validate()?;
    Ok(config)
}

fn client(config: &ProgramConfig, rpc_url: &str) -> SubRegistrarClient<RpcLedger> {
    SubRegistrarClient::new(config.clone(), RpcLedger::new(rpc_url))
}
