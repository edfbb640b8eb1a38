use anyhow::{bail, Result};
use serde::Serialize;
use sub_registrar_client::{pda, ProgramConfig, RegistrarLayout};

use crate::args::PdaTarget;
use crate::output;

#[derive(Debug, Serialize)]
pub struct PdaOut {
    pub kind: &'static str,
    pub program_id: String,
    pub address: String,
    pub bump: u8,
}

pub fn run(config: &ProgramConfig, target: PdaTarget) -> Result<()> {
    let (kind, (address, bump)) = match target {
        PdaTarget::Registrar { domain, authority } => {
            let authority = match (config.registrar_layout, authority) {
                (_, Some(a)) => a,
                // v3 registrars ignore the authority
                (RegistrarLayout::V3, None) => Default::default(),
                (layout, None) => bail!("--authority is required for {layout} registrars"),
            };
            ("registrar", pda::derive_registrar(config, &domain, &authority)?)
        }
        PdaTarget::SubRecord { sub_domain } => {
            ("sub_record", pda::derive_sub_record(config, &sub_domain)?)
        }
        PdaTarget::MintRecord { registrar, mint } => (
            "mint_record",
            pda::derive_mint_record(config, &registrar, &mint)?,
        ),
    };

    output::print(&PdaOut {
        kind,
        program_id: config.program_id.to_string(),
        address: address.to_string(),
        bump,
    })
}
