use anyhow::Result;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use sub_registrar_client::{Registrar, RegistrarFilter, RpcLedger, SubRegistrarClient};

use crate::args::RegistrarAction;
use crate::output;

#[derive(Debug, Serialize)]
pub struct RegistrarOut {
    pub address: String,
    pub registrar: Registrar,
}

pub async fn run(client: SubRegistrarClient<RpcLedger>, action: RegistrarAction) -> Result<()> {
    match action {
        RegistrarAction::Show { address } => {
            let registrar = client.fetch_registrar(&address).await?;
            output::print(&RegistrarOut {
                address: address.to_string(),
                registrar,
            })
        }
        RegistrarAction::List { domain, authority } => {
            let filter = match (domain, authority) {
                (Some(d), _) => RegistrarFilter::ForDomain(d),
                (None, Some(a)) => RegistrarFilter::ForAuthority(a),
                (None, None) => anyhow::bail!("one of --domain or --authority is required"),
            };
            let found = client.find_registrars(filter).await?;
            output::print(&found.into_iter().map(to_out).collect::<Vec<_>>())
        }
    }
}

fn to_out((address, registrar): (Pubkey, Registrar)) -> RegistrarOut {
    RegistrarOut {
        address: address.to_string(),
        registrar,
    }
}
