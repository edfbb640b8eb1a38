use anyhow::Result;
use serde::Serialize;
use sub_registrar_client::pda;

use crate::output;

#[derive(Debug, Serialize)]
pub struct DomainKeyOut {
    pub name: String,
    pub pubkey: String,
    pub parent: Option<String>,
    pub is_sub: bool,
    pub reverse: String,
}

pub fn run(name: &str) -> Result<()> {
    let key = pda::derive_domain_key(name)?;
    let reverse = pda::derive_reverse_key(&key.pubkey, key.parent.as_ref())?;
    output::print(&DomainKeyOut {
        name: name.to_string(),
        pubkey: key.pubkey.to_string(),
        parent: key.parent.map(|p| p.to_string()),
        is_sub: key.is_sub,
        reverse: reverse.to_string(),
    })
}
