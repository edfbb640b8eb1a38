//! PDA derivation helpers for the sub-registrar program and the programs it
//! talks to (name service, token metadata, associated token accounts).
//!
//! Every helper goes through [`derive`] / [`derive_with_seeds`], which run the
//! ledger's bump search and return `DerivationExhausted` instead of panicking
//! when no candidate lands off the curve.

use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;

use crate::config::{ProgramConfig, RegistrarLayout};
use crate::constants::{
    METADATA_PROGRAM_ID, NAME_HASH_PREFIX, NAME_PROGRAM_ID, REVERSE_LOOKUP_CLASS,
    ROOT_DOMAIN_ACCOUNT, SEED_METADATA, SEED_MINT_RECORD, SEED_REGISTRAR, SEED_SUB_RECORD,
    TOKEN_PROGRAM_ID,
};
use crate::error::{Result, SubRegistrarError};

/// Derive a program address from a label and an ordered list of keys.
///
/// Bumps are tried from 255 down to 0 and the first off-curve address wins,
/// which is the order the program uses when it re-derives the same address.
pub fn derive(seed_label: &str, components: &[&Pubkey], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    let mut seeds: Vec<&[u8]> = Vec::with_capacity(components.len() + 1);
    seeds.push(seed_label.as_bytes());
    seeds.extend(components.iter().map(|k| k.as_ref()));
    derive_with_seeds(&seeds, program_id).map_err(|_| SubRegistrarError::DerivationExhausted {
        seed: seed_label.to_string(),
    })
}

/// Bump search over raw seeds.
pub fn derive_with_seeds(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        SubRegistrarError::DerivationExhausted {
            seed: seeds
                .first()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .unwrap_or_default(),
        }
    })
}

/// Registrar address. Layouts v1/v2 are keyed by `(domain, authority)`,
/// v3 by the domain alone.
pub fn derive_registrar(
    config: &ProgramConfig,
    domain: &Pubkey,
    authority: &Pubkey,
) -> Result<(Pubkey, u8)> {
    match config.registrar_layout {
        RegistrarLayout::V1 | RegistrarLayout::V2 => {
            derive(SEED_REGISTRAR, &[domain, authority], &config.program_id)
        }
        RegistrarLayout::V3 => derive(SEED_REGISTRAR, &[domain], &config.program_id),
    }
}

/// Sub-record address of a subdomain.
pub fn derive_sub_record(config: &ProgramConfig, sub_domain: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(SEED_SUB_RECORD, &[sub_domain], &config.program_id)
}

/// Mint record address for an NFT mint used against a registrar.
pub fn derive_mint_record(
    config: &ProgramConfig,
    registrar: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, u8)> {
    derive(SEED_MINT_RECORD, &[registrar, mint], &config.program_id)
}

/// Token metadata account of a mint.
pub fn derive_metadata(mint: &Pubkey) -> Result<Pubkey> {
    derive(SEED_METADATA, &[&METADATA_PROGRAM_ID, mint], &METADATA_PROGRAM_ID).map(|(k, _)| k)
}

/// Associated token account of `wallet` for `mint` under the SPL token program.
pub fn derive_associated_token_account(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey> {
    derive_with_seeds(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &spl_associated_token_account::id(),
    )
    .map(|(k, _)| k)
}

/// Hash of a name as stored by the name service.
pub fn hash_name(name: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(NAME_HASH_PREFIX.as_bytes());
    hasher.update(name.as_bytes());
    hasher.finalize().into()
}

/// Name-service account for a hashed name under an optional class and parent.
pub fn derive_name_account(
    hashed_name: &[u8; 32],
    class: Option<&Pubkey>,
    parent: Option<&Pubkey>,
) -> Result<Pubkey> {
    let zero = Pubkey::default();
    let class = class.unwrap_or(&zero);
    let parent = parent.unwrap_or(&zero);
    derive_with_seeds(
        &[hashed_name.as_ref(), class.as_ref(), parent.as_ref()],
        &NAME_PROGRAM_ID,
    )
    .map(|(k, _)| k)
}

/// Key of a subdomain `label` under `parent`. The name service stores
/// subdomain labels with a leading null byte.
pub fn derive_subdomain_key(label: &str, parent: &Pubkey) -> Result<Pubkey> {
    let label = label.strip_prefix('\0').unwrap_or(label);
    derive_name_account(&hash_name(&format!("\0{label}")), None, Some(parent))
}

/// Reverse-lookup account of a domain key. Subdomain reverse records are
/// parented to their parent domain.
pub fn derive_reverse_key(domain_key: &Pubkey, parent: Option<&Pubkey>) -> Result<Pubkey> {
    derive_name_account(
        &hash_name(&domain_key.to_string()),
        Some(&REVERSE_LOOKUP_CLASS),
        parent,
    )
}

/// A domain name resolved to its name-service keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainKey {
    pub pubkey: Pubkey,
    /// Parent domain key when the name is a subdomain.
    pub parent: Option<Pubkey>,
    pub is_sub: bool,
}

/// Resolve `name.sol`, `name`, `sub.name.sol` or `sub.name` to its key.
/// Deeper names such as `a.sub.name.sol` are refused.
pub fn derive_domain_key(domain: &str) -> Result<DomainKey> {
    let domain = domain.trim().trim_end_matches(".sol");
    if domain.matches('.').count() > 1 {
        return Err(SubRegistrarError::label(domain, "more than one subdomain level"));
    }
    if domain.split('.').any(str::is_empty) {
        return Err(SubRegistrarError::label(domain, "empty name segment"));
    }
    match domain.split_once('.') {
        Some((sub, parent_name)) => {
            let parent = derive_name_account(&hash_name(parent_name), None, Some(&ROOT_DOMAIN_ACCOUNT))?;
            let pubkey = derive_subdomain_key(sub, &parent)?;
            Ok(DomainKey {
                pubkey,
                parent: Some(parent),
                is_sub: true,
            })
        }
        None => {
            let pubkey = derive_name_account(&hash_name(domain), None, Some(&ROOT_DOMAIN_ACCOUNT))?;
            Ok(DomainKey {
                pubkey,
                parent: None,
                is_sub: false,
            })
        }
    }
}

/// Addresses touched when issuing one subdomain under a registrar.
#[derive(Debug, Clone)]
pub struct SubdomainPdas {
    pub sub_domain: Pubkey,
    pub sub_reverse: Pubkey,
    pub sub_record: (Pubkey, u8),
}

/// Collect the PDAs of a subdomain `label` under `parent_domain`.
pub fn pdas_for_subdomain(
    config: &ProgramConfig,
    label: &str,
    parent_domain: &Pubkey,
) -> Result<SubdomainPdas> {
    let sub_domain = derive_subdomain_key(label, parent_domain)?;
    Ok(SubdomainPdas {
        sub_domain,
        sub_reverse: derive_reverse_key(&sub_domain, Some(parent_domain))?,
        sub_record: derive_sub_record(config, &sub_domain)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InstructionLayout, Network};
    use assert_matches::assert_matches;

    #[test]
    fn derivation_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let first = derive("registrar", &[&a, &b], &program_id).unwrap();
        let second = derive("registrar", &[&a, &b], &program_id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn derivation_matches_ledger_search() {
        let program_id = Pubkey::new_unique();
        let domain = Pubkey::new_unique();
        let expected =
            Pubkey::find_program_address(&[b"subrecord".as_ref(), domain.as_ref()], &program_id);
        let cfg = ProgramConfig::new(Network::Custom(program_id));
        assert_eq!(derive_sub_record(&cfg, &domain).unwrap(), expected);
    }

    #[test]
    fn component_order_matters() {
        let program_id = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let ab = derive("nft_mint_record", &[&a, &b], &program_id).unwrap();
        let ba = derive("nft_mint_record", &[&b, &a], &program_id).unwrap();
        assert_ne!(ab.0, ba.0);
    }

    #[test]
    fn v3_registrar_is_keyed_by_domain_only() {
        let domain = Pubkey::new_unique();
        let v2 = ProgramConfig::mainnet();
        let v3 = ProgramConfig::mainnet()
            .with_registrar_layout(RegistrarLayout::V3)
            .with_instruction_layout(InstructionLayout::V3);

        let a = derive_registrar(&v3, &domain, &Pubkey::new_unique()).unwrap();
        let b = derive_registrar(&v3, &domain, &Pubkey::new_unique()).unwrap();
        assert_eq!(a, b);

        let c = derive_registrar(&v2, &domain, &Pubkey::new_unique()).unwrap();
        let d = derive_registrar(&v2, &domain, &Pubkey::new_unique()).unwrap();
        assert_ne!(c.0, d.0);
    }

    #[test]
    fn subdomain_label_null_prefix_is_normalized() {
        let parent = Pubkey::new_unique();
        assert_eq!(
            derive_subdomain_key("shop", &parent).unwrap(),
            derive_subdomain_key("\0shop", &parent).unwrap()
        );
    }

    #[test]
    fn domain_key_accepts_sol_suffix() {
        let with = derive_domain_key("bonfida.sol").unwrap();
        let without = derive_domain_key("bonfida").unwrap();
        assert_eq!(with, without);
        assert!(!with.is_sub);

        let sub = derive_domain_key("dex.bonfida.sol").unwrap();
        assert!(sub.is_sub);
        assert_eq!(sub.parent, Some(with.pubkey));
        assert_eq!(sub.pubkey, derive_subdomain_key("dex", &with.pubkey).unwrap());
    }

    #[test]
    fn domain_key_refuses_deeper_names() {
        assert_matches!(
            derive_domain_key("x.y.bonfida.sol"),
            Err(SubRegistrarError::InvalidLabel { reason: "more than one subdomain level", .. })
        );
        assert_matches!(
            derive_domain_key(".bonfida"),
            Err(SubRegistrarError::InvalidLabel { reason: "empty name segment", .. })
        );
        assert_matches!(derive_domain_key(""), Err(SubRegistrarError::InvalidLabel { .. }));
    }

    #[test]
    fn associated_token_account_matches_spl() {
        let wallet = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            derive_associated_token_account(&wallet, &mint).unwrap(),
            spl_associated_token_account::get_associated_token_address_with_program_id(
                &wallet,
                &mint,
                &TOKEN_PROGRAM_ID
            )
        );
    }
}
