use serde::Serialize;
use solana_program::pubkey::Pubkey;

use super::{b58, expect_tag, require_prefix, AccountTag};
use crate::codec::{Reader, Writer};
use crate::config::RegistrarLayout;
use crate::error::Result;
use crate::schedule::Schedule;

/// Byte offset of `authority` in every registrar layout.
pub const AUTHORITY_OFFSET: usize = 2;

/// Byte offset of `domain` in every registrar layout.
pub const DOMAIN_OFFSET: usize = 98;

/// Registrar without NFT gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrarV1 {
    pub nonce: u8,
    #[serde(serialize_with = "b58::serialize")]
    pub authority: Pubkey,
    /// Token account receiving registration fees.
    #[serde(serialize_with = "b58::serialize")]
    pub fee_account: Pubkey,
    /// Mint of the token fees are paid in.
    #[serde(serialize_with = "b58::serialize")]
    pub mint: Pubkey,
    /// Parent domain subdomains are issued under.
    #[serde(serialize_with = "b58::serialize")]
    pub domain: Pubkey,
    pub total_sub_created: u64,
    pub price_schedule: Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrarV2 {
    #[serde(flatten)]
    pub base: RegistrarV1,
    /// Verified collection whose holders may register. `None` means open.
    #[serde(serialize_with = "b58::option::serialize")]
    pub nft_gated_collection: Option<Pubkey>,
    /// Per-NFT registration cap; 0 means unlimited.
    pub max_nft_mint: u8,
    pub allow_revoke: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrarV3 {
    #[serde(flatten)]
    pub base: RegistrarV2,
    /// Seconds a revoked subdomain stays reserved before anyone may take it.
    pub revoke_expiry_delay: i64,
}

/// Registrar account, one variant per layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum Registrar {
    V1(RegistrarV1),
    V2(RegistrarV2),
    V3(RegistrarV3),
}

impl Registrar {
    /// Encoded size with gating absent and an empty schedule.
    pub fn fixed_prefix_len(layout: RegistrarLayout) -> usize {
        match layout {
            RegistrarLayout::V1 => 142,
            RegistrarLayout::V2 => 145,
            RegistrarLayout::V3 => 153,
        }
    }

    pub fn decode(data: &[u8], layout: RegistrarLayout) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_tag(&mut r, AccountTag::Registrar)?;
        require_prefix(data, "registrar", Self::fixed_prefix_len(layout))?;

        let nonce = r.read_u8("nonce")?;
        let authority = r.read_pubkey("authority")?;
        let fee_account = r.read_pubkey("fee_account")?;
        let mint = r.read_pubkey("mint")?;
        let domain = r.read_pubkey("domain")?;
        let total_sub_created = r.read_u64("total_sub_created")?;

        if layout == RegistrarLayout::V1 {
            return Ok(Self::V1(RegistrarV1 {
                nonce,
                authority,
                fee_account,
                mint,
                domain,
                total_sub_created,
                price_schedule: Schedule::decode_from(&mut r)?,
            }));
        }

        let nft_gated_collection = r.read("nft_gated_collection")?;
        let max_nft_mint = r.read_u8("max_nft_mint")?;
        let allow_revoke = r.read_bool("allow_revoke")?;
        let price_schedule = Schedule::decode_from(&mut r)?;
        let v2 = RegistrarV2 {
            base: RegistrarV1 {
                nonce,
                authority,
                fee_account,
                mint,
                domain,
                total_sub_created,
                price_schedule,
            },
            nft_gated_collection,
            max_nft_mint,
            allow_revoke,
        };

        match layout {
            RegistrarLayout::V3 => Ok(Self::V3(RegistrarV3 {
                base: v2,
                revoke_expiry_delay: r.read_i64("revoke_expiry_delay")?,
            })),
            _ => Ok(Self::V2(v2)),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let core = self.core();
        let mut w = Writer::with_capacity(
            Self::fixed_prefix_len(self.layout()) + 32 + core.price_schedule.len() * 16,
        );
        w.put_u8(AccountTag::Registrar.as_u8())
            .put_u8(core.nonce)
            .put_pubkey(&core.authority)
            .put_pubkey(&core.fee_account)
            .put_pubkey(&core.mint)
            .put_pubkey(&core.domain)
            .put_u64(core.total_sub_created);
        if let Some(v2) = self.gated() {
            w.put(&v2.nft_gated_collection)
                .put_u8(v2.max_nft_mint)
                .put_bool(v2.allow_revoke);
        }
        w.put(&core.price_schedule);
        if let Self::V3(v3) = self {
            w.put_i64(v3.revoke_expiry_delay);
        }
        w.into_bytes()
    }

    pub fn layout(&self) -> RegistrarLayout {
        match self {
            Self::V1(_) => RegistrarLayout::V1,
            Self::V2(_) => RegistrarLayout::V2,
            Self::V3(_) => RegistrarLayout::V3,
        }
    }

    /// Fields shared by every layout.
    pub fn core(&self) -> &RegistrarV1 {
        match self {
            Self::V1(r) => r,
            Self::V2(r) => &r.base,
            Self::V3(r) => &r.base.base,
        }
    }

    fn gated(&self) -> Option<&RegistrarV2> {
        match self {
            Self::V1(_) => None,
            Self::V2(r) => Some(r),
            Self::V3(r) => Some(&r.base),
        }
    }

    pub fn nonce(&self) -> u8 {
        self.core().nonce
    }

    pub fn authority(&self) -> &Pubkey {
        &self.core().authority
    }

    pub fn fee_account(&self) -> &Pubkey {
        &self.core().fee_account
    }

    pub fn mint(&self) -> &Pubkey {
        &self.core().mint
    }

    pub fn domain(&self) -> &Pubkey {
        &self.core().domain
    }

    pub fn total_sub_created(&self) -> u64 {
        self.core().total_sub_created
    }

    pub fn price_schedule(&self) -> &Schedule {
        &self.core().price_schedule
    }

    /// Gating collection, `None` when open or when the layout predates gating.
    pub fn nft_gated_collection(&self) -> Option<&Pubkey> {
        self.gated().and_then(|r| r.nft_gated_collection.as_ref())
    }

    pub fn is_nft_gated(&self) -> bool {
        self.nft_gated_collection().is_some()
    }

    /// `None` for v1 registrars.
    pub fn max_nft_mint(&self) -> Option<u8> {
        self.gated().map(|r| r.max_nft_mint)
    }

    /// `None` for v1 registrars.
    pub fn allow_revoke(&self) -> Option<bool> {
        self.gated().map(|r| r.allow_revoke)
    }

    /// `None` unless the layout is v3.
    pub fn revoke_expiry_delay(&self) -> Option<i64> {
        match self {
            Self::V3(r) => Some(r.revoke_expiry_delay),
            _ => None,
        }
    }
}

/// A `memcmp` constraint on raw account bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemcmpFilter {
    pub offset: usize,
    #[serde(serialize_with = "serialize_bytes_b58")]
    pub bytes: Vec<u8>,
}

impl MemcmpFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    /// True when `data` carries `bytes` at `offset`.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len()) == Some(self.bytes.as_slice())
    }
}

fn serialize_bytes_b58<S: serde::Serializer>(
    bytes: &[u8],
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&bs58::encode(bytes).into_string())
}

/// Registrar queries answerable with account filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrarFilter {
    ForDomain(Pubkey),
    ForAuthority(Pubkey),
}

impl RegistrarFilter {
    pub fn filters(&self) -> Vec<MemcmpFilter> {
        let tag = MemcmpFilter::new(0, vec![AccountTag::Registrar.as_u8()]);
        let key = match self {
            Self::ForDomain(domain) => MemcmpFilter::new(DOMAIN_OFFSET, domain.to_bytes()),
            Self::ForAuthority(authority) => {
                MemcmpFilter::new(AUTHORITY_OFFSET, authority.to_bytes())
            }
        };
        vec![tag, key]
    }
}
