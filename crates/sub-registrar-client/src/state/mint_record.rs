use serde::Serialize;
use solana_program::pubkey::Pubkey;

use super::{b58, expect_tag, require_prefix, AccountTag};
use crate::codec::{Reader, Writer};
use crate::config::MintRecordLayout;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MintRecordV1 {
    pub count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MintRecordV2 {
    pub count: u8,
    #[serde(serialize_with = "b58::serialize")]
    pub mint: Pubkey,
}

/// Number of subdomains registered against one NFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum MintRecord {
    V1(MintRecordV1),
    V2(MintRecordV2),
}

impl MintRecord {
    pub fn fixed_prefix_len(layout: MintRecordLayout) -> usize {
        match layout {
            MintRecordLayout::V1 => 2,
            MintRecordLayout::V2 => 34,
        }
    }

    pub fn decode(data: &[u8], layout: MintRecordLayout) -> Result<Self> {
        let mut r = Reader::new(data);
        expect_tag(&mut r, AccountTag::MintRecord)?;
        require_prefix(data, "mint_record", Self::fixed_prefix_len(layout))?;
        let count = r.read_u8("count")?;
        Ok(match layout {
            MintRecordLayout::V1 => Self::V1(MintRecordV1 { count }),
            MintRecordLayout::V2 => Self::V2(MintRecordV2 {
                count,
                mint: r.read_pubkey("mint")?,
            }),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::fixed_prefix_len(self.layout()));
        w.put_u8(AccountTag::MintRecord.as_u8()).put_u8(self.count());
        if let Self::V2(r) = self {
            w.put_pubkey(&r.mint);
        }
        w.into_bytes()
    }

    pub fn layout(&self) -> MintRecordLayout {
        match self {
            Self::V1(_) => MintRecordLayout::V1,
            Self::V2(_) => MintRecordLayout::V2,
        }
    }

    pub fn count(&self) -> u8 {
        match self {
            Self::V1(r) => r.count,
            Self::V2(r) => r.count,
        }
    }

    pub fn mint(&self) -> Option<&Pubkey> {
        match self {
            Self::V1(_) => None,
            Self::V2(r) => Some(&r.mint),
        }
    }

    /// Whether another registration would exceed `max_nft_mint`. A zero cap
    /// is unlimited.
    pub fn is_at_cap(&self, max_nft_mint: u8) -> bool {
        max_nft_mint != 0 && self.count() >= max_nft_mint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubRegistrarError;
    use assert_matches::assert_matches;

    #[test]
    fn roundtrip() {
        let v1 = MintRecord::V1(MintRecordV1 { count: 4 });
        assert_eq!(v1.encode(), vec![5, 4]);
        assert_eq!(MintRecord::decode(&v1.encode(), MintRecordLayout::V1).unwrap(), v1);

        let v2 = MintRecord::V2(MintRecordV2 {
            count: 1,
            mint: Pubkey::new_unique(),
        });
        assert_eq!(v2.encode().len(), 34);
        assert_eq!(MintRecord::decode(&v2.encode(), MintRecordLayout::V2).unwrap(), v2);
    }

    #[test]
    fn v1_bytes_are_short_for_v2() {
        assert_matches!(
            MintRecord::decode(&[5, 1], MintRecordLayout::V2),
            Err(SubRegistrarError::TruncatedInput { needed: 34, remaining: 2, .. })
        );
    }

    #[test]
    fn wrong_entity_is_rejected() {
        assert_matches!(
            MintRecord::decode(&[1, 0], MintRecordLayout::V1),
            Err(SubRegistrarError::UnexpectedAccountTag { .. })
        );
    }

    #[test]
    fn cap() {
        let record = MintRecord::V1(MintRecordV1 { count: 2 });
        assert!(!record.is_at_cap(0));
        assert!(!record.is_at_cap(3));
        assert!(record.is_at_cap(2));
    }
}
