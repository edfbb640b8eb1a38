use serde::Serialize;
use solana_program::pubkey::Pubkey;

use super::{b58, expect_tag, require_prefix, AccountTag};
use crate::codec::{Reader, Writer};
use crate::config::SubRecordLayout;
use crate::error::{Result, SubRegistrarError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubRecordV1 {
    #[serde(serialize_with = "b58::serialize")]
    pub registrar: Pubkey,
    /// Set when the subdomain was registered through NFT gating.
    #[serde(serialize_with = "b58::option::serialize")]
    pub mint_record: Option<Pubkey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubRecordV2 {
    #[serde(serialize_with = "b58::serialize")]
    pub registrar: Pubkey,
    #[serde(serialize_with = "b58::serialize")]
    pub sub_key: Pubkey,
    #[serde(serialize_with = "b58::option::serialize")]
    pub mint_record: Option<Pubkey>,
    pub expiry_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubRecordV3 {
    #[serde(flatten)]
    pub base: SubRecordV2,
    /// Wallet that paid for the record's rent.
    #[serde(serialize_with = "b58::serialize")]
    pub allocator: Pubkey,
}

/// Per-subdomain bookkeeping, one variant per layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum SubRecord {
    V1(SubRecordV1),
    V2(SubRecordV2),
    V3(SubRecordV3),
}

impl SubRecord {
    pub fn fixed_prefix_len(layout: SubRecordLayout) -> usize {
        match layout {
            SubRecordLayout::V1 => 34,
            SubRecordLayout::V2 => 74,
            SubRecordLayout::V3 => 106,
        }
    }

    pub fn decode(data: &[u8], layout: SubRecordLayout) -> Result<Self> {
        Self::decode_as(data, layout, AccountTag::SubRecord)
    }

    /// Decodes a record carrying `tag`, which must be `SubRecord` or
    /// `RevokedSubRecord`. Revoked records keep the live layout.
    pub fn decode_as(data: &[u8], layout: SubRecordLayout, tag: AccountTag) -> Result<Self> {
        if !matches!(tag, AccountTag::SubRecord | AccountTag::RevokedSubRecord) {
            return Err(SubRegistrarError::UnexpectedAccountTag {
                expected: AccountTag::SubRecord.to_string(),
                found: tag.to_string(),
            });
        }
        let mut r = Reader::new(data);
        expect_tag(&mut r, tag)?;
        require_prefix(data, "sub_record", Self::fixed_prefix_len(layout))?;

        let registrar = r.read_pubkey("registrar")?;
        if layout == SubRecordLayout::V1 {
            return Ok(Self::V1(SubRecordV1 {
                registrar,
                mint_record: r.read("mint_record")?,
            }));
        }

        let v2 = SubRecordV2 {
            registrar,
            sub_key: r.read_pubkey("sub_key")?,
            mint_record: r.read("mint_record")?,
            expiry_timestamp: r.read_i64("expiry_timestamp")?,
        };
        match layout {
            SubRecordLayout::V3 => Ok(Self::V3(SubRecordV3 {
                base: v2,
                allocator: r.read_pubkey("allocator")?,
            })),
            _ => Ok(Self::V2(v2)),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        self.encode_as(AccountTag::SubRecord)
    }

    pub fn encode_as(&self, tag: AccountTag) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::fixed_prefix_len(self.layout()) + 32);
        w.put_u8(tag.as_u8());
        match self {
            Self::V1(r) => {
                w.put_pubkey(&r.registrar).put(&r.mint_record);
            }
            Self::V2(r) => put_v2(&mut w, r),
            Self::V3(r) => {
                put_v2(&mut w, &r.base);
                w.put_pubkey(&r.allocator);
            }
        }
        w.into_bytes()
    }

    pub fn layout(&self) -> SubRecordLayout {
        match self {
            Self::V1(_) => SubRecordLayout::V1,
            Self::V2(_) => SubRecordLayout::V2,
            Self::V3(_) => SubRecordLayout::V3,
        }
    }

    pub fn registrar(&self) -> &Pubkey {
        match self {
            Self::V1(r) => &r.registrar,
            Self::V2(r) => &r.registrar,
            Self::V3(r) => &r.base.registrar,
        }
    }

    pub fn mint_record(&self) -> Option<&Pubkey> {
        match self {
            Self::V1(r) => r.mint_record.as_ref(),
            Self::V2(r) => r.mint_record.as_ref(),
            Self::V3(r) => r.base.mint_record.as_ref(),
        }
    }

    /// `None` for v1 records.
    pub fn sub_key(&self) -> Option<&Pubkey> {
        match self {
            Self::V1(_) => None,
            Self::V2(r) => Some(&r.sub_key),
            Self::V3(r) => Some(&r.base.sub_key),
        }
    }

    /// `None` for v1 records.
    pub fn expiry_timestamp(&self) -> Option<i64> {
        match self {
            Self::V1(_) => None,
            Self::V2(r) => Some(r.expiry_timestamp),
            Self::V3(r) => Some(r.base.expiry_timestamp),
        }
    }

    /// `None` unless the layout is v3.
    pub fn allocator(&self) -> Option<&Pubkey> {
        match self {
            Self::V3(r) => Some(&r.allocator),
            _ => None,
        }
    }
}

fn put_v2(w: &mut Writer, r: &SubRecordV2) {
    w.put_pubkey(&r.registrar)
        .put_pubkey(&r.sub_key)
        .put(&r.mint_record)
        .put_i64(r.expiry_timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn v2(mint_record: Option<Pubkey>) -> SubRecordV2 {
        SubRecordV2 {
            registrar: Pubkey::new_unique(),
            sub_key: Pubkey::new_unique(),
            mint_record,
            expiry_timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn prefix_lengths_match_encoding() {
        let v1 = SubRecord::V1(SubRecordV1 {
            registrar: Pubkey::new_unique(),
            mint_record: None,
        });
        assert_eq!(v1.encode().len(), 34);
        assert_eq!(SubRecord::V2(v2(None)).encode().len(), 74);
        let v3 = SubRecord::V3(SubRecordV3 {
            base: v2(None),
            allocator: Pubkey::new_unique(),
        });
        assert_eq!(v3.encode().len(), 106);
    }

    #[test]
    fn roundtrip_both_option_states() {
        let records = [
            SubRecord::V1(SubRecordV1 {
                registrar: Pubkey::new_unique(),
                mint_record: Some(Pubkey::new_unique()),
            }),
            SubRecord::V2(v2(None)),
            SubRecord::V2(v2(Some(Pubkey::new_unique()))),
            SubRecord::V3(SubRecordV3 {
                base: v2(Some(Pubkey::new_unique())),
                allocator: Pubkey::new_unique(),
            }),
        ];
        for record in records {
            let bytes = record.encode();
            assert_eq!(SubRecord::decode(&bytes, record.layout()).unwrap(), record);
        }
    }

    #[test]
    fn v2_bytes_are_short_for_v3() {
        let bytes = SubRecord::V2(v2(None)).encode();
        assert_matches!(
            SubRecord::decode(&bytes, SubRecordLayout::V3),
            Err(SubRegistrarError::TruncatedInput { needed: 106, remaining: 74, .. })
        );
    }

    #[test]
    fn revoked_records_need_explicit_tag() {
        let record = SubRecord::V3(SubRecordV3 {
            base: v2(None),
            allocator: Pubkey::new_unique(),
        });
        let bytes = record.encode_as(AccountTag::RevokedSubRecord);
        assert_matches!(
            SubRecord::decode(&bytes, SubRecordLayout::V3),
            Err(SubRegistrarError::UnexpectedAccountTag { .. })
        );
        assert_eq!(
            SubRecord::decode_as(&bytes, SubRecordLayout::V3, AccountTag::RevokedSubRecord)
                .unwrap(),
            record
        );
        assert_matches!(
            SubRecord::decode_as(&bytes, SubRecordLayout::V3, AccountTag::MintRecord),
            Err(SubRegistrarError::UnexpectedAccountTag { .. })
        );
    }

    #[test]
    fn accessors_by_layout() {
        let record = SubRecord::V1(SubRecordV1 {
            registrar: Pubkey::new_unique(),
            mint_record: None,
        });
        assert_eq!(record.sub_key(), None);
        assert_eq!(record.expiry_timestamp(), None);
        assert_eq!(record.allocator(), None);

        let mint_record = Pubkey::new_unique();
        let record = SubRecord::V2(v2(Some(mint_record)));
        assert_eq!(record.mint_record(), Some(&mint_record));
        assert_eq!(record.expiry_timestamp(), Some(1_700_000_000));
    }
}
