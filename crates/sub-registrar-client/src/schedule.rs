//! Price schedule model.
//!
//! A schedule is an ordered list of `(length, price)` tiers. The order is the
//! lookup order used by the program, so the codec keeps it exactly as given
//! and never sorts.
//!
//! Wire format: `u32` tier count, then 16 bytes per tier (`length` u64 LE,
//! `price` u64 LE).

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::codec::{Decode, Encode, Reader, Writer};
use crate::constants::FEE_PCT;
use crate::error::{Result, SubRegistrarError};

/// Size of one encoded tier.
pub const PRICE_LEN: usize = 16;

/// Size of the count prefix.
pub const SCHEDULE_PREFIX_LEN: usize = 4;

/// One tier: labels of `length` graphemes cost `price` base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub length: u64,
    pub price: u64,
}

impl Price {
    pub fn new(length: u64, price: u64) -> Self {
        Self { length, price }
    }
}

impl From<(u64, u64)> for Price {
    fn from((length, price): (u64, u64)) -> Self {
        Self { length, price }
    }
}

/// What a buyer pays for one label, in the registrar mint's base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub price: u64,
    pub protocol_fee: u64,
    pub registrar_share: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule(Vec<Price>);

impl Schedule {
    pub fn new(tiers: Vec<Price>) -> Self {
        Self(tiers)
    }

    pub fn tiers(&self) -> &[Price] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Price> {
        self.0
    }

    pub fn encoded_len(&self) -> usize {
        SCHEDULE_PREFIX_LEN + self.0.len() * PRICE_LEN
    }

    /// Standalone encoding: count prefix followed by the tiers.
    pub fn serialize(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(self.encoded_len());
        self.encode_into(&mut w);
        w.into_bytes()
    }

    /// Exact inverse of [`Schedule::serialize`]. The bytes after the prefix
    /// must split into whole tiers and match the declared count.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let count = r.read_u32("price_schedule.len")? as usize;
        let body = r.remaining();
        if body % PRICE_LEN != 0 {
            return Err(SubRegistrarError::schedule(format!(
                "{body} byte(s) after the length prefix is not a multiple of {PRICE_LEN}"
            )));
        }
        if body / PRICE_LEN != count {
            return Err(SubRegistrarError::schedule(format!(
                "prefix declares {count} tier(s) but {} are present",
                body / PRICE_LEN
            )));
        }
        Self::read_tiers(&mut r, count)
    }

    pub(crate) fn encode_into(&self, w: &mut Writer) {
        w.put_len(self.0.len());
        for tier in &self.0 {
            w.put_u64(tier.length).put_u64(tier.price);
        }
    }

    /// Reads a schedule embedded in a larger record. The tier region is
    /// bounds-checked up front so a corrupt count cannot trigger a large
    /// allocation.
    pub(crate) fn decode_from(r: &mut Reader<'_>) -> Result<Self> {
        let count = r.read_u32("price_schedule.len")? as usize;
        let needed = count
            .checked_mul(PRICE_LEN)
            .ok_or_else(|| SubRegistrarError::schedule(format!("tier count {count} overflows")))?;
        r.require("price_schedule", needed)?;
        Self::read_tiers(r, count)
    }

    fn read_tiers(r: &mut Reader<'_>, count: usize) -> Result<Self> {
        let mut tiers = Vec::with_capacity(count);
        for _ in 0..count {
            let length = r.read_u64("price_schedule.length")?;
            let price = r.read_u64("price_schedule.price")?;
            tiers.push(Price { length, price });
        }
        Ok(Self(tiers))
    }

    /// Price the program charges for `label`: the tier whose length equals
    /// the label's grapheme count, otherwise the last tier. `None` for an
    /// empty schedule.
    pub fn price_for(&self, label: &str) -> Option<u64> {
        let label = label.strip_prefix('\0').unwrap_or(label);
        let len = label.graphemes(true).count() as u64;
        self.0
            .iter()
            .find(|tier| tier.length == len)
            .or_else(|| self.0.last())
            .map(|tier| tier.price)
    }

    /// True when tier lengths never decrease. The program refuses unsorted
    /// schedules at registrar creation.
    pub fn is_sorted(&self) -> bool {
        self.0.windows(2).all(|w| w[0].length <= w[1].length)
    }

    /// Price of `label` split into the protocol fee and the registrar's
    /// share. `None` for an empty schedule.
    pub fn quote(&self, label: &str) -> Option<PriceQuote> {
        let price = self.price_for(label)?;
        // at most `price`, so the narrowing cannot truncate
        let protocol_fee = (u128::from(price) * u128::from(FEE_PCT) / 100) as u64;
        Some(PriceQuote {
            price,
            protocol_fee,
            registrar_share: price - protocol_fee,
        })
    }
}

impl From<Vec<Price>> for Schedule {
    fn from(tiers: Vec<Price>) -> Self {
        Self(tiers)
    }
}

impl FromIterator<(u64, u64)> for Schedule {
    fn from_iter<I: IntoIterator<Item = (u64, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(Price::from).collect())
    }
}

impl Encode for Schedule {
    fn encode(&self, w: &mut Writer) {
        self.encode_into(w);
    }
}

impl Decode for Schedule {
    fn decode(r: &mut Reader<'_>, _field: &'static str) -> Result<Self> {
        Self::decode_from(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn order_is_preserved() {
        let schedule: Schedule = [(90, 250), (30, 100)].into_iter().collect();
        let back = Schedule::deserialize(&schedule.serialize()).unwrap();
        assert_eq!(back.tiers(), &[Price::new(90, 250), Price::new(30, 100)]);

        let schedule: Schedule = [(30, 100), (90, 250)].into_iter().collect();
        let back = Schedule::deserialize(&schedule.serialize()).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn encoding_is_count_then_pairs() {
        let schedule: Schedule = [(365, 1000)].into_iter().collect();
        let bytes = schedule.serialize();
        assert_eq!(bytes.len(), 4 + 16);
        assert_eq!(&bytes[..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[4..12], &365u64.to_le_bytes());
        assert_eq!(&bytes[12..], &1000u64.to_le_bytes());
    }

    #[test]
    fn ragged_body_is_malformed() {
        let mut bytes = Schedule::from_iter([(1, 2)]).serialize();
        bytes.push(0);
        assert_matches!(
            Schedule::deserialize(&bytes),
            Err(SubRegistrarError::MalformedSchedule { .. })
        );
    }

    #[test]
    fn count_mismatch_is_malformed() {
        let mut bytes = Schedule::from_iter([(1, 2), (3, 4)]).serialize();
        bytes[0] = 3;
        assert_matches!(
            Schedule::deserialize(&bytes),
            Err(SubRegistrarError::MalformedSchedule { .. })
        );
    }

    #[test]
    fn missing_prefix_is_truncated() {
        assert_matches!(
            Schedule::deserialize(&[1, 0]),
            Err(SubRegistrarError::TruncatedInput { .. })
        );
    }

    #[test]
    fn embedded_decode_checks_bounds_before_reading() {
        let bytes = [0xff, 0xff, 0xff, 0x00, 1, 2, 3];
        let mut r = Reader::new(&bytes);
        assert_matches!(
            Schedule::decode_from(&mut r),
            Err(SubRegistrarError::TruncatedInput { field: "price_schedule", .. })
        );
    }

    #[test]
    fn price_lookup_falls_back_to_last_tier() {
        let schedule: Schedule = [(1, 500), (2, 200), (3, 50)].into_iter().collect();
        assert_eq!(schedule.price_for("a"), Some(500));
        assert_eq!(schedule.price_for("\0ab"), Some(200));
        assert_eq!(schedule.price_for("abcdef"), Some(50));
        assert_eq!(Schedule::default().price_for("a"), None);
        assert!(schedule.is_sorted());
        assert!(!Schedule::from_iter([(2, 1), (1, 1)]).is_sorted());
        assert!(Schedule::from_iter([(1, 2), (1, 1)]).is_sorted());
    }

    #[test]
    fn quote_splits_protocol_fee() {
        let schedule: Schedule = [(1, 1_000), (2, 19)].into_iter().collect();
        assert_eq!(
            schedule.quote("a"),
            Some(PriceQuote {
                price: 1_000,
                protocol_fee: 50,
                registrar_share: 950,
            })
        );
        // fee rounds down
        let q = schedule.quote("long").unwrap();
        assert_eq!((q.price, q.protocol_fee, q.registrar_share), (19, 0, 19));
        let max: Schedule = [(1, u64::MAX)].into_iter().collect();
        let q = max.quote("a").unwrap();
        assert_eq!(q.protocol_fee + q.registrar_share, u64::MAX);
        assert_eq!(Schedule::default().quote("a"), None);
    }

    proptest! {
        #[test]
        fn serialize_roundtrip(tiers in prop::collection::vec((any::<u64>(), any::<u64>()), 0..32)) {
            let schedule: Schedule = tiers.into_iter().collect();
            let bytes = schedule.serialize();
            prop_assert_eq!(bytes.len(), schedule.encoded_len());
            prop_assert_eq!(Schedule::deserialize(&bytes).unwrap(), schedule);
        }
    }
}
