//! Byte-level codec primitives.
//!
//! Layout rules shared by every account and instruction of the program:
//! - integers are little-endian
//! - addresses are 32 raw bytes
//! - `bool` is one byte, 0 or 1
//! - `Option<T>` is a presence byte (0 or 1) followed by `T` only when present
//! - strings and arrays carry a `u32` length prefix
//!
//! `Reader` never reads past the end of its slice; every read names the field
//! it is decoding so failures point at the offending field.

use solana_program::pubkey::Pubkey;

use crate::error::{Result, SubRegistrarError};

pub const PUBKEY_LEN: usize = 32;

/// Append-only encoder.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn put_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn put_i64(&mut self, v: i64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn put_bool(&mut self, v: bool) -> &mut Self {
        self.put_u8(u8::from(v))
    }

    pub fn put_pubkey(&mut self, v: &Pubkey) -> &mut Self {
        self.buf.extend_from_slice(v.as_ref());
        self
    }

    pub fn put_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Length-prefixed UTF-8.
    pub fn put_string(&mut self, v: &str) -> &mut Self {
        self.put_len(v.len());
        self.put_raw(v.as_bytes())
    }

    /// `u32` element or byte count.
    ///
    /// Every length written here belongs to an account (at most 10 MiB) or an
    /// instruction payload, far below `u32::MAX`.
    pub fn put_len(&mut self, len: usize) -> &mut Self {
        debug_assert!(len <= u32::MAX as usize, "length {len} overflows a u32 prefix");
        self.put_u32(u32::try_from(len).unwrap_or(u32::MAX))
    }

    /// Writes the presence flag, and the payload only when present.
    pub fn put_option<T>(&mut self, v: Option<&T>, put: impl FnOnce(&mut Self, &T)) -> &mut Self {
        match v {
            Some(inner) => {
                self.put_u8(1);
                put(self, inner);
            }
            None => {
                self.put_u8(0);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails with `TruncatedInput` unless at least `needed` bytes remain.
    pub fn require(&self, field: &'static str, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(SubRegistrarError::truncated(field, needed, self.remaining()));
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, field: &'static str, n: usize) -> Result<&'a [u8]> {
        self.require(field, n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(field, N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_u64(&mut self, field: &'static str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_bool(&mut self, field: &'static str) -> Result<bool> {
        match self.read_u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SubRegistrarError::InvalidDiscriminant { field, value }),
        }
    }

    pub fn read_pubkey(&mut self, field: &'static str) -> Result<Pubkey> {
        Ok(Pubkey::new_from_array(self.read_array::<PUBKEY_LEN>(field)?))
    }

    pub fn read_string(&mut self, field: &'static str) -> Result<String> {
        let len = self.read_u32(field)? as usize;
        let bytes = self.read_bytes(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SubRegistrarError::InvalidUtf8 { field })
    }

    /// Reads the presence flag, then the payload when the flag is set.
    pub fn read_option<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.read_u8(field)? {
            0 => Ok(None),
            1 => read(self).map(Some),
            value => Err(SubRegistrarError::InvalidDiscriminant { field, value }),
        }
    }
}

/// Types with a fixed wire encoding.
pub trait Encode {
    fn encode(&self, w: &mut Writer);
}

/// Inverse of [`Encode`]. `field` names the value in error reports.
pub trait Decode: Sized {
    fn decode(r: &mut Reader<'_>, field: &'static str) -> Result<Self>;
}

macro_rules! impl_codec {
    ($($ty:ty => $put:ident, $read:ident);+ $(;)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self, w: &mut Writer) {
                    w.$put(*self);
                }
            }

            impl Decode for $ty {
                fn decode(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
                    r.$read(field)
                }
            }
        )+
    };
}

impl_codec! {
    u8 => put_u8, read_u8;
    u32 => put_u32, read_u32;
    u64 => put_u64, read_u64;
    i64 => put_i64, read_i64;
    bool => put_bool, read_bool;
}

impl Encode for Pubkey {
    fn encode(&self, w: &mut Writer) {
        w.put_pubkey(self);
    }
}

impl Decode for Pubkey {
    fn decode(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
        r.read_pubkey(field)
    }
}

impl Encode for String {
    fn encode(&self, w: &mut Writer) {
        w.put_string(self);
    }
}

impl Decode for String {
    fn decode(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
        r.read_string(field)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, w: &mut Writer) {
        w.put_option(self.as_ref(), |w, v| v.encode(w));
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
        r.read_option(field, |r| T::decode(r, field))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, w: &mut Writer) {
        w.put_len(self.len());
        for item in self {
            item.encode(w);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(r: &mut Reader<'_>, field: &'static str) -> Result<Self> {
        let count = r.read_u32(field)? as usize;
        // every element takes at least one byte
        let mut out = Vec::with_capacity(count.min(r.remaining()));
        for _ in 0..count {
            out.push(T::decode(r, field)?);
        }
        Ok(out)
    }
}

impl Writer {
    pub fn put<T: Encode + ?Sized>(&mut self, v: &T) -> &mut Self {
        v.encode(self);
        self
    }
}

impl<'a> Reader<'a> {
    pub fn read<T: Decode>(&mut self, field: &'static str) -> Result<T> {
        T::decode(self, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn length_prefix_holds_the_u32_range() {
        let mut w = Writer::new();
        w.put_len(u32::MAX as usize).put_len(0);
        assert_eq!(w.into_bytes(), [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
    }

    #[test]
    fn integers_are_little_endian() {
        let mut w = Writer::new();
        w.put_u64(0x0102_0304_0506_0708).put_u32(7).put_i64(-1);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(&bytes[8..12], &[7, 0, 0, 0]);
        assert_eq!(&bytes[12..], &[0xff; 8]);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u64("a").unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.read_u32("b").unwrap(), 7);
        assert_eq!(r.read_i64("c").unwrap(), -1);
        assert!(r.is_exhausted());
    }

    #[test]
    fn absent_option_writes_only_the_flag() {
        let key = Pubkey::new_unique();
        let mut w = Writer::new();
        w.put_option(None::<&Pubkey>, |w, k| {
            w.put_pubkey(k);
        });
        assert_eq!(w.len(), 1);
        w.put_option(Some(&key), |w, k| {
            w.put_pubkey(k);
        });
        assert_eq!(w.len(), 1 + 1 + 32);

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_option("none", |r| r.read_pubkey("k")).unwrap(), None);
        assert_eq!(
            r.read_option("some", |r| r.read_pubkey("k")).unwrap(),
            Some(key)
        );
    }

    #[test]
    fn bad_flags_are_invalid_discriminants() {
        let mut r = Reader::new(&[2]);
        assert_matches!(
            r.read_option("opt", |r| r.read_u8("v")),
            Err(SubRegistrarError::InvalidDiscriminant { field: "opt", value: 2 })
        );
        let mut r = Reader::new(&[9]);
        assert_matches!(
            r.read_bool("flag"),
            Err(SubRegistrarError::InvalidDiscriminant { field: "flag", value: 9 })
        );
    }

    #[test]
    fn truncation_reports_field_and_sizes() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_matches!(
            r.read_pubkey("authority"),
            Err(SubRegistrarError::TruncatedInput { field: "authority", needed: 32, remaining: 3 })
        );
        // a failed read does not move the cursor
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut w = Writer::new();
        w.put_string("\0sub");
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![4, 0, 0, 0, 0, b's', b'u', b'b']);
        assert_eq!(Reader::new(&bytes).read_string("domain").unwrap(), "\0sub");

        let bad = [2, 0, 0, 0, 0xff, 0xfe];
        assert_matches!(
            Reader::new(&bad).read_string("domain"),
            Err(SubRegistrarError::InvalidUtf8 { field: "domain" })
        );

        let short = [5, 0, 0, 0, b'a'];
        assert_matches!(
            Reader::new(&short).read_string("domain"),
            Err(SubRegistrarError::TruncatedInput { needed: 5, remaining: 1, .. })
        );
    }

    #[test]
    fn generic_option_and_vec() {
        let keys = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let mut w = Writer::new();
        w.put(&Some(7u8)).put(&None::<u64>).put(&keys);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 2 + 1 + 4 + 64);

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read::<Option<u8>>("a").unwrap(), Some(7));
        assert_eq!(r.read::<Option<u64>>("b").unwrap(), None);
        assert_eq!(r.read::<Vec<Pubkey>>("c").unwrap(), keys);
        assert!(r.is_exhausted());
    }

    #[test]
    fn vec_count_beyond_data_is_truncated() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 1];
        assert_matches!(
            Reader::new(&bytes).read::<Vec<u64>>("tiers"),
            Err(SubRegistrarError::TruncatedInput { field: "tiers", .. })
        );
    }
}
