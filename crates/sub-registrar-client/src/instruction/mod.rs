//! Instruction payloads and account lists of the sub-registrar program.
//!
//! Payloads are a one-byte opcode followed by the operation's parameters in
//! the shared wire format (see [`crate::codec`]). Account lists are assembled
//! with [`AccountsBuilder`]; one builder function per operation lives in
//! [`builders`].

use solana_program::pubkey::Pubkey;

use crate::codec::{Reader, Writer};
use crate::config::InstructionLayout;
use crate::constants::REVOKE_EXPIRY_DELAY_SECONDS_MIN;
use crate::error::{Result, SubRegistrarError};
use crate::schedule::Schedule;

pub mod accounts;
pub mod builders;

pub use accounts::AccountsBuilder;
pub use builders::*;

/// Parameters of `create-registrar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRegistrarParams {
    pub mint: Pubkey,
    pub fee_account: Pubkey,
    pub authority: Pubkey,
    pub price_schedule: Schedule,
    pub nft_gated_collection: Option<Pubkey>,
    pub max_nft_mint: u8,
    pub allow_revoke: bool,
    /// Only sent with the v3 instruction layout; `None` packs the program
    /// minimum.
    pub revoke_expiry_delay: Option<i64>,
}

/// Parameters of `edit-registrar`. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRegistrarParams {
    pub new_authority: Option<Pubkey>,
    pub new_mint: Option<Pubkey>,
    pub new_fee_account: Option<Pubkey>,
    pub new_price_schedule: Option<Schedule>,
    pub new_max_nft_mint: Option<u8>,
}

impl EditRegistrarParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Every instruction the program accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarInstruction {
    CreateRegistrar(CreateRegistrarParams),
    EditRegistrar(EditRegistrarParams),
    /// `label` is held without the null prefix; the layout decides whether
    /// it is sent.
    Register { label: String },
    Unregister,
    CloseRegistrar,
    AdminRegister { label: String },
    DeleteSubrecord,
    AdminRevoke,
    NftOwnerRevoke,
}

impl RegistrarInstruction {
    pub fn register(label: &str) -> Self {
        Self::Register {
            label: normalize_label(label).to_string(),
        }
    }

    pub fn admin_register(label: &str) -> Self {
        Self::AdminRegister {
            label: normalize_label(label).to_string(),
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Self::CreateRegistrar(_) => 0,
            Self::EditRegistrar(_) => 1,
            Self::Register { .. } => 2,
            Self::Unregister => 3,
            Self::CloseRegistrar => 4,
            Self::AdminRegister { .. } => 5,
            Self::DeleteSubrecord => 6,
            Self::AdminRevoke => 7,
            Self::NftOwnerRevoke => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRegistrar(_) => "create_registrar",
            Self::EditRegistrar(_) => "edit_registrar",
            Self::Register { .. } => "register",
            Self::Unregister => "unregister",
            Self::CloseRegistrar => "close_registrar",
            Self::AdminRegister { .. } => "admin_register",
            Self::DeleteSubrecord => "delete_subrecord",
            Self::AdminRevoke => "admin_revoke",
            Self::NftOwnerRevoke => "nft_owner_revoke",
        }
    }

    pub fn pack(&self, layout: InstructionLayout) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u8(self.opcode());
        match self {
            Self::CreateRegistrar(p) => {
                w.put_pubkey(&p.mint)
                    .put_pubkey(&p.fee_account)
                    .put_pubkey(&p.authority)
                    .put(&p.price_schedule)
                    .put(&p.nft_gated_collection)
                    .put_u8(p.max_nft_mint)
                    .put_bool(p.allow_revoke);
                if layout == InstructionLayout::V3 {
                    w.put_i64(p.revoke_expiry_delay.unwrap_or(REVOKE_EXPIRY_DELAY_SECONDS_MIN));
                }
            }
            Self::EditRegistrar(p) => {
                w.put(&p.new_authority)
                    .put(&p.new_mint)
                    .put(&p.new_fee_account)
                    .put(&p.new_price_schedule)
                    .put(&p.new_max_nft_mint);
            }
            Self::Register { label } | Self::AdminRegister { label } => {
                w.put_string(&wire_label(label, layout));
            }
            Self::Unregister
            | Self::CloseRegistrar
            | Self::DeleteSubrecord
            | Self::AdminRevoke
            | Self::NftOwnerRevoke => {}
        }
        w.into_bytes()
    }

    pub fn unpack(data: &[u8], layout: InstructionLayout) -> Result<Self> {
        let mut r = Reader::new(data);
        let opcode = r.read_u8("instruction")?;
        let ix = match opcode {
            0 => {
                let mint = r.read_pubkey("mint")?;
                let fee_account = r.read_pubkey("fee_account")?;
                let authority = r.read_pubkey("authority")?;
                let price_schedule = r.read("price_schedule")?;
                let nft_gated_collection = r.read("nft_gated_collection")?;
                let max_nft_mint = r.read_u8("max_nft_mint")?;
                let allow_revoke = r.read_bool("allow_revoke")?;
                let revoke_expiry_delay = match layout {
                    InstructionLayout::V3 => Some(r.read_i64("revoke_expiry_delay")?),
                    _ => None,
                };
                Self::CreateRegistrar(CreateRegistrarParams {
                    mint,
                    fee_account,
                    authority,
                    price_schedule,
                    nft_gated_collection,
                    max_nft_mint,
                    allow_revoke,
                    revoke_expiry_delay,
                })
            }
            1 => Self::EditRegistrar(EditRegistrarParams {
                new_authority: r.read("new_authority")?,
                new_mint: r.read("new_mint")?,
                new_fee_account: r.read("new_fee_account")?,
                new_price_schedule: r.read("new_price_schedule")?,
                new_max_nft_mint: r.read("new_max_nft_mint")?,
            }),
            2 => Self::Register {
                label: normalize_label(&r.read_string("domain")?).to_string(),
            },
            3 => Self::Unregister,
            4 => Self::CloseRegistrar,
            5 => Self::AdminRegister {
                label: normalize_label(&r.read_string("domain")?).to_string(),
            },
            6 => Self::DeleteSubrecord,
            7 => Self::AdminRevoke,
            8 => Self::NftOwnerRevoke,
            value => {
                return Err(SubRegistrarError::InvalidDiscriminant {
                    field: "instruction",
                    value,
                })
            }
        };
        Ok(ix)
    }
}

/// Strips the name-service null prefix, if any.
pub fn normalize_label(label: &str) -> &str {
    label.strip_prefix('\0').unwrap_or(label)
}

/// Normalizes `label` and checks that it names exactly one subdomain level.
///
/// A dotted label would be registered as one name but resolved as a deeper
/// path, so it is refused before any address is derived.
pub fn validate_label(label: &str) -> Result<&str> {
    let label = normalize_label(label);
    if label.is_empty() {
        return Err(SubRegistrarError::label(label, "label is empty"));
    }
    if label.contains('.') {
        return Err(SubRegistrarError::label(label, "label contains a dot"));
    }
    Ok(label)
}

fn wire_label(label: &str, layout: InstructionLayout) -> String {
    let label = normalize_label(label);
    match layout {
        InstructionLayout::V1 => label.to_string(),
        InstructionLayout::V2 | InstructionLayout::V3 => format!("\0{label}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn create_params() -> CreateRegistrarParams {
        CreateRegistrarParams {
            mint: Pubkey::new_unique(),
            fee_account: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            price_schedule: [(365, 1000)].into_iter().collect(),
            nft_gated_collection: None,
            max_nft_mint: 0,
            allow_revoke: true,
            revoke_expiry_delay: None,
        }
    }

    #[test]
    fn create_registrar_payload_layout() {
        let p = create_params();
        let data = RegistrarInstruction::CreateRegistrar(p.clone()).pack(InstructionLayout::V2);

        let mut expected = vec![0x00];
        expected.extend_from_slice(p.mint.as_ref());
        expected.extend_from_slice(p.fee_account.as_ref());
        expected.extend_from_slice(p.authority.as_ref());
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(&365u64.to_le_bytes());
        expected.extend_from_slice(&1000u64.to_le_bytes());
        expected.extend_from_slice(&[0x00, 0x00, 0x01]);
        assert_eq!(data, expected);
        assert_eq!(data.len(), 1 + 96 + 4 + 16 + 3);
    }

    #[test]
    fn v3_create_appends_expiry_delay() {
        let mut p = create_params();
        p.revoke_expiry_delay = Some(1_000_000);
        let v2 = RegistrarInstruction::CreateRegistrar(p.clone()).pack(InstructionLayout::V2);
        let v3 = RegistrarInstruction::CreateRegistrar(p.clone()).pack(InstructionLayout::V3);
        assert_eq!(v3.len(), v2.len() + 8);
        assert_eq!(&v3[v2.len()..], &1_000_000i64.to_le_bytes());
        assert_eq!(
            RegistrarInstruction::unpack(&v3, InstructionLayout::V3).unwrap(),
            RegistrarInstruction::CreateRegistrar(p)
        );
    }

    #[test]
    fn register_label_prefix_depends_on_layout() {
        let ix = RegistrarInstruction::register("shop");
        assert_eq!(ix.pack(InstructionLayout::V1), vec![2, 4, 0, 0, 0, b's', b'h', b'o', b'p']);
        assert_eq!(
            ix.pack(InstructionLayout::V2),
            vec![2, 5, 0, 0, 0, 0, b's', b'h', b'o', b'p']
        );
        // a caller-supplied prefix is not doubled
        assert_eq!(
            RegistrarInstruction::register("\0shop").pack(InstructionLayout::V2),
            ix.pack(InstructionLayout::V2)
        );
        for layout in InstructionLayout::ALL {
            assert_eq!(RegistrarInstruction::unpack(&ix.pack(*layout), *layout).unwrap(), ix);
        }
    }

    #[test]
    fn labels_name_one_level() {
        assert_eq!(validate_label("\0shop").unwrap(), "shop");
        assert_eq!(validate_label("żółw").unwrap(), "żółw");
        assert_matches!(
            validate_label("a.b"),
            Err(SubRegistrarError::InvalidLabel { reason: "label contains a dot", .. })
        );
        assert_matches!(validate_label("\0"), Err(SubRegistrarError::InvalidLabel { .. }));
        assert_matches!(validate_label(""), Err(SubRegistrarError::InvalidLabel { .. }));
    }

    #[test]
    fn edit_roundtrip_both_option_states() {
        let empty = RegistrarInstruction::EditRegistrar(EditRegistrarParams::default());
        assert_eq!(empty.pack(InstructionLayout::V2), vec![1, 0, 0, 0, 0, 0]);

        let full = RegistrarInstruction::EditRegistrar(EditRegistrarParams {
            new_authority: Some(Pubkey::new_unique()),
            new_mint: Some(Pubkey::new_unique()),
            new_fee_account: Some(Pubkey::new_unique()),
            new_price_schedule: Some([(1, 10), (2, 5)].into_iter().collect()),
            new_max_nft_mint: Some(4),
        });
        for ix in [empty, full] {
            let bytes = ix.pack(InstructionLayout::V2);
            assert_eq!(RegistrarInstruction::unpack(&bytes, InstructionLayout::V2).unwrap(), ix);
        }
    }

    #[test]
    fn bare_opcodes() {
        for (ix, op) in [
            (RegistrarInstruction::Unregister, 3),
            (RegistrarInstruction::CloseRegistrar, 4),
            (RegistrarInstruction::DeleteSubrecord, 6),
            (RegistrarInstruction::AdminRevoke, 7),
            (RegistrarInstruction::NftOwnerRevoke, 8),
        ] {
            assert_eq!(ix.pack(InstructionLayout::V2), vec![op]);
            assert_eq!(RegistrarInstruction::unpack(&[op], InstructionLayout::V2).unwrap(), ix);
        }
    }

    #[test]
    fn unknown_opcode_and_truncation() {
        assert_matches!(
            RegistrarInstruction::unpack(&[9], InstructionLayout::V2),
            Err(SubRegistrarError::InvalidDiscriminant { field: "instruction", value: 9 })
        );
        assert_matches!(
            RegistrarInstruction::unpack(&[], InstructionLayout::V2),
            Err(SubRegistrarError::TruncatedInput { .. })
        );
        let data = RegistrarInstruction::CreateRegistrar(create_params()).pack(InstructionLayout::V2);
        assert_matches!(
            RegistrarInstruction::unpack(&data[..50], InstructionLayout::V2),
            Err(SubRegistrarError::TruncatedInput { field: "fee_account", .. })
        );
    }

    proptest! {
        #[test]
        fn admin_register_roundtrip(label in "[a-z0-9-]{1,32}") {
            let ix = RegistrarInstruction::admin_register(&label);
            for layout in InstructionLayout::ALL {
                prop_assert_eq!(
                    RegistrarInstruction::unpack(&ix.pack(*layout), *layout).unwrap(),
                    ix.clone()
                );
            }
        }
    }
}
