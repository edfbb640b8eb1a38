use std::io::{self, Write};
use std::sync::OnceLock;

use serde::Serialize;
use solana_sdk::instruction::Instruction;
use sub_registrar_client::{ClientError, SubRegistrarError};

static COMPACT: OnceLock<bool> = OnceLock::new();

pub fn init(compact: bool) {
    let _ = COMPACT.set(compact);
}

fn is_compact() -> bool {
    COMPACT.get().copied().unwrap_or(false)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = if is_compact() {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{s}");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorOut<'a> {
    ok: bool,
    kind: &'a str,
    message: String,
}

/// Reports a failed command on stderr as JSON.
pub fn print_error(err: &anyhow::Error) {
    let out = ErrorOut {
        ok: false,
        kind: error_kind(err),
        message: format!("{err:#}"),
    };
    let line = serde_json::to_string(&out).unwrap_or_else(|_| format!("{err:#}"));
    let _ = writeln!(io::stderr(), "{line}");
}

pub fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<ClientError>() {
        return e.kind();
    }
    if let Some(e) = err.downcast_ref::<SubRegistrarError>() {
        return e.kind();
    }
    "error"
}

#[derive(Debug, Serialize)]
pub struct AccountOut {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Serialize)]
pub struct InstructionOut {
    pub program_id: String,
    pub accounts: Vec<AccountOut>,
    pub data_hex: String,
}

impl From<&Instruction> for InstructionOut {
    fn from(ix: &Instruction) -> Self {
        Self {
            program_id: ix.program_id.to_string(),
            accounts: ix
                .accounts
                .iter()
                .map(|m| AccountOut {
                    pubkey: m.pubkey.to_string(),
                    is_signer: m.is_signer,
                    is_writable: m.is_writable,
                })
                .collect(),
            data_hex: hex::encode(&ix.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn kind_of_wrapped_errors() {
        let core: anyhow::Error = SubRegistrarError::AccountNotFound {
            address: Pubkey::new_unique(),
        }
        .into();
        assert_eq!(error_kind(&core), "account_not_found");

        let client: anyhow::Error = ClientError::Collaborator(anyhow::anyhow!("timeout")).into();
        assert_eq!(error_kind(&client), "collaborator");
        assert_eq!(error_kind(&anyhow::anyhow!("other")), "error");
    }

    #[test]
    fn instruction_view() {
        let key = Pubkey::new_unique();
        let ix = Instruction {
            program_id: key,
            accounts: vec![AccountMeta::new(key, true)],
            data: vec![0, 255],
        };
        let out = InstructionOut::from(&ix);
        assert_eq!(out.data_hex, "00ff");
        assert!(out.accounts[0].is_signer);
        assert_eq!(out.program_id, key.to_string());
    }
}
