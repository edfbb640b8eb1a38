use solana_program::instruction::AccountMeta;
use solana_program::pubkey::Pubkey;

/// Ordered account list for one instruction.
///
/// Optional trailing accounts go through the `*_if_present` steps so the
/// order stays visible at the call site.
#[derive(Debug, Default, Clone)]
pub struct AccountsBuilder {
    metas: Vec<AccountMeta>,
}

impl AccountsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readonly(mut self, key: &Pubkey) -> Self {
        self.metas.push(AccountMeta::new_readonly(*key, false));
        self
    }

    pub fn writable(mut self, key: &Pubkey) -> Self {
        self.metas.push(AccountMeta::new(*key, false));
        self
    }

    /// Writable signer.
    pub fn signer(mut self, key: &Pubkey) -> Self {
        self.metas.push(AccountMeta::new(*key, true));
        self
    }

    pub fn readonly_if_present(self, key: Option<&Pubkey>) -> Self {
        match key {
            Some(key) => self.readonly(key),
            None => self,
        }
    }

    pub fn writable_if_present(self, key: Option<&Pubkey>) -> Self {
        match key {
            Some(key) => self.writable(key),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    pub fn build(self) -> Vec<AccountMeta> {
        self.metas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_order() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let metas = AccountsBuilder::new()
            .readonly(&a)
            .writable(&b)
            .signer(&c)
            .writable_if_present(None)
            .readonly_if_present(Some(&a))
            .build();

        assert_eq!(metas.len(), 4);
        assert_eq!(metas[0], AccountMeta::new_readonly(a, false));
        assert_eq!(metas[1], AccountMeta::new(b, false));
        assert_eq!(metas[2], AccountMeta::new(c, true));
        assert_eq!(metas[3], AccountMeta::new_readonly(a, false));
    }
}
