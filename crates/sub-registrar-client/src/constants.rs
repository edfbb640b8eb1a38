//! Constants shared between the on-chain program and clients.
//!
//! Keep these stable because they affect PDA derivation.

use solana_program::{pubkey, pubkey::Pubkey};

/// PDA seed for registrar accounts.
pub const SEED_REGISTRAR: &str = "registrar";

/// PDA seed for sub-record accounts.
pub const SEED_SUB_RECORD: &str = "subrecord";

/// PDA seed for NFT mint records.
pub const SEED_MINT_RECORD: &str = "nft_mint_record";

/// Sub-registrar program, mainnet deployment.
pub const MAINNET_PROGRAM_ID: Pubkey = pubkey!("2KkyPzjaAYaz2ojQZ9P3xYakLd96B5UH6a2isLaZ4Cgs");

/// Owner of the token accounts receiving the protocol fee.
pub const FEE_ACCOUNT_OWNER: Pubkey = pubkey!("5D2zKog251d6KPCyFyLMt3KroWwXXPWSgTPyhV22K2gR");

/// Protocol fee, percent of each registration price.
pub const FEE_PCT: u64 = 5;

/// Minimum delay before a revoked subdomain can be re-registered (one week).
pub const REVOKE_EXPIRY_DELAY_SECONDS_MIN: i64 = 604_800;

/// Name service program.
pub const NAME_PROGRAM_ID: Pubkey = pubkey!("namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX");

/// Parent of every `.sol` domain.
pub const ROOT_DOMAIN_ACCOUNT: Pubkey = pubkey!("58PwtjSDuFHuUkYjH9BYnnQKHfwo9reZhC2zMJv9JPkx");

/// Class of reverse-lookup name records (name auctioning central state).
pub const REVERSE_LOOKUP_CLASS: Pubkey = pubkey!("33m47vH6Eav6jr5Ry86XjhRft2jRBLDnDgPSHoquXi2Z");

/// Name auctioning program, invoked to create subdomain reverse records.
pub const NAME_AUCTIONING_PROGRAM_ID: Pubkey =
    pubkey!("jCebN34bUfdeUYJT13J1yG16XWQpt5PDx6Mse9GUqhR");

/// Prefix hashed in front of every name before key derivation.
pub const NAME_HASH_PREFIX: &str = "SPL Name Service";

/// Size of the name record header preceding the record data.
pub const NAME_RECORD_HEADER_LEN: usize = 96;

/// SPL token program.
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Token metadata program.
pub const METADATA_PROGRAM_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// PDA seed for token metadata accounts.
pub const SEED_METADATA: &str = "metadata";
