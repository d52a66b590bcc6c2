use anchor_lang::prelude::*;
use solana_sha256_hasher::hashv;

use crate::{
    constants::{ATTENTION_RATE_DECIMALS, MAX_MEMO_LEN, MAX_SALT_LEN, STAT_FIELDS},
    errors::PlatformError,
};

// -----------------
// Seeds
// -----------------
pub const PLATFORM_SEED: &[u8] = b"platform_v1";
pub const TREASURY_VAULT_SEED: &[u8] = b"treasury_vault_v1";
pub const ESCROW_AUTHORITY_SEED: &[u8] = b"escrow_v1";
pub const ESCROW_VAULT_SEED: &[u8] = b"escrow_vault_v1";

pub const ACCOUNT_SEED: &[u8] = b"account_v1";
pub const PENDING_SEED: &[u8] = b"pending_v1";
pub const ESCROW_HOLD_SEED: &[u8] = b"escrow_hold_v1";

pub const AIRDROP_SEED: &[u8] = b"airdrop_v1";
pub const AIRDROP_VAULT_SEED: &[u8] = b"airdrop_vault_v1";
pub const AIRDROP_CLAIM_SEED: &[u8] = b"airdrop_claim_v1";

// ---------------
// Payloads
// ---------------
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountToAdd {
    pub id: u64,
    pub owner: Pubkey,
    pub attention_rate: u64,
    pub stat_diff: Vec<u32>,
    pub verification_post: u64,
    pub verification_salt: String,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AttentionRateUpdate {
    pub id: u64,
    pub attention_rate: u64,
    pub rating_position: u32,
    pub stat_diff: Vec<u32>,
    pub tweets_ranked_in_period: u8,
}

// -------------------------
// Payload validation
// -------------------------
pub fn validate_stat_diff(stat_diff: &[u32]) -> Result<()> {
    require!(stat_diff.len() == STAT_FIELDS, PlatformError::InvalidArgument);
    Ok(())
}

pub fn validate_verification(post: u64, salt: &str) -> Result<()> {
    require!(post != 0, PlatformError::InvalidArgument);
    require!(!salt.is_empty(), PlatformError::InvalidArgument);
    require!(salt.len() <= MAX_SALT_LEN, PlatformError::InvalidArgument);
    Ok(())
}

pub fn validate_memo(memo: &str) -> Result<()> {
    require!(memo.len() <= MAX_MEMO_LEN, PlatformError::InvalidArgument);
    Ok(())
}

// -------------------------
// Verification digest
// -------------------------
pub fn verification_digest(id: u64, post: u64, salt: &str) -> [u8; 32] {
    hashv(&[
        b"verification".as_ref(),
        id.to_le_bytes().as_ref(),
        post.to_le_bytes().as_ref(),
        salt.as_bytes(),
    ])
    .to_bytes()
}

// -------------------------
// Formatting
// -------------------------

/// Renders a fixed-point value, e.g. `format_fixed(150_000, 4) == "15.0000"`.
pub fn format_fixed(value: u64, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let value = value as u128;
    format!(
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = decimals as usize
    )
}

/// Attention rate as a decimal string.
pub fn format_rate(rate: u64) -> String {
    format_fixed(rate, ATTENTION_RATE_DECIMALS)
}

// -------------------------
// Record sizing
// -------------------------

/// Bytes needed to store `value` behind the 8-byte discriminator.
pub fn required_space<T: AnchorSerialize>(value: &T) -> Result<usize> {
    let len = value.try_to_vec().map(|v| v.len()).map_err(|_| error!(PlatformError::MathOverflow))?;
    Ok(8 + len)
}
