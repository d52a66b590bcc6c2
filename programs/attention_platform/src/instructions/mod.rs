use anchor_lang::prelude::*;

use crate::{
    record_store::ProgramStore,
    state::PlatformState,
    utils::{AIRDROP_SEED, ESCROW_AUTHORITY_SEED, PLATFORM_SEED},
};

pub mod admin;
pub mod airdrop;
pub mod escrow;
pub mod pending;
pub mod registry;
pub mod round;

pub(crate) fn now() -> Result<i64> {
    Ok(Clock::get()?.unix_timestamp)
}

pub(crate) fn platform_seeds(platform: &PlatformState) -> Vec<Vec<u8>> {
    vec![
        PLATFORM_SEED.to_vec(),
        platform.authority.to_bytes().to_vec(),
        vec![platform.bump],
    ]
}

pub(crate) fn escrow_seeds(platform_key: &Pubkey, escrow_bump: u8) -> Vec<Vec<u8>> {
    vec![
        ESCROW_AUTHORITY_SEED.to_vec(),
        platform_key.to_bytes().to_vec(),
        vec![escrow_bump],
    ]
}

pub(crate) fn airdrop_seeds(bump: u8) -> Vec<Vec<u8>> {
    vec![AIRDROP_SEED.to_vec(), vec![bump]]
}

/// Per-id records of `platform` among `remaining`, paid for by `payer`.
pub(crate) fn records<'a, 'info>(
    platform: Pubkey,
    remaining: &'a [AccountInfo<'info>],
    payer: &Signer<'info>,
    system_program: &Program<'info, System>,
) -> ProgramStore<'a, 'info> {
    ProgramStore::new(
        platform,
        remaining,
        payer.to_account_info(),
        system_program.to_account_info(),
    )
}
