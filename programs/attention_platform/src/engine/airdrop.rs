//! One-time per-account grants, keyed by (platform, account).

use anchor_lang::prelude::*;

use crate::{
    constants::{AIRDROP_MEMO, INITIAL_VERSION, MAX_AIRDROP_PLATFORMS},
    errors::PlatformError,
    state::{AirdropClaim, AirdropPlatform, AirdropState, Asset},
};

use super::{ClaimStore, Ledger, PlatformDirectory};

#[derive(Clone, Copy, Debug)]
pub struct AirdropKeys {
    pub admin: Pubkey,
    pub vault_owner: Pubkey,
    pub vault: Pubkey,
    pub bump: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AirdropAction {
    AddPlatform {
        platform: Pubkey,
        amount_per_account: u64,
    },
    UpdatePlatform {
        platform: Pubkey,
        amount_per_account: u64,
    },
    Request {
        platform: Pubkey,
        account: Pubkey,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    Granted(u64),
    AlreadyClaimed,
    /// Vault below the grant; nothing recorded so the request can be retried.
    Underfunded,
}

pub fn initialize(state: &mut AirdropState, keys: AirdropKeys, mint: Pubkey) -> Result<()> {
    require!(!state.initialized, PlatformError::AlreadyInitialized);

    *state = AirdropState {
        initialized: true,
        bump: keys.bump,
        admin: keys.admin,
        vault_owner: keys.vault_owner,
        vault: keys.vault,
        mint,
        platforms: Vec::new(),
        version: INITIAL_VERSION,
    };
    msg!("airdrop initialized admin={} mint={}", keys.admin, mint);
    Ok(())
}

pub fn execute<C: ClaimStore, L: Ledger, D: PlatformDirectory>(
    state: &mut AirdropState,
    signer: &Pubkey,
    action: AirdropAction,
    claims: &mut C,
    ledger: &mut L,
    directory: &D,
    now: i64,
) -> Result<()> {
    require!(state.initialized, PlatformError::NotInitialized);

    match action {
        AirdropAction::AddPlatform {
            platform,
            amount_per_account,
        } => {
            require_keys_eq!(*signer, state.admin, PlatformError::Unauthorized);
            add_platform(state, platform, amount_per_account, directory)
        }
        AirdropAction::UpdatePlatform {
            platform,
            amount_per_account,
        } => {
            require_keys_eq!(*signer, state.admin, PlatformError::Unauthorized);
            update_platform(state, platform, amount_per_account)
        }
        AirdropAction::Request { platform, account } => {
            require_keys_eq!(*signer, platform, PlatformError::Unauthorized);
            request(state, platform, account, claims, ledger, directory, now).map(|_| ())
        }
    }
}

pub fn add_platform<D: PlatformDirectory>(
    state: &mut AirdropState,
    platform: Pubkey,
    amount_per_account: u64,
    directory: &D,
) -> Result<()> {
    require!(directory.is_registered(&platform), PlatformError::UnknownPlatform);
    require!(
        state.platform_index(&platform).is_none(),
        PlatformError::AlreadyRegistered
    );
    require!(amount_per_account > 0, PlatformError::InvalidArgument);
    require!(
        state.platforms.len() < MAX_AIRDROP_PLATFORMS,
        PlatformError::TooManyEntries
    );

    state.platforms.push(AirdropPlatform {
        platform,
        amount_per_account,
        granted_count: 0,
    });
    msg!(
        "airdrop platform added platform={} amount={}",
        platform,
        amount_per_account
    );
    Ok(())
}

pub fn update_platform(
    state: &mut AirdropState,
    platform: Pubkey,
    amount_per_account: u64,
) -> Result<()> {
    let index = state
        .platform_index(&platform)
        .ok_or(PlatformError::UnknownPlatform)?;
    require!(amount_per_account > 0, PlatformError::InvalidArgument);

    state.platforms[index].amount_per_account = amount_per_account;
    msg!(
        "airdrop platform updated platform={} amount={}",
        platform,
        amount_per_account
    );
    Ok(())
}

/// Grants `account` the platform's per-account amount once.
///
/// The directory is consulted on every request, so a platform that has left
/// the wider system can no longer draw on the vault even though its entry
/// is still stored here.
pub fn request<C: ClaimStore, L: Ledger, D: PlatformDirectory>(
    state: &mut AirdropState,
    platform: Pubkey,
    account: Pubkey,
    claims: &mut C,
    ledger: &mut L,
    directory: &D,
    now: i64,
) -> Result<RequestOutcome> {
    require!(directory.is_registered(&platform), PlatformError::UnknownPlatform);
    let index = state
        .platform_index(&platform)
        .ok_or(PlatformError::PlatformNotRegistered)?;

    if claims.is_claimed(&platform, &account)? {
        msg!("airdrop already claimed platform={} account={}", platform, account);
        return Ok(RequestOutcome::AlreadyClaimed);
    }

    let amount = state.platforms[index].amount_per_account;
    let available = ledger.balance(&state.vault_owner, &state.mint)?;
    if available < amount {
        msg!(
            "airdrop skipped platform={} account={} available={} amount={}",
            platform,
            account,
            available,
            amount
        );
        return Ok(RequestOutcome::Underfunded);
    }

    ledger.transfer(
        &state.vault_owner,
        &account,
        Asset::new(state.mint, amount),
        AIRDROP_MEMO,
    )?;

    let entry = &mut state.platforms[index];
    entry.granted_count = entry
        .granted_count
        .checked_add(1)
        .ok_or(PlatformError::MathOverflow)?;
    claims.record_claim(&AirdropClaim {
        platform,
        account,
        amount,
        claimed_at: now,
    })?;

    msg!(
        "airdrop granted platform={} account={} amount={}",
        platform,
        account,
        amount
    );
    Ok(RequestOutcome::Granted(amount))
}

/// Grants the airdrop to freshly confirmed owners. A platform the airdrop
/// does not serve is skipped rather than failing account creation.
pub fn grant_on_confirmation<C: ClaimStore, L: Ledger, D: PlatformDirectory>(
    state: &mut AirdropState,
    platform: Pubkey,
    owners: &[Pubkey],
    claims: &mut C,
    ledger: &mut L,
    directory: &D,
    now: i64,
) -> Result<()> {
    if !state.initialized
        || state.platform_index(&platform).is_none()
        || !directory.is_registered(&platform)
    {
        msg!("airdrop not available for platform={}", platform);
        return Ok(());
    }
    for owner in owners {
        request(state, platform, *owner, claims, ledger, directory, now)?;
    }
    Ok(())
}
