//! Identifiers announced before their owner is confirmed.

use anchor_lang::prelude::*;

use crate::{
    errors::PlatformError,
    state::{PendingAccount, PlatformState},
};

use super::RegistryStore;

/// Allowed in any round phase; pending entries carry no weight.
pub fn add_pending<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
    name: Pubkey,
    now: i64,
) -> Result<()> {
    require!(store.account(id)?.is_none(), PlatformError::DuplicateIdentifier);
    require!(store.pending(id)?.is_none(), PlatformError::DuplicateIdentifier);

    insert(state, store, id, name, now)?;
    msg!("pending account added id={}", id);
    Ok(())
}

/// Removes the entry only. Escrowed value for `id` stays where it is.
pub fn drop_pending<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
) -> Result<()> {
    require!(store.pending(id)?.is_some(), PlatformError::UnknownIdentifier);
    store.remove_pending(id)?;
    state.pending_count = state.pending_count.saturating_sub(1);
    msg!("pending account dropped id={}", id);
    Ok(())
}

/// Consumes the entry for `id`. Returns whether one existed.
pub(crate) fn take_pending<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
) -> Result<bool> {
    if store.pending(id)?.is_none() {
        return Ok(false);
    }
    store.remove_pending(id)?;
    state.pending_count = state.pending_count.saturating_sub(1);
    Ok(true)
}

/// Records a placeholder with an unknown name unless one already exists.
pub(crate) fn ensure_pending<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
    now: i64,
) -> Result<()> {
    if store.pending(id)?.is_none() {
        insert(state, store, id, Pubkey::default(), now)?;
        msg!("pending placeholder added id={}", id);
    }
    Ok(())
}

fn insert<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
    name: Pubkey,
    now: i64,
) -> Result<()> {
    store.save_pending(&PendingAccount {
        platform: state.treasury,
        id,
        name,
        created_at: now,
    })?;
    state.pending_count = state
        .pending_count
        .checked_add(1)
        .ok_or(PlatformError::MathOverflow)?;
    Ok(())
}
