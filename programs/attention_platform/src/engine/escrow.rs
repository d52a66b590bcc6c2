//! Value addressed to identifiers that have no confirmed owner yet.

use anchor_lang::prelude::*;

use crate::{
    constants::{ESCROW_RELEASE_MEMO, FORWARD_MEMO, MAX_ESCROW_MINTS},
    errors::PlatformError,
    state::{Asset, EscrowHold, PlatformState},
    utils::validate_memo,
};

use super::{Ledger, RegistryStore};

/// Adds `asset` to the hold for `to_id`. The value itself must already sit
/// with the escrow name.
pub fn deposit<S: RegistryStore>(
    state: &PlatformState,
    store: &mut S,
    to_id: u64,
    asset: Asset,
    from: Pubkey,
    memo: &str,
    now: i64,
) -> Result<()> {
    let mut hold = store.escrow(to_id)?.unwrap_or_else(|| EscrowHold {
        platform: state.treasury,
        to_id,
        totals: Vec::new(),
        deposit_count: 0,
        created_at: now,
        updated_at: now,
    });

    match hold.totals.iter_mut().find(|a| a.mint == asset.mint) {
        Some(total) => {
            total.amount = total
                .amount
                .checked_add(asset.amount)
                .ok_or(PlatformError::MathOverflow)?;
        }
        None => {
            require!(
                hold.totals.len() < MAX_ESCROW_MINTS,
                PlatformError::TooManyEntries
            );
            hold.totals.push(asset);
        }
    }
    hold.deposit_count = hold.deposit_count.saturating_add(1);
    hold.updated_at = now;
    store.save_escrow(&hold)?;

    msg!(
        "escrow deposit to_id={} from={} mint={} amount={} memo={}",
        to_id,
        from,
        asset.mint,
        asset.amount,
        memo
    );
    Ok(())
}

/// Per-mint totals held for `id`, in first-deposit order.
pub fn escrowed_for<S: RegistryStore>(store: &S, id: u64) -> Result<Vec<Asset>> {
    Ok(store.escrow(id)?.map(|hold| hold.totals).unwrap_or_default())
}

/// Pays every escrowed mint for `id` to `owner` in one transfer per mint and
/// clears the hold. No-op when nothing is held.
pub fn release_all<S: RegistryStore, L: Ledger>(
    state: &PlatformState,
    store: &mut S,
    id: u64,
    owner: &Pubkey,
    ledger: &mut L,
) -> Result<()> {
    let Some(hold) = store.escrow(id)? else {
        return Ok(());
    };

    for asset in hold.totals {
        ledger.transfer(&state.escrow, owner, asset, ESCROW_RELEASE_MEMO)?;
        msg!(
            "escrow released id={} owner={} mint={} amount={}",
            id,
            owner,
            asset.mint,
            asset.amount
        );
    }
    store.remove_escrow(id)
}

/// Inbound transfer addressed by identifier. Confirmed ids are paid
/// directly, anything else is escrowed until confirmation.
#[allow(clippy::too_many_arguments)]
pub fn transfer_to_id<S: RegistryStore, L: Ledger>(
    state: &PlatformState,
    store: &mut S,
    sender: &Pubkey,
    to_id: u64,
    asset: Asset,
    memo: &str,
    ledger: &mut L,
    now: i64,
) -> Result<()> {
    require!(asset.amount > 0, PlatformError::InvalidArgument);
    validate_memo(memo)?;

    if let Some(owner) = store.account(to_id)?.map(|a| a.owner) {
        ledger.transfer(sender, &owner, asset, FORWARD_MEMO)?;
        msg!(
            "transfer forwarded to_id={} owner={} amount={}",
            to_id,
            owner,
            asset.amount
        );
        return Ok(());
    }

    ledger.transfer(sender, &state.escrow, asset, memo)?;
    deposit(state, store, to_id, asset, *sender, memo, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sandbox::{MemoryLedger, MemoryStore},
        state::PlatformAccount,
    };

    fn state_with_escrow() -> PlatformState {
        PlatformState {
            initialized: true,
            escrow: Pubkey::new_unique(),
            ..PlatformState::default()
        }
    }

    #[test]
    fn escrowed_totals_group_by_mint() {
        let state = state_with_escrow();
        let mut store = MemoryStore::default();
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let from = Pubkey::new_unique();

        deposit(&state, &mut store, 9, Asset::new(a, 5), from, "x", 0).unwrap();
        deposit(&state, &mut store, 9, Asset::new(b, 7), from, "y", 0).unwrap();
        deposit(&state, &mut store, 9, Asset::new(a, 3), from, "z", 0).unwrap();
        deposit(&state, &mut store, 10, Asset::new(a, 100), from, "", 0).unwrap();

        assert_eq!(
            escrowed_for(&store, 9).unwrap(),
            vec![Asset::new(a, 8), Asset::new(b, 7)]
        );
        assert_eq!(store.escrow(9).unwrap().unwrap().deposit_count, 3);
        assert!(escrowed_for(&store, 11).unwrap().is_empty());
    }

    #[test]
    fn hold_rejects_one_mint_too_many() {
        let state = state_with_escrow();
        let mut store = MemoryStore::default();
        let from = Pubkey::new_unique();

        for _ in 0..MAX_ESCROW_MINTS {
            deposit(&state, &mut store, 1, Asset::new(Pubkey::new_unique(), 1), from, "", 0)
                .unwrap();
        }
        let err = deposit(&state, &mut store, 1, Asset::new(Pubkey::new_unique(), 1), from, "", 0)
            .unwrap_err();
        assert_eq!(err, PlatformError::TooManyEntries.into());
        assert_eq!(escrowed_for(&store, 1).unwrap().len(), MAX_ESCROW_MINTS);
    }

    #[test]
    fn release_pays_once_per_mint_and_clears() {
        let state = state_with_escrow();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let owner = Pubkey::new_unique();
        ledger.credit(&state.escrow, &a, 8);
        ledger.credit(&state.escrow, &b, 7);

        deposit(&state, &mut store, 9, Asset::new(a, 5), owner, "", 0).unwrap();
        deposit(&state, &mut store, 9, Asset::new(a, 3), owner, "", 0).unwrap();
        deposit(&state, &mut store, 9, Asset::new(b, 7), owner, "", 0).unwrap();

        release_all(&state, &mut store, 9, &owner, &mut ledger).unwrap();

        assert_eq!(ledger.transfers().len(), 2);
        assert_eq!(ledger.balance(&owner, &a).unwrap(), 8);
        assert_eq!(ledger.balance(&owner, &b).unwrap(), 7);
        assert!(store.escrow(9).unwrap().is_none());

        release_all(&state, &mut store, 9, &owner, &mut ledger).unwrap();
        assert_eq!(ledger.transfers().len(), 2);
    }

    #[test]
    fn transfer_to_confirmed_id_is_forwarded() {
        let state = state_with_escrow();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        let mint = Pubkey::new_unique();
        let (sender, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        ledger.credit(&sender, &mint, 50);
        store
            .save_account(&PlatformAccount {
                platform: Pubkey::default(),
                id: 4,
                owner,
                active: true,
                attention_rate: 1,
                rating_position: 0,
                stat_diff: vec![],
                tweets_ranked_in_period: 0,
                verification_post: 1,
                verification_hash: [0; 32],
                created_at: 0,
                last_paid_round: 0,
                next: None,
            })
            .unwrap();

        transfer_to_id(&state, &mut store, &sender, 4, Asset::new(mint, 20), "hi", &mut ledger, 0)
            .unwrap();
        transfer_to_id(&state, &mut store, &sender, 5, Asset::new(mint, 30), "hi", &mut ledger, 0)
            .unwrap();

        assert_eq!(ledger.balance(&owner, &mint).unwrap(), 20);
        assert_eq!(ledger.balance(&state.escrow, &mint).unwrap(), 30);
        assert!(store.escrow(4).unwrap().is_none());
        assert_eq!(escrowed_for(&store, 5).unwrap(), vec![Asset::new(mint, 30)]);
    }

    #[test]
    fn zero_amount_transfer_is_invalid() {
        let state = state_with_escrow();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        let err = transfer_to_id(
            &state,
            &mut store,
            &Pubkey::new_unique(),
            1,
            Asset::new(Pubkey::new_unique(), 0),
            "",
            &mut ledger,
            0,
        )
        .unwrap_err();

        assert_eq!(err, PlatformError::InvalidArgument.into());
        assert!(store.escrow(1).unwrap().is_none());
    }
}
