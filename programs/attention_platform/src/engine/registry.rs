//! Confirmed accounts and their attention rates.
//!
//! Records are kept in ascending id order as a linked list so the payout walk
//! can visit them one at a time. Every insert and unlink checks the
//! neighbour the store hands back, so a host that only sees part of the list
//! can never corrupt it.

use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_BATCH, MAX_CREATORS},
    errors::PlatformError,
    state::{PlatformAccount, PlatformState, RoundPhase},
    utils::{
        format_rate, validate_stat_diff, validate_verification, verification_digest,
        AccountToAdd, AttentionRateUpdate,
    },
};

use super::{escrow, pending, Ledger, RegistryStore};

fn require_open(state: &PlatformState) -> Result<()> {
    require!(state.round.phase == RoundPhase::Open, PlatformError::RoundLocked);
    Ok(())
}

fn validate_entry(entry: &AccountToAdd) -> Result<()> {
    require!(entry.owner != Pubkey::default(), PlatformError::InvalidArgument);
    validate_stat_diff(&entry.stat_diff)?;
    validate_verification(entry.verification_post, &entry.verification_salt)
}

fn new_record(platform: Pubkey, entry: AccountToAdd, now: i64) -> PlatformAccount {
    PlatformAccount {
        platform,
        id: entry.id,
        owner: entry.owner,
        active: true,
        attention_rate: entry.attention_rate,
        rating_position: 0,
        tweets_ranked_in_period: 0,
        verification_post: entry.verification_post,
        verification_hash: verification_digest(
            entry.id,
            entry.verification_post,
            &entry.verification_salt,
        ),
        stat_diff: entry.stat_diff,
        created_at: now,
        last_paid_round: 0,
        next: None,
    }
}

/// Splices `record` into the list after its predecessor.
fn link<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    mut record: PlatformAccount,
) -> Result<()> {
    let id = record.id;
    match store.predecessor(id)? {
        Some(mut prev) => {
            require!(
                prev.next.map_or(true, |next| next > id),
                PlatformError::NeighbourNotProvided
            );
            record.next = prev.next;
            prev.next = Some(id);
            store.save_account(&prev)?;
        }
        None => {
            require!(
                state.first_account.map_or(true, |first| first > id),
                PlatformError::NeighbourNotProvided
            );
            record.next = state.first_account;
            state.first_account = Some(id);
        }
    }
    store.save_account(&record)
}

fn unlink<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    record: &PlatformAccount,
) -> Result<()> {
    match store.predecessor(record.id)? {
        Some(mut prev) => {
            require!(prev.next == Some(record.id), PlatformError::NeighbourNotProvided);
            prev.next = record.next;
            store.save_account(&prev)?;
        }
        None => {
            require!(
                state.first_account == Some(record.id),
                PlatformError::NeighbourNotProvided
            );
            state.first_account = record.next;
        }
    }
    store.remove_account(record.id)
}

/// Inserts a validated record, consumes the matching pending entry and
/// releases escrowed value to the new owner.
fn confirm<S: RegistryStore, L: Ledger>(
    state: &mut PlatformState,
    store: &mut S,
    entry: AccountToAdd,
    ledger: &mut L,
    now: i64,
) -> Result<()> {
    require!(
        store.account(entry.id)?.is_none(),
        PlatformError::DuplicateIdentifier
    );

    let total = state
        .total_attention_rate
        .checked_add(entry.attention_rate)
        .ok_or(PlatformError::MathOverflow)?;
    let count = state
        .account_count
        .checked_add(1)
        .ok_or(PlatformError::MathOverflow)?;

    let id = entry.id;
    let owner = entry.owner;
    let rate = entry.attention_rate;

    link(state, store, new_record(state.treasury, entry, now))?;
    state.total_attention_rate = total;
    state.account_count = count;

    if pending::take_pending(state, store, id)? {
        msg!("pending account reconciled id={}", id);
    }
    escrow::release_all(state, store, id, &owner, ledger)?;

    msg!("account added id={} owner={} rate={}", id, owner, format_rate(rate));
    Ok(())
}

pub fn add_account<S: RegistryStore, L: Ledger>(
    state: &mut PlatformState,
    store: &mut S,
    entry: AccountToAdd,
    ledger: &mut L,
    now: i64,
) -> Result<()> {
    require_open(state)?;
    validate_entry(&entry)?;
    confirm(state, store, entry, ledger, now)
}

/// All-or-nothing: every entry is validated before the first is inserted.
pub fn add_accounts<S: RegistryStore, L: Ledger>(
    state: &mut PlatformState,
    store: &mut S,
    entries: Vec<AccountToAdd>,
    ledger: &mut L,
    now: i64,
) -> Result<()> {
    require_open(state)?;
    require!(!entries.is_empty(), PlatformError::InvalidArgument);
    require!(entries.len() <= MAX_BATCH, PlatformError::TooManyEntries);

    let mut added_rate: u64 = 0;
    for (i, entry) in entries.iter().enumerate() {
        validate_entry(entry)?;
        require!(
            store.account(entry.id)?.is_none(),
            PlatformError::DuplicateIdentifier
        );
        require!(
            entries[..i].iter().all(|e| e.id != entry.id),
            PlatformError::DuplicateIdentifier
        );
        added_rate = added_rate
            .checked_add(entry.attention_rate)
            .ok_or(PlatformError::MathOverflow)?;
    }
    state
        .total_attention_rate
        .checked_add(added_rate)
        .ok_or(PlatformError::MathOverflow)?;

    for entry in entries {
        confirm(state, store, entry, ledger, now)?;
    }
    Ok(())
}

fn apply_update(record: &mut PlatformAccount, update: AttentionRateUpdate) {
    record.attention_rate = update.attention_rate;
    record.rating_position = update.rating_position;
    record.stat_diff = update.stat_diff;
    record.tweets_ranked_in_period = update.tweets_ranked_in_period;
}

pub fn update_attention_rate<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    update: AttentionRateUpdate,
    add_if_missing: bool,
    now: i64,
) -> Result<()> {
    update_attention_rates(state, store, vec![update], add_if_missing, now)
}

/// All-or-nothing over the batch. An absent id fails the whole batch unless
/// `add_if_missing` is set, in which case a pending placeholder is recorded.
pub fn update_attention_rates<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    updates: Vec<AttentionRateUpdate>,
    add_if_missing: bool,
    now: i64,
) -> Result<()> {
    require_open(state)?;
    require!(!updates.is_empty(), PlatformError::InvalidArgument);
    require!(updates.len() <= MAX_BATCH, PlatformError::TooManyEntries);

    let mut total = state.total_attention_rate;
    let mut records = Vec::with_capacity(updates.len());
    for (i, update) in updates.iter().enumerate() {
        validate_stat_diff(&update.stat_diff)?;
        require!(
            updates[..i].iter().all(|u| u.id != update.id),
            PlatformError::InvalidArgument
        );

        let record = store.account(update.id)?;
        match &record {
            Some(record) if record.active => {
                total = total
                    .checked_sub(record.attention_rate)
                    .and_then(|t| t.checked_add(update.attention_rate))
                    .ok_or(PlatformError::MathOverflow)?;
            }
            Some(_) => {}
            None => require!(add_if_missing, PlatformError::UnknownIdentifier),
        }
        records.push(record);
    }

    for (update, record) in updates.into_iter().zip(records) {
        match record {
            Some(mut record) => {
                apply_update(&mut record, update);
                store.save_account(&record)?;
            }
            None => pending::ensure_pending(state, store, update.id, now)?,
        }
    }
    state.total_attention_rate = total;

    Ok(())
}

pub fn drop_account<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
) -> Result<()> {
    require_open(state)?;

    let record = store.account(id)?.ok_or(PlatformError::UnknownIdentifier)?;
    unlink(state, store, &record)?;

    if record.active {
        state.total_attention_rate = state
            .total_attention_rate
            .checked_sub(record.attention_rate)
            .ok_or(PlatformError::MathOverflow)?;
    }
    state.account_count = state.account_count.saturating_sub(1);

    msg!("account dropped id={} owner={}", id, record.owner);
    Ok(())
}

/// Moves an account's weight in or out of the rounds. Setting the flag it
/// already has is a no-op.
pub fn set_active<S: RegistryStore>(
    state: &mut PlatformState,
    store: &mut S,
    id: u64,
    active: bool,
) -> Result<()> {
    require_open(state)?;

    let mut record = store.account(id)?.ok_or(PlatformError::UnknownIdentifier)?;
    if record.active == active {
        return Ok(());
    }

    let total = if active {
        state.total_attention_rate.checked_add(record.attention_rate)
    } else {
        state.total_attention_rate.checked_sub(record.attention_rate)
    };
    state.total_attention_rate = total.ok_or(PlatformError::MathOverflow)?;

    record.active = active;
    store.save_account(&record)?;

    msg!("account id={} active={}", id, active);
    Ok(())
}

pub fn add_creator(state: &mut PlatformState, creator: Pubkey) -> Result<()> {
    require!(!state.is_creator(&creator), PlatformError::AlreadyRegistered);
    require!(state.creators.len() < MAX_CREATORS, PlatformError::TooManyEntries);
    state.creators.push(creator);
    Ok(())
}

pub fn remove_creator(state: &mut PlatformState, creator: &Pubkey) -> Result<()> {
    let index = state
        .creators
        .iter()
        .position(|c| c == creator)
        .ok_or(PlatformError::UnknownIdentifier)?;
    state.creators.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::STAT_FIELDS,
        sandbox::{MemoryLedger, MemoryStore},
        state::{EscrowHold, PendingAccount},
    };

    fn open_state() -> PlatformState {
        PlatformState {
            initialized: true,
            ..PlatformState::default()
        }
    }

    fn entry(id: u64, rate: u64) -> AccountToAdd {
        AccountToAdd {
            id,
            owner: Pubkey::new_unique(),
            attention_rate: rate,
            stat_diff: vec![0; STAT_FIELDS],
            verification_post: 1,
            verification_salt: "salt".to_string(),
        }
    }

    fn update(id: u64, rate: u64) -> AttentionRateUpdate {
        AttentionRateUpdate {
            id,
            attention_rate: rate,
            rating_position: 3,
            stat_diff: vec![1; STAT_FIELDS],
            tweets_ranked_in_period: 2,
        }
    }

    /// Hands out no neighbours, like a host given none of the list.
    struct Blind(MemoryStore);

    impl RegistryStore for Blind {
        fn account(&self, id: u64) -> Result<Option<PlatformAccount>> {
            self.0.account(id)
        }
        fn save_account(&mut self, account: &PlatformAccount) -> Result<()> {
            self.0.save_account(account)
        }
        fn remove_account(&mut self, id: u64) -> Result<()> {
            self.0.remove_account(id)
        }
        fn predecessor(&self, _id: u64) -> Result<Option<PlatformAccount>> {
            Ok(None)
        }
        fn pending(&self, id: u64) -> Result<Option<PendingAccount>> {
            self.0.pending(id)
        }
        fn save_pending(&mut self, pending: &PendingAccount) -> Result<()> {
            self.0.save_pending(pending)
        }
        fn remove_pending(&mut self, id: u64) -> Result<()> {
            self.0.remove_pending(id)
        }
        fn escrow(&self, id: u64) -> Result<Option<EscrowHold>> {
            self.0.escrow(id)
        }
        fn save_escrow(&mut self, hold: &EscrowHold) -> Result<()> {
            self.0.save_escrow(hold)
        }
        fn remove_escrow(&mut self, id: u64) -> Result<()> {
            self.0.remove_escrow(id)
        }
    }

    #[test]
    fn accounts_stay_sorted_by_id() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();

        for id in [1200, 123, 1105, 1007] {
            add_account(&mut state, &mut store, entry(id, 10), &mut ledger, 0).unwrap();
        }

        assert_eq!(store.walk(state.first_account), vec![123, 1007, 1105, 1200]);
        assert_eq!(state.total_attention_rate, 40);
        assert_eq!(state.account_count, 4);
    }

    #[test]
    fn drop_relinks_neighbours() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        for id in [1, 2, 3] {
            add_account(&mut state, &mut store, entry(id, 5), &mut ledger, 0).unwrap();
        }

        drop_account(&mut state, &mut store, 2).unwrap();
        assert_eq!(store.walk(state.first_account), vec![1, 3]);

        drop_account(&mut state, &mut store, 1).unwrap();
        assert_eq!(state.first_account, Some(3));
        assert_eq!(store.walk(state.first_account), vec![3]);
        assert_eq!(state.total_attention_rate, 5);
        assert_eq!(state.account_count, 1);
    }

    #[test]
    fn insert_without_its_neighbour_is_refused() {
        let mut state = open_state();
        let mut store = Blind(MemoryStore::default());
        let mut ledger = MemoryLedger::default();

        add_account(&mut state, &mut store, entry(10, 1), &mut ledger, 0).unwrap();
        add_account(&mut state, &mut store, entry(5, 1), &mut ledger, 0).unwrap();

        let err = add_account(&mut state, &mut store, entry(20, 1), &mut ledger, 0).unwrap_err();
        assert_eq!(err, PlatformError::NeighbourNotProvided.into());
        assert_eq!(
            drop_account(&mut state, &mut store, 10).unwrap_err(),
            PlatformError::NeighbourNotProvided.into()
        );
        assert_eq!(store.0.walk(state.first_account), vec![5, 10]);
    }

    #[test]
    fn duplicate_id_is_rejected_without_mutation() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(123, 15), &mut ledger, 0).unwrap();
        let before = store.clone();

        let err =
            add_account(&mut state, &mut store, entry(123, 26), &mut ledger, 0).unwrap_err();
        assert_eq!(err, PlatformError::DuplicateIdentifier.into());
        assert_eq!(store, before);
        assert_eq!(state.total_attention_rate, 15);
    }

    #[test]
    fn malformed_payloads_are_invalid() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();

        let mut short_stats = entry(1, 1);
        short_stats.stat_diff.pop();
        let mut no_salt = entry(2, 1);
        no_salt.verification_salt.clear();
        let mut no_owner = entry(3, 1);
        no_owner.owner = Pubkey::default();

        for bad in [short_stats, no_salt, no_owner] {
            let err = add_account(&mut state, &mut store, bad, &mut ledger, 0).unwrap_err();
            assert_eq!(err, PlatformError::InvalidArgument.into());
        }
        assert_eq!(state.first_account, None);
    }

    #[test]
    fn batch_add_is_all_or_nothing() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(5, 1), &mut ledger, 0).unwrap();

        let err = add_accounts(
            &mut state,
            &mut store,
            vec![entry(6, 1), entry(5, 1)],
            &mut ledger,
            0,
        )
        .unwrap_err();
        assert_eq!(err, PlatformError::DuplicateIdentifier.into());
        assert_eq!(state.account_count, 1);

        let err = add_accounts(
            &mut state,
            &mut store,
            vec![entry(7, 1), entry(7, 2)],
            &mut ledger,
            0,
        )
        .unwrap_err();
        assert_eq!(err, PlatformError::DuplicateIdentifier.into());
        assert_eq!(state.account_count, 1);

        add_accounts(
            &mut state,
            &mut store,
            vec![entry(7, 1), entry(6, 2)],
            &mut ledger,
            0,
        )
        .unwrap();
        assert_eq!(store.walk(state.first_account), vec![5, 6, 7]);
        assert_eq!(state.total_attention_rate, 4);
    }

    #[test]
    fn update_replaces_rate_and_metadata() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(123, 150_000), &mut ledger, 0).unwrap();

        update_attention_rate(&mut state, &mut store, update(123, 200_000), false, 0).unwrap();

        let record = store.confirmed(123).unwrap();
        assert_eq!(record.attention_rate, 200_000);
        assert_eq!(record.rating_position, 3);
        assert_eq!(record.tweets_ranked_in_period, 2);
        assert_eq!(record.stat_diff, vec![1; STAT_FIELDS]);
        assert_eq!(state.total_attention_rate, 200_000);
    }

    #[test]
    fn batch_update_with_unknown_id_changes_nothing() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(123, 15), &mut ledger, 0).unwrap();
        add_account(&mut state, &mut store, entry(243, 8), &mut ledger, 0).unwrap();
        let before = store.clone();

        let err = update_attention_rates(
            &mut state,
            &mut store,
            vec![update(243, 20), update(250, 20)],
            false,
            0,
        )
        .unwrap_err();

        assert_eq!(err, PlatformError::UnknownIdentifier.into());
        assert_eq!(store, before);
        assert_eq!(state.total_attention_rate, 23);
    }

    #[test]
    fn missing_id_becomes_pending_when_flag_set() {
        let mut state = open_state();
        let mut store = MemoryStore::default();

        update_attention_rates(&mut state, &mut store, vec![update(77, 5)], true, 9).unwrap();

        assert!(store.confirmed(77).is_none());
        assert!(store.is_pending(77));
        assert_eq!(state.pending_count, 1);
        assert_eq!(state.total_attention_rate, 0);
    }

    #[test]
    fn mutation_is_rejected_outside_open() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(1105, 225), &mut ledger, 0).unwrap();
        state.round.phase = RoundPhase::Locked;
        let before = store.clone();

        let locked: Error = PlatformError::RoundLocked.into();
        assert_eq!(
            update_attention_rate(&mut state, &mut store, update(1105, 20), false, 0).unwrap_err(),
            locked
        );
        assert_eq!(
            add_account(&mut state, &mut store, entry(123, 15), &mut ledger, 0).unwrap_err(),
            locked
        );
        assert_eq!(drop_account(&mut state, &mut store, 1105).unwrap_err(), locked);
        assert_eq!(set_active(&mut state, &mut store, 1105, false).unwrap_err(), locked);
        assert_eq!(store, before);
    }

    #[test]
    fn drop_account_removes_weight() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(1, 10), &mut ledger, 0).unwrap();
        add_account(&mut state, &mut store, entry(2, 5), &mut ledger, 0).unwrap();

        drop_account(&mut state, &mut store, 1).unwrap();
        assert_eq!(state.total_attention_rate, 5);
        assert_eq!(
            drop_account(&mut state, &mut store, 1).unwrap_err(),
            PlatformError::UnknownIdentifier.into()
        );
    }

    #[test]
    fn deactivation_moves_weight_out_and_back() {
        let mut state = open_state();
        let mut store = MemoryStore::default();
        let mut ledger = MemoryLedger::default();
        add_account(&mut state, &mut store, entry(1, 10), &mut ledger, 0).unwrap();
        add_account(&mut state, &mut store, entry(2, 5), &mut ledger, 0).unwrap();

        set_active(&mut state, &mut store, 1, false).unwrap();
        set_active(&mut state, &mut store, 1, false).unwrap();
        assert_eq!(state.total_attention_rate, 5);
        assert!(!store.confirmed(1).unwrap().active);

        // rate changes on an inactive account do not touch the live total
        update_attention_rate(&mut state, &mut store, update(1, 40), false, 0).unwrap();
        assert_eq!(state.total_attention_rate, 5);

        set_active(&mut state, &mut store, 1, true).unwrap();
        assert_eq!(state.total_attention_rate, 45);

        set_active(&mut state, &mut store, 1, false).unwrap();
        drop_account(&mut state, &mut store, 1).unwrap();
        assert_eq!(state.total_attention_rate, 5);

        assert_eq!(
            set_active(&mut state, &mut store, 9, true).unwrap_err(),
            PlatformError::UnknownIdentifier.into()
        );
    }

    #[test]
    fn creators_are_unique_and_capped() {
        let mut state = open_state();
        let creator = Pubkey::new_unique();

        add_creator(&mut state, creator).unwrap();
        assert!(add_creator(&mut state, creator).is_err());
        remove_creator(&mut state, &creator).unwrap();
        assert!(remove_creator(&mut state, &creator).is_err());

        for _ in 0..MAX_CREATORS {
            add_creator(&mut state, Pubkey::new_unique()).unwrap();
        }
        assert_eq!(
            add_creator(&mut state, Pubkey::new_unique()).unwrap_err(),
            PlatformError::TooManyEntries.into()
        );
    }
}
