//! Resumable payout walk over the locked round.
//!
//! Accounts are visited in ascending id order by following the registry's
//! links. The cursor records the last id settled and the next one to visit,
//! so a later call resumes strictly after it. A paid account is stamped with
//! the round index, which keeps an interrupted disbursement from paying
//! anyone twice.

use anchor_lang::prelude::*;

use crate::{
    constants::PAYMENT_MEMO,
    errors::PlatformError,
    state::{Asset, PayoutCursor, PlatformAccount, PlatformState, RoundPhase},
};

use super::{round, Ledger, RegistryStore};

impl PayoutCursor {
    pub fn start(first: Option<u64>) -> Self {
        Self {
            last_paid: None,
            next: first,
        }
    }

    /// True when `id` lies strictly after the settled prefix.
    pub fn admits(&self, id: u64) -> bool {
        self.last_paid.map_or(true, |last| id > last)
    }

    fn advance(&mut self, account: &PlatformAccount) {
        self.last_paid = Some(account.id);
        self.next = account.next;
    }

    pub fn last_paid(&self) -> Option<u64> {
        self.last_paid
    }

    /// Next id the walk will visit; `None` once the list is exhausted.
    pub fn next(&self) -> Option<u64> {
        self.next
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PayoutProgress {
    pub paid: u64,
    pub amount: u64,
    pub closed: bool,
}

/// Pays up to `count` accounts with a nonzero entitlement, stepping over
/// accounts owed nothing, and closes the round when the walk runs off the
/// end of the registry.
pub fn send_payments<S: RegistryStore, L: Ledger>(
    state: &mut PlatformState,
    store: &mut S,
    count: u64,
    ledger: &mut L,
    now: i64,
) -> Result<PayoutProgress> {
    require!(state.round.phase == RoundPhase::Paying, PlatformError::NotPaying);
    require!(count > 0, PlatformError::InvalidArgument);

    let treasury = state.treasury;
    let mint = state.mint;
    let round_index = state.round.round_index;
    let mut progress = PayoutProgress::default();

    while let Some(id) = state.round.cursor.next() {
        if progress.paid == count {
            break;
        }

        let mut account = store.account(id)?.ok_or(PlatformError::UnknownIdentifier)?;
        require!(state.round.cursor.admits(account.id), PlatformError::NeighbourNotProvided);

        let owed = round::entitlement(&state.round, &account)?;
        if owed > 0 {
            ledger.transfer(&treasury, &account.owner, Asset::new(mint, owed), PAYMENT_MEMO)?;
            account.last_paid_round = round_index;
            store.save_account(&account)?;

            progress.paid += 1;
            progress.amount = progress
                .amount
                .checked_add(owed)
                .ok_or(PlatformError::MathOverflow)?;
        }
        state.round.cursor.advance(&account);
    }

    state.round.sent_amount = state
        .round
        .sent_amount
        .checked_add(progress.amount)
        .ok_or(PlatformError::MathOverflow)?;
    state.round.paid_count = state
        .round
        .paid_count
        .checked_add(progress.paid)
        .ok_or(PlatformError::MathOverflow)?;

    msg!(
        "payments sent round={} paid={} amount={} cursor={:?}",
        round_index,
        progress.paid,
        progress.amount,
        state.round.cursor.last_paid()
    );

    if state.round.cursor.next().is_none() {
        round::close_round(state, now);
        progress.closed = true;
    }

    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{MemoryLedger, MemoryStore};

    fn account(id: u64, rate: u64, next: Option<u64>) -> PlatformAccount {
        PlatformAccount {
            platform: Pubkey::default(),
            id,
            owner: Pubkey::new_unique(),
            active: true,
            attention_rate: rate,
            rating_position: 0,
            stat_diff: vec![],
            tweets_ranked_in_period: 0,
            verification_post: 1,
            verification_hash: [0; 32],
            created_at: 0,
            last_paid_round: 0,
            next,
        }
    }

    /// A Paying round over `rates` (ascending ids) with `pool` in the treasury.
    fn paying(
        rates: &[(u64, u64)],
        pool: u64,
        ledger: &mut MemoryLedger,
    ) -> (PlatformState, MemoryStore) {
        let mut store = MemoryStore::default();
        for (i, (id, rate)) in rates.iter().enumerate() {
            let next = rates.get(i + 1).map(|(next, _)| *next);
            store.save_account(&account(*id, *rate, next)).unwrap();
        }

        let mut state = PlatformState {
            initialized: true,
            treasury: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            first_account: rates.first().map(|(id, _)| *id),
            ..PlatformState::default()
        };
        ledger.credit(&state.treasury, &state.mint, pool);
        state.round.phase = RoundPhase::Paying;
        state.round.round_index = 1;
        state.round.payout_pool = pool;
        state.round.total_weight = rates.iter().map(|(_, r)| r).sum();
        state.round.cursor = PayoutCursor::start(state.first_account);
        (state, store)
    }

    #[test]
    fn cursor_admits_only_after_last_paid() {
        let mut cursor = PayoutCursor::start(Some(10));
        assert!(cursor.admits(0));

        cursor.advance(&account(10, 1, Some(12)));
        assert!(!cursor.admits(10));
        assert!(!cursor.admits(3));
        assert!(cursor.admits(11));
        assert_eq!(cursor.next(), Some(12));
    }

    #[test]
    fn payments_outside_paying_fail() {
        let mut ledger = MemoryLedger::default();
        let (mut state, mut store) = paying(&[(1, 5)], 5, &mut ledger);
        state.round.phase = RoundPhase::Open;

        assert_eq!(
            send_payments(&mut state, &mut store, 1, &mut ledger, 0).unwrap_err(),
            PlatformError::NotPaying.into()
        );
        assert!(ledger.transfers().is_empty());
    }

    #[test]
    fn batches_resume_after_cursor() {
        let mut ledger = MemoryLedger::default();
        let (mut state, mut store) = paying(
            &[(123, 15), (1007, 0), (1105, 225), (1200, 206)],
            1000,
            &mut ledger,
        );

        let first = send_payments(&mut state, &mut store, 2, &mut ledger, 0).unwrap();
        assert_eq!(first.paid, 2);
        assert_eq!(first.amount, 537);
        assert!(!first.closed);
        assert_eq!(state.round.cursor.last_paid(), Some(1105));

        let second = send_payments(&mut state, &mut store, 2, &mut ledger, 0).unwrap();
        assert_eq!(second.paid, 1);
        assert!(second.closed);
        assert_eq!(state.round.phase, RoundPhase::Open);
        assert_eq!(state.round.cursor, PayoutCursor::default());

        assert_eq!(ledger.transfers().len(), 3);
        assert_eq!(state.history[0].sent_amount, 998);
        assert_eq!(state.history[0].retained, 2);
    }

    #[test]
    fn walk_closes_only_at_the_end_of_the_list() {
        let mut ledger = MemoryLedger::default();
        let (mut state, mut store) = paying(&[(1, 4), (2, 6), (3, 0)], 10, &mut ledger);

        let progress = send_payments(&mut state, &mut store, 2, &mut ledger, 0).unwrap();
        assert!(!progress.closed);
        assert_eq!(state.round.cursor.next(), Some(3));

        let tail = send_payments(&mut state, &mut store, 2, &mut ledger, 0).unwrap();
        assert_eq!(tail.paid, 0);
        assert!(tail.closed);
        assert_eq!(
            send_payments(&mut state, &mut store, 2, &mut ledger, 0).unwrap_err(),
            PlatformError::NotPaying.into()
        );
    }

    #[test]
    fn inactive_account_is_stepped_over() {
        let mut ledger = MemoryLedger::default();
        let (mut state, mut store) = paying(&[(1, 4), (2, 6)], 10, &mut ledger);
        let mut sleeper = store.confirmed(1).unwrap().clone();
        sleeper.active = false;
        store.save_account(&sleeper).unwrap();
        state.round.total_weight = 6;

        let progress = send_payments(&mut state, &mut store, 5, &mut ledger, 0).unwrap();

        assert_eq!(progress.paid, 1);
        assert_eq!(progress.amount, 10);
        assert_eq!(ledger.balance(&sleeper.owner, &state.mint).unwrap(), 0);
    }

    #[test]
    fn paid_accounts_record_round() {
        let mut ledger = MemoryLedger::default();
        let (mut state, mut store) = paying(&[(1, 4)], 4, &mut ledger);

        send_payments(&mut state, &mut store, 1, &mut ledger, 0).unwrap();

        let record = store.confirmed(1).unwrap();
        assert_eq!(record.last_paid_round, 1);
        assert_eq!(ledger.balance(&record.owner, &state.mint).unwrap(), 4);
    }
}
