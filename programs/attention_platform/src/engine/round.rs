//! Open -> Locked -> Paying -> Open.

use anchor_lang::prelude::*;

use crate::{
    constants::MAX_ROUND_HISTORY,
    errors::PlatformError,
    state::{PayoutCursor, PlatformAccount, PlatformState, RoundPhase, RoundState, RoundSummary},
};

use super::Ledger;

/// floor(pool * rate / total_weight), zero when nothing is weighted.
pub fn entitlement_for(pool: u64, rate: u64, total_weight: u64) -> Result<u64> {
    if total_weight == 0 {
        return Ok(0);
    }
    let share = (pool as u128)
        .checked_mul(rate as u128)
        .ok_or(PlatformError::MathOverflow)?
        / total_weight as u128;
    u64::try_from(share).map_err(|_| error!(PlatformError::MathOverflow))
}

/// What `account` is still owed for the round in progress.
///
/// The registry is frozen from lock until the round closes, so the stored
/// rate is the one the weight snapshot was taken over.
pub fn entitlement(round: &RoundState, account: &PlatformAccount) -> Result<u64> {
    if round.phase != RoundPhase::Paying
        || !account.active
        || account.last_paid_round >= round.round_index
    {
        return Ok(0);
    }
    entitlement_for(round.payout_pool, account.attention_rate, round.total_weight)
}

/// Freezes the registry and snapshots the weight the round will be paid on.
pub fn lock(state: &mut PlatformState, now: i64) -> Result<()> {
    require!(state.round.phase == RoundPhase::Open, PlatformError::AlreadyLocked);

    state.round.phase = RoundPhase::Locked;
    state.round.total_weight = state.total_attention_rate;
    state.round.locked_account_count = state.account_count;
    state.round.locked_at = now;

    msg!(
        "round locked index={} accounts={} total_weight={}",
        state.round.round_index,
        state.round.locked_account_count,
        state.round.total_weight
    );
    Ok(())
}

/// Opens the payout walk over `pool`. A round with no weight, no pool or no
/// accounts closes immediately.
pub fn compute_round(state: &mut PlatformState, pool: u64, now: i64) -> Result<()> {
    require!(state.round.phase == RoundPhase::Locked, PlatformError::NotLocked);

    let round_index = state
        .round
        .round_index
        .checked_add(1)
        .ok_or(PlatformError::MathOverflow)?;

    state.round.round_index = round_index;
    state.round.payout_pool = pool;
    state.round.sent_amount = 0;
    state.round.paid_count = 0;
    state.round.cursor = PayoutCursor::start(state.first_account);
    state.round.phase = RoundPhase::Paying;

    msg!(
        "round computed index={} pool={} total_weight={}",
        round_index,
        pool,
        state.round.total_weight
    );

    if pool == 0 || state.round.total_weight == 0 || state.first_account.is_none() {
        close_round(state, now);
    }
    Ok(())
}

/// Computes the round over the treasury's current balance of the reward mint.
pub fn next_round<L: Ledger>(state: &mut PlatformState, ledger: &mut L, now: i64) -> Result<()> {
    require!(state.round.phase == RoundPhase::Locked, PlatformError::NotLocked);
    let pool = ledger.balance(&state.treasury, &state.mint)?;
    compute_round(state, pool, now)
}

pub(crate) fn close_round(state: &mut PlatformState, now: i64) {
    let round = &state.round;
    let summary = RoundSummary {
        round_index: round.round_index,
        account_count: round.locked_account_count,
        total_weight: round.total_weight,
        payout_pool: round.payout_pool,
        sent_amount: round.sent_amount,
        retained: round.payout_pool.saturating_sub(round.sent_amount),
        closed_at: now,
    };

    msg!(
        "round closed index={} paid={} sent={} retained={}",
        summary.round_index,
        round.paid_count,
        summary.sent_amount,
        summary.retained
    );

    state.history.push(summary);
    if state.history.len() > MAX_ROUND_HISTORY {
        let excess = state.history.len() - MAX_ROUND_HISTORY;
        state.history.drain(..excess);
    }

    state.round = RoundState {
        round_index: state.round.round_index,
        ..RoundState::default()
    };
}
