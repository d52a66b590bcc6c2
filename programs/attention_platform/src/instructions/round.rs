use anchor_lang::prelude::*;

use crate::{
    engine::{self, PlatformAction},
    token_ledger::TokenLedger,
    ManagePlatform, RunRound,
};

use super::{admin::manage, now, platform_seeds, records};

pub fn lock_update<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>) -> Result<()> {
    manage(ctx, PlatformAction::LockUpdate)
}

pub fn next_round<'info>(ctx: Context<'_, '_, 'info, 'info, RunRound<'info>>) -> Result<()> {
    run(ctx, PlatformAction::NextRound)
}

/// Pays the next `count` owed accounts. Call repeatedly until the round is
/// back to Open.
pub fn send_payments<'info>(
    ctx: Context<'_, '_, 'info, 'info, RunRound<'info>>,
    count: u64,
) -> Result<()> {
    run(ctx, PlatformAction::SendPayments { count })
}

fn run<'info>(ctx: Context<'_, '_, 'info, 'info, RunRound<'info>>, action: PlatformAction) -> Result<()> {
    let signer = ctx.accounts.authority.key();
    let platform_key = ctx.accounts.platform.key();
    let seeds = platform_seeds(&ctx.accounts.platform);

    let mut ledger = TokenLedger::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts.to_vec(),
    )
    .with_account(ctx.accounts.treasury_vault.to_account_info())
    .with_vault(platform_key, ctx.accounts.platform.treasury_vault)
    .with_pda(ctx.accounts.platform.to_account_info(), seeds);
    let mut store = records(
        platform_key,
        ctx.remaining_accounts,
        &ctx.accounts.authority,
        &ctx.accounts.system_program,
    );

    engine::execute(
        &mut ctx.accounts.platform,
        &signer,
        action,
        &mut store,
        &mut ledger,
        now()?,
    )
}
