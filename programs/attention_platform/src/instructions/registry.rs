use anchor_lang::prelude::*;

use crate::{
    engine::{self, airdrop as airdrop_engine, PlatformAction},
    record_store::ProgramClaims,
    token_ledger::TokenLedger,
    utils::{AccountToAdd, AttentionRateUpdate, ESCROW_VAULT_SEED},
    AddAccounts, ManagePlatform,
};

use super::{admin::manage, airdrop::ProvidedPlatform, airdrop_seeds, escrow_seeds, now, records};

pub fn add_account<'info>(
    ctx: Context<'_, '_, 'info, 'info, AddAccounts<'info>>,
    entry: AccountToAdd,
) -> Result<()> {
    confirm(ctx, PlatformAction::AddAccount(entry))
}

pub fn add_accounts<'info>(
    ctx: Context<'_, '_, 'info, 'info, AddAccounts<'info>>,
    entries: Vec<AccountToAdd>,
) -> Result<()> {
    confirm(ctx, PlatformAction::AddAccounts(entries))
}

fn confirm<'info>(
    ctx: Context<'_, '_, 'info, 'info, AddAccounts<'info>>,
    action: PlatformAction,
) -> Result<()> {
    let signer = ctx.accounts.signer.key();
    let owners = action.confirmed_owners();
    let platform_key = ctx.accounts.platform.key();
    let platform_authority = ctx.accounts.platform.authority;
    let escrow = ctx.accounts.platform.escrow;

    let mut ledger = TokenLedger::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts.to_vec(),
    )
    .with_mint_vaults(escrow, ESCROW_VAULT_SEED, platform_key)
    .with_pda(
        ctx.accounts.escrow_authority.to_account_info(),
        escrow_seeds(&platform_key, ctx.accounts.platform.escrow_bump),
    );
    let mut store = records(
        platform_key,
        ctx.remaining_accounts,
        &ctx.accounts.signer,
        &ctx.accounts.system_program,
    );

    engine::execute(
        &mut ctx.accounts.platform,
        &signer,
        action,
        &mut store,
        &mut ledger,
        now()?,
    )?;

    let linked_airdrop = ctx.accounts.platform.airdrop;
    if let Some(airdrop) = ctx.accounts.airdrop.as_mut() {
        if linked_airdrop == Some(airdrop.key()) {
            let mut ledger = ledger
                .with_vault(airdrop.key(), airdrop.vault)
                .with_pda(airdrop.to_account_info(), airdrop_seeds(airdrop.bump));
            let mut claims = ProgramClaims::new(
                ctx.remaining_accounts,
                ctx.accounts.signer.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            );
            airdrop_engine::grant_on_confirmation(
                airdrop,
                platform_authority,
                &owners,
                &mut claims,
                &mut ledger,
                &ProvidedPlatform(Some(&*ctx.accounts.platform)),
                now()?,
            )?;
        }
    }
    Ok(())
}

pub fn update_ar<'info>(
    ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>,
    update: AttentionRateUpdate,
    add_account_if_not_exist: bool,
) -> Result<()> {
    manage(
        ctx,
        PlatformAction::UpdateAttentionRate {
            update,
            add_if_missing: add_account_if_not_exist,
        },
    )
}

pub fn update_ar_mult<'info>(
    ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>,
    updates: Vec<AttentionRateUpdate>,
    add_account_if_not_exist: bool,
) -> Result<()> {
    manage(
        ctx,
        PlatformAction::UpdateAttentionRates {
            updates,
            add_if_missing: add_account_if_not_exist,
        },
    )
}

pub fn drop_account<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
    manage(ctx, PlatformAction::DropAccount { id })
}

/// Returns the account's weight to the rounds.
pub fn activate<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
    manage(ctx, PlatformAction::Activate { id })
}

/// Keeps the account registered but out of every round until reactivated.
pub fn deactivate<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
    manage(ctx, PlatformAction::Deactivate { id })
}
