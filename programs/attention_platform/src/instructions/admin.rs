use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::{
    engine::{self, InitializeArgs, PlatformAction, PlatformKeys},
    errors::PlatformError,
    token_ledger::NoTokenAccounts,
    FundTreasury, InitializePlatform, ManagePlatform,
};

use super::{now, records};

pub fn initialize(
    ctx: Context<InitializePlatform>,
    token_dealer: Pubkey,
    precision: u8,
    airdrop: Option<Pubkey>,
) -> Result<()> {
    require!(
        precision == ctx.accounts.mint.decimals,
        PlatformError::MintMismatch
    );

    let keys = PlatformKeys {
        authority: ctx.accounts.authority.key(),
        treasury: ctx.accounts.platform.key(),
        treasury_vault: ctx.accounts.treasury_vault.key(),
        escrow: ctx.accounts.escrow_authority.key(),
        bump: ctx.bumps.platform,
        escrow_bump: ctx.bumps.escrow_authority,
    };
    let args = InitializeArgs {
        token_dealer,
        mint: ctx.accounts.mint.key(),
        precision,
        airdrop,
    };

    engine::initialize(&mut ctx.accounts.platform, keys, args)
}

/// Runs a registry or round action that moves no tokens. The per-id
/// records it touches come in `remaining_accounts`.
pub fn manage<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, action: PlatformAction) -> Result<()> {
    let signer = ctx.accounts.authority.key();
    let mut store = records(
        ctx.accounts.platform.key(),
        ctx.remaining_accounts,
        &ctx.accounts.authority,
        &ctx.accounts.system_program,
    );

    engine::execute(
        &mut ctx.accounts.platform,
        &signer,
        action,
        &mut store,
        &mut NoTokenAccounts,
        now()?,
    )
}

pub fn add_creator<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, creator: Pubkey) -> Result<()> {
    manage(ctx, PlatformAction::AddCreator { creator })
}

pub fn remove_creator<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, creator: Pubkey) -> Result<()> {
    manage(ctx, PlatformAction::RemoveCreator { creator })
}

/// Anyone may top up the reward pool.
pub fn fund_treasury(ctx: Context<FundTreasury>, amount: u64) -> Result<()> {
    require!(ctx.accounts.platform.initialized, PlatformError::NotInitialized);
    require!(amount > 0, PlatformError::InvalidArgument);

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder_token.to_account_info(),
                to: ctx.accounts.treasury_vault.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
    )?;

    msg!(
        "treasury funded platform={} funder={} amount={}",
        ctx.accounts.platform.key(),
        ctx.accounts.funder.key(),
        amount
    );
    Ok(())
}
