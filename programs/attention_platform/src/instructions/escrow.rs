use anchor_lang::prelude::*;

use crate::{
    engine::{self, PlatformAction},
    state::Asset,
    token_ledger::TokenLedger,
    utils::ESCROW_VAULT_SEED,
    TransferToUser,
};

use super::{now, records};

/// Sends `amount` of `mint` to the account registered under `to_id`, or
/// escrows it until that id is confirmed.
pub fn transfer_to_user<'info>(
    ctx: Context<'_, '_, 'info, 'info, TransferToUser<'info>>,
    to_id: u64,
    amount: u64,
    memo: String,
) -> Result<()> {
    let sender = ctx.accounts.sender.key();
    let platform_key = ctx.accounts.platform.key();
    let asset = Asset::new(ctx.accounts.mint.key(), amount);

    let mut ledger = TokenLedger::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts.to_vec(),
    )
    .with_account(ctx.accounts.sender_token.to_account_info())
    .with_account(ctx.accounts.escrow_vault.to_account_info())
    .with_mint_vaults(ctx.accounts.platform.escrow, ESCROW_VAULT_SEED, platform_key)
    .with_signer(ctx.accounts.sender.to_account_info());
    let mut store = records(
        platform_key,
        ctx.remaining_accounts,
        &ctx.accounts.sender,
        &ctx.accounts.system_program,
    );

    engine::execute(
        &mut ctx.accounts.platform,
        &sender,
        PlatformAction::TransferToId { to_id, asset, memo },
        &mut store,
        &mut ledger,
        now()?,
    )
}
