use anchor_lang::prelude::*;

use crate::{
    engine::{
        airdrop::{self, AirdropAction, AirdropKeys},
        PlatformDirectory,
    },
    record_store::{NoClaims, ProgramClaims},
    state::PlatformState,
    token_ledger::{NoTokenAccounts, TokenLedger},
    AddAirdropPlatform, InitializeAirdrop, RequestAirdrop, UpdateAirdropPlatform,
};

use super::{airdrop_seeds, now};

/// On chain a platform is known when its state account exists, is
/// initialized and belongs to that platform.
pub(crate) struct ProvidedPlatform<'a>(pub(crate) Option<&'a PlatformState>);

impl PlatformDirectory for ProvidedPlatform<'_> {
    fn is_registered(&self, platform: &Pubkey) -> bool {
        self.0
            .map_or(false, |state| state.initialized && state.authority == *platform)
    }
}

pub fn initialize_airdrop(ctx: Context<InitializeAirdrop>) -> Result<()> {
    let keys = AirdropKeys {
        admin: ctx.accounts.admin.key(),
        vault_owner: ctx.accounts.airdrop.key(),
        vault: ctx.accounts.vault.key(),
        bump: ctx.bumps.airdrop,
    };
    airdrop::initialize(&mut ctx.accounts.airdrop, keys, ctx.accounts.mint.key())
}

pub fn add_platform(
    ctx: Context<AddAirdropPlatform>,
    platform: Pubkey,
    amount_per_account: u64,
) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    let directory = ProvidedPlatform(Some(&*ctx.accounts.platform));

    airdrop::execute(
        &mut ctx.accounts.airdrop,
        &admin,
        AirdropAction::AddPlatform {
            platform,
            amount_per_account,
        },
        &mut NoClaims,
        &mut NoTokenAccounts,
        &directory,
        now()?,
    )
}

pub fn update_platform(
    ctx: Context<UpdateAirdropPlatform>,
    platform: Pubkey,
    amount_per_account: u64,
) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    airdrop::execute(
        &mut ctx.accounts.airdrop,
        &admin,
        AirdropAction::UpdatePlatform {
            platform,
            amount_per_account,
        },
        &mut NoClaims,
        &mut NoTokenAccounts,
        &ProvidedPlatform(None),
        now()?,
    )
}

/// The claim PDA and the recipient's token account go in
/// `remaining_accounts`.
pub fn request<'info>(
    ctx: Context<'_, '_, 'info, 'info, RequestAirdrop<'info>>,
    account: Pubkey,
) -> Result<()> {
    let platform = ctx.accounts.platform.key();
    let airdrop_key = ctx.accounts.airdrop.key();
    let seeds = airdrop_seeds(ctx.accounts.airdrop.bump);

    let mut ledger = TokenLedger::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts.to_vec(),
    )
    .with_account(ctx.accounts.vault.to_account_info())
    .with_vault(airdrop_key, ctx.accounts.airdrop.vault)
    .with_pda(ctx.accounts.airdrop.to_account_info(), seeds);
    let mut claims = ProgramClaims::new(
        ctx.remaining_accounts,
        ctx.accounts.platform.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
    );

    airdrop::execute(
        &mut ctx.accounts.airdrop,
        &platform,
        AirdropAction::Request { platform, account },
        &mut claims,
        &mut ledger,
        &ProvidedPlatform(Some(&*ctx.accounts.platform_state)),
        now()?,
    )
}
