use anchor_lang::prelude::*;

pub mod constants;
pub mod contexts;
pub mod engine;
pub mod errors;
pub mod instructions;
pub mod record_store;
#[cfg(not(target_os = "solana"))]
pub mod sandbox;
pub mod state;
pub mod token_ledger;
pub mod utils;

pub use constants::*;
pub use contexts::*;
pub use errors::*;
pub use state::*;
pub use utils::*;

declare_id!("82fXyCMwxT1hnvXntnSDArnGAcnmUwPLttDDCc3aYYci");

#[program]
pub mod attention_platform {
    use super::*;
    use crate::instructions::{admin, airdrop, escrow, pending, registry, round};

    // ----------------------------
    // Platform admin
    // ----------------------------
    pub fn initialize(
        ctx: Context<InitializePlatform>,
        token_dealer: Pubkey,
        precision: u8,
        airdrop: Option<Pubkey>,
    ) -> Result<()> {
        admin::initialize(ctx, token_dealer, precision, airdrop)
    }

    pub fn add_creator<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, creator: Pubkey) -> Result<()> {
        admin::add_creator(ctx, creator)
    }

    pub fn remove_creator<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, creator: Pubkey) -> Result<()> {
        admin::remove_creator(ctx, creator)
    }

    pub fn fund_treasury(ctx: Context<FundTreasury>, amount: u64) -> Result<()> {
        admin::fund_treasury(ctx, amount)
    }

    // ----------------------------
    // Account registry
    // ----------------------------
    pub fn add_account<'info>(
        ctx: Context<'_, '_, 'info, 'info, AddAccounts<'info>>,
        entry: AccountToAdd,
    ) -> Result<()> {
        registry::add_account(ctx, entry)
    }

    pub fn add_accounts<'info>(
        ctx: Context<'_, '_, 'info, 'info, AddAccounts<'info>>,
        entries: Vec<AccountToAdd>,
    ) -> Result<()> {
        registry::add_accounts(ctx, entries)
    }

    pub fn update_ar<'info>(
        ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>,
        update: AttentionRateUpdate,
        add_account_if_not_exist: bool,
    ) -> Result<()> {
        registry::update_ar(ctx, update, add_account_if_not_exist)
    }

    pub fn update_ar_mult<'info>(
        ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>,
        updates: Vec<AttentionRateUpdate>,
        add_account_if_not_exist: bool,
    ) -> Result<()> {
        registry::update_ar_mult(ctx, updates, add_account_if_not_exist)
    }

    pub fn drop_account<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
        registry::drop_account(ctx, id)
    }

    pub fn activate<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
        registry::activate(ctx, id)
    }

    pub fn deactivate<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
        registry::deactivate(ctx, id)
    }

    // ----------------------------
    // Rounds
    // ----------------------------
    pub fn lock_update<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>) -> Result<()> {
        round::lock_update(ctx)
    }

    pub fn next_round<'info>(ctx: Context<'_, '_, 'info, 'info, RunRound<'info>>) -> Result<()> {
        round::next_round(ctx)
    }

    pub fn send_payments<'info>(
        ctx: Context<'_, '_, 'info, 'info, RunRound<'info>>,
        count: u64,
    ) -> Result<()> {
        round::send_payments(ctx, count)
    }

    // ----------------------------
    // Pending accounts and escrow
    // ----------------------------
    pub fn add_pending_account<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64, name: Pubkey) -> Result<()> {
        pending::add_pending_account(ctx, id, name)
    }

    pub fn drop_pending_account<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
        pending::drop_pending_account(ctx, id)
    }

    pub fn transfer_to_user<'info>(
        ctx: Context<'_, '_, 'info, 'info, TransferToUser<'info>>,
        to_id: u64,
        amount: u64,
        memo: String,
    ) -> Result<()> {
        escrow::transfer_to_user(ctx, to_id, amount, memo)
    }

    // ----------------------------
    // Airdrop
    // ----------------------------
    pub fn initialize_airdrop(ctx: Context<InitializeAirdrop>) -> Result<()> {
        airdrop::initialize_airdrop(ctx)
    }

    pub fn add_platform(
        ctx: Context<AddAirdropPlatform>,
        platform: Pubkey,
        amount_per_account: u64,
    ) -> Result<()> {
        airdrop::add_platform(ctx, platform, amount_per_account)
    }

    pub fn update_platform(
        ctx: Context<UpdateAirdropPlatform>,
        platform: Pubkey,
        amount_per_account: u64,
    ) -> Result<()> {
        airdrop::update_platform(ctx, platform, amount_per_account)
    }

    pub fn request<'info>(
        ctx: Context<'_, '_, 'info, 'info, RequestAirdrop<'info>>,
        account: Pubkey,
    ) -> Result<()> {
        airdrop::request(ctx, account)
    }
}
