use anchor_lang::prelude::*;

use crate::{engine::PlatformAction, ManagePlatform};

use super::admin::manage;

pub fn add_pending_account<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64, name: Pubkey) -> Result<()> {
    manage(ctx, PlatformAction::AddPendingAccount { id, name })
}

/// Escrowed transfers for `id` stay in escrow.
pub fn drop_pending_account<'info>(ctx: Context<'_, '_, 'info, 'info, ManagePlatform<'info>>, id: u64) -> Result<()> {
    manage(ctx, PlatformAction::DropPendingAccount { id })
}
