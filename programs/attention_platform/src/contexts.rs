use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::state::{AirdropState, PlatformState};

// ----------------------------
// Platform lifecycle
// ----------------------------

#[derive(Accounts)]
pub struct InitializePlatform<'info> {
    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + PlatformState::INIT_SPACE,
        seeds = [crate::PLATFORM_SEED, authority.key().as_ref()],
        bump
    )]
    pub platform: Account<'info, PlatformState>,

    pub mint: Account<'info, Mint>,

    /// Reward pool. Owned by the platform PDA.
    #[account(
        init_if_needed,
        payer = authority,
        seeds = [crate::TREASURY_VAULT_SEED, platform.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = platform
    )]
    pub treasury_vault: Account<'info, TokenAccount>,

    /// CHECK: data-less PDA, signs for the escrow vaults. Address enforced by seeds.
    #[account(
        seeds = [crate::ESCROW_AUTHORITY_SEED, platform.key().as_ref()],
        bump
    )]
    pub escrow_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// Registry and round instructions that move no tokens. The per-id records
/// an action reads or writes go in `remaining_accounts`, along with the
/// predecessor of any id being inserted or dropped.
#[derive(Accounts)]
pub struct ManagePlatform<'info> {
    #[account(
        mut,
        seeds = [crate::PLATFORM_SEED, platform.authority.as_ref()],
        bump = platform.bump
    )]
    pub platform: Account<'info, PlatformState>,

    /// Pays for new records and takes back the rent of closed ones.
    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundTreasury<'info> {
    #[account(
        seeds = [crate::PLATFORM_SEED, platform.authority.as_ref()],
        bump = platform.bump
    )]
    pub platform: Account<'info, PlatformState>,

    #[account(mut, address = platform.treasury_vault)]
    pub treasury_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = platform.mint,
        token::authority = funder
    )]
    pub funder_token: Account<'info, TokenAccount>,

    pub funder: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

// ----------------------------
// Accounts
// ----------------------------

/// `remaining_accounts` carries the new account records with their
/// predecessors, any pending and escrow records of the ids, the escrow
/// vaults and owners' token accounts, and the airdrop vault and claim
/// records when `airdrop` is set.
#[derive(Accounts)]
pub struct AddAccounts<'info> {
    #[account(
        mut,
        seeds = [crate::PLATFORM_SEED, platform.authority.as_ref()],
        bump = platform.bump
    )]
    pub platform: Account<'info, PlatformState>,

    /// CHECK: signs escrow releases. Address enforced by seeds.
    #[account(
        seeds = [crate::ESCROW_AUTHORITY_SEED, platform.key().as_ref()],
        bump = platform.escrow_bump
    )]
    pub escrow_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [crate::AIRDROP_SEED],
        bump = airdrop.bump
    )]
    pub airdrop: Option<Account<'info, AirdropState>>,

    /// Registry owner or one of its creators.
    #[account(mut)]
    pub signer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// ----------------------------
// Rounds
// ----------------------------

/// The account records of the slice being paid and their owners' token
/// accounts go in `remaining_accounts`.
#[derive(Accounts)]
pub struct RunRound<'info> {
    #[account(
        mut,
        seeds = [crate::PLATFORM_SEED, platform.authority.as_ref()],
        bump = platform.bump
    )]
    pub platform: Account<'info, PlatformState>,

    #[account(mut, address = platform.treasury_vault)]
    pub treasury_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// ----------------------------
// Inbound transfers
// ----------------------------

/// The id's account record and escrow hold go in `remaining_accounts`, with
/// the recipient's token account when the id is already confirmed.
#[derive(Accounts)]
pub struct TransferToUser<'info> {
    #[account(
        mut,
        seeds = [crate::PLATFORM_SEED, platform.authority.as_ref()],
        bump = platform.bump
    )]
    pub platform: Account<'info, PlatformState>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = sender
    )]
    pub sender_token: Account<'info, TokenAccount>,

    /// CHECK: owns the escrow vaults. Address enforced by seeds.
    #[account(
        seeds = [crate::ESCROW_AUTHORITY_SEED, platform.key().as_ref()],
        bump = platform.escrow_bump
    )]
    pub escrow_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = sender,
        seeds = [crate::ESCROW_VAULT_SEED, platform.key().as_ref(), mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = escrow_authority
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub sender: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

// ----------------------------
// Airdrop
// ----------------------------

#[derive(Accounts)]
pub struct InitializeAirdrop<'info> {
    #[account(
        init_if_needed,
        payer = admin,
        space = 8 + AirdropState::INIT_SPACE,
        seeds = [crate::AIRDROP_SEED],
        bump
    )]
    pub airdrop: Account<'info, AirdropState>,

    pub mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = admin,
        seeds = [crate::AIRDROP_VAULT_SEED],
        bump,
        token::mint = mint,
        token::authority = airdrop
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct AddAirdropPlatform<'info> {
    #[account(
        mut,
        seeds = [crate::AIRDROP_SEED],
        bump = airdrop.bump
    )]
    pub airdrop: Account<'info, AirdropState>,

    /// State of the platform being added; proves it exists.
    #[account(
        seeds = [crate::PLATFORM_SEED, platform.authority.as_ref()],
        bump = platform.bump
    )]
    pub platform: Account<'info, PlatformState>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct UpdateAirdropPlatform<'info> {
    #[account(
        mut,
        seeds = [crate::AIRDROP_SEED],
        bump = airdrop.bump
    )]
    pub airdrop: Account<'info, AirdropState>,

    pub admin: Signer<'info>,
}

/// The claim record and the recipient's token account go in
/// `remaining_accounts`.
#[derive(Accounts)]
pub struct RequestAirdrop<'info> {
    #[account(
        mut,
        seeds = [crate::AIRDROP_SEED],
        bump = airdrop.bump
    )]
    pub airdrop: Account<'info, AirdropState>,

    #[account(mut, address = airdrop.vault)]
    pub vault: Account<'info, TokenAccount>,

    /// The platform asking for the grant; pays for the claim record.
    #[account(mut)]
    pub platform: Signer<'info>,

    /// Must still exist for every grant.
    #[account(
        seeds = [crate::PLATFORM_SEED, platform.key().as_ref()],
        bump = platform_state.bump
    )]
    pub platform_state: Account<'info, PlatformState>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
