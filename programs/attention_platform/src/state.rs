use anchor_lang::prelude::*;

/// An amount of a single value unit. The mint plays the role of the symbol.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct Asset {
    pub mint: Pubkey,
    pub amount: u64,
}

impl Asset {
    pub fn new(mint: Pubkey, amount: u64) -> Self {
        Self { mint, amount }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub enum RoundPhase {
    #[default]
    Open,
    Locked,
    Paying,
}

/// Resumption marker for the payout walk. Only the payout module moves it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct PayoutCursor {
    pub(crate) last_paid: Option<u64>,
    pub(crate) next: Option<u64>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq, InitSpace)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub round_index: u64,

    // snapshot taken by lock_update
    pub total_weight: u64,
    pub locked_account_count: u64,
    pub locked_at: i64,

    // filled by next_round and the payout walk
    pub payout_pool: u64,
    pub sent_amount: u64,
    pub paid_count: u64,

    pub cursor: PayoutCursor,
}

/// One confirmed account. Lives in its own PDA, seeded by platform and id.
///
/// Confirmed accounts form a singly linked list in ascending id order,
/// headed by `PlatformState::first_account`.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct PlatformAccount {
    pub platform: Pubkey,
    pub id: u64,
    pub owner: Pubkey,

    /// Inactive accounts carry no weight and are never paid.
    pub active: bool,

    /// Fixed-point, see ATTENTION_RATE_DECIMALS.
    pub attention_rate: u64,
    pub rating_position: u32,
    #[max_len(8)]
    pub stat_diff: Vec<u32>,
    pub tweets_ranked_in_period: u8,

    pub verification_post: u64,
    pub verification_hash: [u8; 32],

    pub created_at: i64,

    /// Round whose entitlement was last paid; the account is owed nothing
    /// for any round up to this one.
    pub last_paid_round: u64,

    /// Next confirmed id in ascending order.
    pub next: Option<u64>,
}

#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct PendingAccount {
    pub platform: Pubkey,
    pub id: u64,
    /// Name expected to claim the id; `Pubkey::default()` when unknown.
    pub name: Pubkey,
    pub created_at: i64,
}

/// Value held for an unconfirmed id, summed per mint as deposits arrive.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct EscrowHold {
    pub platform: Pubkey,
    pub to_id: u64,
    #[max_len(4)]
    pub totals: Vec<Asset>,
    pub deposit_count: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct RoundSummary {
    pub round_index: u64,
    pub account_count: u64,
    pub total_weight: u64,
    pub payout_pool: u64,
    pub sent_amount: u64,
    pub retained: u64,
    pub closed_at: i64,
}

#[account]
#[derive(InitSpace, Debug, Default)]
pub struct PlatformState {
    pub initialized: bool,
    pub bump: u8,

    /// Registry owner; signs every registry and round instruction.
    pub authority: Pubkey,

    // ledger names the platform pays from
    pub treasury: Pubkey,
    pub treasury_vault: Pubkey,
    pub escrow: Pubkey,
    pub escrow_bump: u8,

    pub token_dealer: Pubkey,
    pub mint: Pubkey,
    pub precision: u8,
    pub airdrop: Option<Pubkey>,

    pub round: RoundState,

    /// Live sum of attention rates over active confirmed accounts.
    pub total_attention_rate: u64,
    pub account_count: u64,
    pub pending_count: u64,

    /// Lowest confirmed id.
    pub first_account: Option<u64>,

    #[max_len(8)]
    pub creators: Vec<Pubkey>,

    #[max_len(16)]
    pub history: Vec<RoundSummary>,

    pub version: u16,
}

impl PlatformState {
    pub fn is_creator(&self, key: &Pubkey) -> bool {
        self.creators.contains(key)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, InitSpace)]
pub struct AirdropPlatform {
    pub platform: Pubkey,
    pub amount_per_account: u64,
    pub granted_count: u64,
}

/// Marks a fulfilled grant. One PDA per (platform, account).
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct AirdropClaim {
    pub platform: Pubkey,
    pub account: Pubkey,
    pub amount: u64,
    pub claimed_at: i64,
}

#[account]
#[derive(InitSpace, Debug, Default)]
pub struct AirdropState {
    pub initialized: bool,
    pub bump: u8,
    pub admin: Pubkey,

    /// Ledger name holding the airdrop funds.
    pub vault_owner: Pubkey,
    pub vault: Pubkey,
    pub mint: Pubkey,

    #[max_len(16)]
    pub platforms: Vec<AirdropPlatform>,

    pub version: u16,
}

impl AirdropState {
    pub fn platform_index(&self, platform: &Pubkey) -> Option<usize> {
        self.platforms.iter().position(|p| p.platform == *platform)
    }
}
