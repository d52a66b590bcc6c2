// Centralized Protocol Constants

// Registry payload limits
// =======================

/// Exact number of statistic deltas carried by every account record.
pub const STAT_FIELDS: usize = 8;

/// Upper bound on the verification salt supplied with a new account.
pub const MAX_SALT_LEN: usize = 64;

/// Upper bound on the memo attached to an inbound transfer.
pub const MAX_MEMO_LEN: usize = 64;

/// Maximum number of entries accepted by a single multi-id instruction
/// (`add_accounts`, `update_ar_mult`).
pub const MAX_BATCH: usize = 16;

/// Delegates allowed to add accounts besides the registry owner.
pub const MAX_CREATORS: usize = 8;

/// Distinct mints one escrow hold can carry.
pub const MAX_ESCROW_MINTS: usize = 4;

/// Platforms the airdrop ledger can serve.
pub const MAX_AIRDROP_PLATFORMS: usize = 16;

// Value units
// ===========

/// Attention rates are fixed-point with this many decimals (15.0 == 150_000).
pub const ATTENTION_RATE_DECIMALS: u8 = 4;

/// Highest token precision accepted at initialization.
pub const MAX_PRECISION: u8 = 18;

// Rounds
// ======

/// Number of closed-round summaries kept in the platform state.
pub const MAX_ROUND_HISTORY: usize = 16;

/// Round index before the first `next_round`.
pub const INITIAL_ROUND_INDEX: u64 = 0;

// Transfer memos
// ==============

pub const PAYMENT_MEMO: &str = "payment for activity";
pub const ESCROW_RELEASE_MEMO: &str = "escrow release";
pub const FORWARD_MEMO: &str = "transfer to user";
pub const AIRDROP_MEMO: &str = "airdrop payment";

/// Initial version for account structures.
pub const INITIAL_VERSION: u16 = 1;
