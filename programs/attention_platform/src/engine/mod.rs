//! Platform engine: registry, rounds, payouts, pending accounts, escrow and
//! the airdrop ledger, as plain Rust over the persisted state.
//!
//! Nothing in here touches the runtime. Value moves only through [`Ledger`],
//! per-id records are reached only through [`RegistryStore`], and every
//! invocation enters through [`execute`] or [`airdrop::execute`].

use anchor_lang::prelude::*;

use crate::{
    constants::{INITIAL_ROUND_INDEX, INITIAL_VERSION, MAX_PRECISION},
    errors::PlatformError,
    state::{
        AirdropClaim, Asset, EscrowHold, PendingAccount, PlatformAccount, PlatformState,
        RoundState,
    },
    utils::{AccountToAdd, AttentionRateUpdate},
};

pub mod airdrop;
pub mod escrow;
pub mod payout;
pub mod pending;
pub mod registry;
pub mod round;


/// The external value ledger.
pub trait Ledger {
    fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64>;

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, asset: Asset, memo: &str) -> Result<()>;
}

/// Allow-list of platforms known to the wider system.
pub trait PlatformDirectory {
    fn is_registered(&self, platform: &Pubkey) -> bool;
}

/// Per-id records of one platform.
///
/// `Ok(None)` means the record does not exist. A host that cannot tell
/// (the record was not supplied) fails instead.
pub trait RegistryStore {
    fn account(&self, id: u64) -> Result<Option<PlatformAccount>>;
    fn save_account(&mut self, account: &PlatformAccount) -> Result<()>;
    fn remove_account(&mut self, id: u64) -> Result<()>;

    /// The confirmed account with the highest id below `id` among those the
    /// host can see. The registry checks the link before trusting it.
    fn predecessor(&self, id: u64) -> Result<Option<PlatformAccount>>;

    fn pending(&self, id: u64) -> Result<Option<PendingAccount>>;
    fn save_pending(&mut self, pending: &PendingAccount) -> Result<()>;
    fn remove_pending(&mut self, id: u64) -> Result<()>;

    fn escrow(&self, id: u64) -> Result<Option<EscrowHold>>;
    fn save_escrow(&mut self, hold: &EscrowHold) -> Result<()>;
    fn remove_escrow(&mut self, id: u64) -> Result<()>;
}

/// Fulfilled airdrop grants.
pub trait ClaimStore {
    fn is_claimed(&self, platform: &Pubkey, account: &Pubkey) -> Result<bool>;
    fn record_claim(&mut self, claim: &AirdropClaim) -> Result<()>;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitializeArgs {
    pub token_dealer: Pubkey,
    pub mint: Pubkey,
    pub precision: u8,
    pub airdrop: Option<Pubkey>,
}

/// Ledger names and bumps the host assigns to a platform at creation.
#[derive(Clone, Copy, Debug)]
pub struct PlatformKeys {
    pub authority: Pubkey,
    pub treasury: Pubkey,
    pub treasury_vault: Pubkey,
    pub escrow: Pubkey,
    pub bump: u8,
    pub escrow_bump: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformAction {
    AddCreator {
        creator: Pubkey,
    },
    RemoveCreator {
        creator: Pubkey,
    },
    AddAccount(AccountToAdd),
    AddAccounts(Vec<AccountToAdd>),
    UpdateAttentionRate {
        update: AttentionRateUpdate,
        add_if_missing: bool,
    },
    UpdateAttentionRates {
        updates: Vec<AttentionRateUpdate>,
        add_if_missing: bool,
    },
    DropAccount {
        id: u64,
    },
    Activate {
        id: u64,
    },
    Deactivate {
        id: u64,
    },
    LockUpdate,
    NextRound,
    SendPayments {
        count: u64,
    },
    AddPendingAccount {
        id: u64,
        name: Pubkey,
    },
    DropPendingAccount {
        id: u64,
    },
    TransferToId {
        to_id: u64,
        asset: Asset,
        memo: String,
    },
}

enum Role {
    Owner,
    OwnerOrCreator,
    Anyone,
}

impl PlatformAction {
    /// Owners this action confirms when it succeeds.
    pub fn confirmed_owners(&self) -> Vec<Pubkey> {
        match self {
            PlatformAction::AddAccount(entry) => vec![entry.owner],
            PlatformAction::AddAccounts(entries) => entries.iter().map(|e| e.owner).collect(),
            _ => Vec::new(),
        }
    }

    fn role(&self) -> Role {
        match self {
            PlatformAction::AddAccount(_) | PlatformAction::AddAccounts(_) => Role::OwnerOrCreator,
            PlatformAction::TransferToId { .. } => Role::Anyone,
            PlatformAction::AddCreator { .. }
            | PlatformAction::RemoveCreator { .. }
            | PlatformAction::UpdateAttentionRate { .. }
            | PlatformAction::UpdateAttentionRates { .. }
            | PlatformAction::DropAccount { .. }
            | PlatformAction::Activate { .. }
            | PlatformAction::Deactivate { .. }
            | PlatformAction::LockUpdate
            | PlatformAction::NextRound
            | PlatformAction::SendPayments { .. }
            | PlatformAction::AddPendingAccount { .. }
            | PlatformAction::DropPendingAccount { .. } => Role::Owner,
        }
    }
}

pub fn initialize(state: &mut PlatformState, keys: PlatformKeys, args: InitializeArgs) -> Result<()> {
    require!(!state.initialized, PlatformError::AlreadyInitialized);
    require!(args.precision <= MAX_PRECISION, PlatformError::InvalidArgument);

    *state = PlatformState {
        initialized: true,
        bump: keys.bump,
        authority: keys.authority,
        treasury: keys.treasury,
        treasury_vault: keys.treasury_vault,
        escrow: keys.escrow,
        escrow_bump: keys.escrow_bump,
        token_dealer: args.token_dealer,
        mint: args.mint,
        precision: args.precision,
        airdrop: args.airdrop,
        round: RoundState {
            round_index: INITIAL_ROUND_INDEX,
            ..RoundState::default()
        },
        version: INITIAL_VERSION,
        ..PlatformState::default()
    };

    msg!(
        "platform initialized authority={} mint={} precision={}",
        keys.authority,
        args.mint,
        args.precision
    );
    Ok(())
}

/// Single entry point for every platform instruction.
///
/// Authorization is checked before any state is read beyond the owner
/// fields. On error the caller's host must discard all effects.
pub fn execute<S: RegistryStore, L: Ledger>(
    state: &mut PlatformState,
    signer: &Pubkey,
    action: PlatformAction,
    store: &mut S,
    ledger: &mut L,
    now: i64,
) -> Result<()> {
    require!(state.initialized, PlatformError::NotInitialized);

    match action.role() {
        Role::Owner => require_keys_eq!(*signer, state.authority, PlatformError::Unauthorized),
        Role::OwnerOrCreator => require!(
            *signer == state.authority || state.is_creator(signer),
            PlatformError::Unauthorized
        ),
        Role::Anyone => {}
    }

    match action {
        PlatformAction::AddCreator { creator } => registry::add_creator(state, creator),
        PlatformAction::RemoveCreator { creator } => registry::remove_creator(state, &creator),
        PlatformAction::AddAccount(entry) => {
            registry::add_account(state, store, entry, ledger, now)
        }
        PlatformAction::AddAccounts(entries) => {
            registry::add_accounts(state, store, entries, ledger, now)
        }
        PlatformAction::UpdateAttentionRate {
            update,
            add_if_missing,
        } => registry::update_attention_rate(state, store, update, add_if_missing, now),
        PlatformAction::UpdateAttentionRates {
            updates,
            add_if_missing,
        } => registry::update_attention_rates(state, store, updates, add_if_missing, now),
        PlatformAction::DropAccount { id } => registry::drop_account(state, store, id),
        PlatformAction::Activate { id } => registry::set_active(state, store, id, true),
        PlatformAction::Deactivate { id } => registry::set_active(state, store, id, false),
        PlatformAction::LockUpdate => round::lock(state, now),
        PlatformAction::NextRound => round::next_round(state, ledger, now),
        PlatformAction::SendPayments { count } => {
            payout::send_payments(state, store, count, ledger, now).map(|_| ())
        }
        PlatformAction::AddPendingAccount { id, name } => {
            pending::add_pending(state, store, id, name, now)
        }
        PlatformAction::DropPendingAccount { id } => pending::drop_pending(state, store, id),
        PlatformAction::TransferToId { to_id, asset, memo } => {
            escrow::transfer_to_id(state, store, signer, to_id, asset, &memo, ledger, now)
        }
    }
}
