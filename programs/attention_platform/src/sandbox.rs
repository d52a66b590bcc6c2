//! Off-chain host for the engine.
//!
//! Holds every platform with its per-id records, the airdrop ledger and an
//! in-memory token ledger, and applies each invocation all-or-nothing: state
//! is snapshotted before the engine runs and restored if it fails.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::{
    engine::{
        self,
        airdrop::{self, AirdropAction, AirdropKeys},
        ClaimStore, InitializeArgs, Ledger, PlatformAction, PlatformDirectory, PlatformKeys,
        RegistryStore,
    },
    errors::PlatformError,
    state::{
        AirdropClaim, AirdropState, Asset, EscrowHold, PendingAccount, PlatformAccount,
        PlatformState,
    },
    utils::{
        AIRDROP_SEED, AIRDROP_VAULT_SEED, ESCROW_AUTHORITY_SEED, PLATFORM_SEED, TREASURY_VAULT_SEED,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: Pubkey,
    pub to: Pubkey,
    pub asset: Asset,
    pub memo: String,
}

/// Balances keyed by (owner, mint).
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<(Pubkey, Pubkey), u64>,
    transfers: Vec<TransferRecord>,
}

impl MemoryLedger {
    /// Mints `amount` to `owner` out of thin air.
    pub fn credit(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) {
        let balance = self.balances.entry((*owner, *mint)).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }
}

impl Ledger for MemoryLedger {
    fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64> {
        Ok(self.balances.get(&(*owner, *mint)).copied().unwrap_or(0))
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, asset: Asset, memo: &str) -> Result<()> {
        let available = self.balance(from, &asset.mint)?;
        require!(available >= asset.amount, PlatformError::InsufficientFunds);

        if from != to {
            let receiving = self.balance(to, &asset.mint)?;
            let received = receiving
                .checked_add(asset.amount)
                .ok_or(PlatformError::MathOverflow)?;

            self.balances.insert((*from, asset.mint), available - asset.amount);
            self.balances.insert((*to, asset.mint), received);
        }
        self.transfers.push(TransferRecord {
            from: *from,
            to: *to,
            asset,
            memo: memo.to_string(),
        });
        Ok(())
    }
}

/// Per-id records of one platform, each table keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    accounts: BTreeMap<u64, PlatformAccount>,
    pending: BTreeMap<u64, PendingAccount>,
    escrow: BTreeMap<u64, EscrowHold>,
}

impl MemoryStore {
    pub fn confirmed(&self, id: u64) -> Option<&PlatformAccount> {
        self.accounts.get(&id)
    }

    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_ids(&self) -> Vec<u64> {
        self.pending.keys().copied().collect()
    }

    pub fn held(&self, id: u64) -> Option<&EscrowHold> {
        self.escrow.get(&id)
    }

    /// Ids reached by following the links from `first`.
    pub fn walk(&self, first: Option<u64>) -> Vec<u64> {
        let mut ids = Vec::new();
        let mut next = first;
        while let Some(id) = next {
            ids.push(id);
            next = self.accounts.get(&id).and_then(|a| a.next);
        }
        ids
    }
}

impl RegistryStore for MemoryStore {
    fn account(&self, id: u64) -> Result<Option<PlatformAccount>> {
        Ok(self.accounts.get(&id).cloned())
    }

    fn save_account(&mut self, account: &PlatformAccount) -> Result<()> {
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn remove_account(&mut self, id: u64) -> Result<()> {
        self.accounts.remove(&id);
        Ok(())
    }

    fn predecessor(&self, id: u64) -> Result<Option<PlatformAccount>> {
        Ok(self.accounts.range(..id).next_back().map(|(_, a)| a.clone()))
    }

    fn pending(&self, id: u64) -> Result<Option<PendingAccount>> {
        Ok(self.pending.get(&id).cloned())
    }

    fn save_pending(&mut self, pending: &PendingAccount) -> Result<()> {
        self.pending.insert(pending.id, pending.clone());
        Ok(())
    }

    fn remove_pending(&mut self, id: u64) -> Result<()> {
        self.pending.remove(&id);
        Ok(())
    }

    fn escrow(&self, id: u64) -> Result<Option<EscrowHold>> {
        Ok(self.escrow.get(&id).cloned())
    }

    fn save_escrow(&mut self, hold: &EscrowHold) -> Result<()> {
        self.escrow.insert(hold.to_id, hold.clone());
        Ok(())
    }

    fn remove_escrow(&mut self, id: u64) -> Result<()> {
        self.escrow.remove(&id);
        Ok(())
    }
}

/// Fulfilled grants keyed by (platform, account).
#[derive(Clone, Debug, Default)]
pub struct MemoryClaims(BTreeMap<(Pubkey, Pubkey), AirdropClaim>);

impl MemoryClaims {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ClaimStore for MemoryClaims {
    fn is_claimed(&self, platform: &Pubkey, account: &Pubkey) -> Result<bool> {
        Ok(self.0.contains_key(&(*platform, *account)))
    }

    fn record_claim(&mut self, claim: &AirdropClaim) -> Result<()> {
        self.0.insert((claim.platform, claim.account), claim.clone());
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
struct HostedPlatform {
    state: PlatformState,
    records: MemoryStore,
}

struct Platforms<'a>(&'a BTreeMap<Pubkey, HostedPlatform>);

impl PlatformDirectory for Platforms<'_> {
    fn is_registered(&self, platform: &Pubkey) -> bool {
        self.0.get(platform).map_or(false, |p| p.state.initialized)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Sandbox {
    platforms: BTreeMap<Pubkey, HostedPlatform>,
    airdrop: AirdropState,
    claims: MemoryClaims,
    ledger: MemoryLedger,
    now: i64,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn airdrop_key() -> Pubkey {
        Pubkey::find_program_address(&[AIRDROP_SEED], &crate::ID).0
    }

    pub fn platform(&self, authority: &Pubkey) -> Option<&PlatformState> {
        self.platforms.get(authority).map(|p| &p.state)
    }

    pub fn records(&self, authority: &Pubkey) -> Option<&MemoryStore> {
        self.platforms.get(authority).map(|p| &p.records)
    }

    pub fn airdrop(&self) -> &AirdropState {
        &self.airdrop
    }

    pub fn claims(&self) -> &MemoryClaims {
        &self.claims
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        self.ledger.balance(owner, mint).unwrap_or(0)
    }

    pub fn credit(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) {
        self.ledger.credit(owner, mint, amount);
    }

    pub fn advance_clock(&mut self, seconds: i64) {
        self.now += seconds;
    }

    pub fn initialize_platform(&mut self, authority: Pubkey, args: InitializeArgs) -> Result<()> {
        let (treasury, bump) =
            Pubkey::find_program_address(&[PLATFORM_SEED, authority.as_ref()], &crate::ID);
        let (treasury_vault, _) =
            Pubkey::find_program_address(&[TREASURY_VAULT_SEED, treasury.as_ref()], &crate::ID);
        let (escrow, escrow_bump) =
            Pubkey::find_program_address(&[ESCROW_AUTHORITY_SEED, treasury.as_ref()], &crate::ID);

        let keys = PlatformKeys {
            authority,
            treasury,
            treasury_vault,
            escrow,
            bump,
            escrow_bump,
        };
        let mut hosted = self.platforms.get(&authority).cloned().unwrap_or_default();
        engine::initialize(&mut hosted.state, keys, args)?;
        self.platforms.insert(authority, hosted);
        Ok(())
    }

    pub fn initialize_airdrop(&mut self, admin: Pubkey, mint: Pubkey) -> Result<()> {
        let (vault_owner, bump) = Pubkey::find_program_address(&[AIRDROP_SEED], &crate::ID);
        let (vault, _) = Pubkey::find_program_address(&[AIRDROP_VAULT_SEED], &crate::ID);
        let keys = AirdropKeys {
            admin,
            vault_owner,
            vault,
            bump,
        };
        airdrop::initialize(&mut self.airdrop, keys, mint)
    }

    /// Runs `action` against the platform owned by `authority`.
    pub fn execute(&mut self, authority: &Pubkey, signer: &Pubkey, action: PlatformAction) -> Result<()> {
        let snapshot = self.clone();
        let result = self.apply(authority, signer, action);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    pub fn execute_airdrop(&mut self, signer: &Pubkey, action: AirdropAction) -> Result<()> {
        let snapshot = self.clone();
        let result = airdrop::execute(
            &mut self.airdrop,
            signer,
            action,
            &mut self.claims,
            &mut self.ledger,
            &Platforms(&self.platforms),
            self.now,
        );
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    fn apply(&mut self, authority: &Pubkey, signer: &Pubkey, action: PlatformAction) -> Result<()> {
        let hosted = self
            .platforms
            .get_mut(authority)
            .ok_or(PlatformError::NotInitialized)?;

        let owners = action.confirmed_owners();
        engine::execute(
            &mut hosted.state,
            signer,
            action,
            &mut hosted.records,
            &mut self.ledger,
            self.now,
        )?;

        if hosted.state.airdrop == Some(Self::airdrop_key()) && !owners.is_empty() {
            airdrop::grant_on_confirmation(
                &mut self.airdrop,
                *authority,
                &owners,
                &mut self.claims,
                &mut self.ledger,
                &Platforms(&self.platforms),
                self.now,
            )?;
        }
        Ok(())
    }
}
