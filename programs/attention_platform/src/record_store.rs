use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    program::{invoke, invoke_signed},
    system_instruction,
};
use anchor_lang::system_program;

use crate::{
    engine::{ClaimStore, RegistryStore},
    errors::PlatformError,
    state::{AirdropClaim, EscrowHold, PendingAccount, PlatformAccount},
    utils::{required_space, ACCOUNT_SEED, AIRDROP_CLAIM_SEED, ESCROW_HOLD_SEED, PENDING_SEED},
};

/// Program-owned record PDAs passed in `remaining_accounts`.
///
/// Each record lives at a canonical address derived from its seeds. Records
/// are created on first write, paid for by `payer`, and closed back to it.
struct Records<'a, 'info> {
    candidates: &'a [AccountInfo<'info>],
    payer: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
}

impl<'a, 'info> Records<'a, 'info> {
    fn locate(&self, seeds: &[&[u8]]) -> Result<(AccountInfo<'info>, u8)> {
        let (address, bump) = Pubkey::find_program_address(seeds, &crate::ID);
        match self.candidates.iter().find(|info| *info.key == address) {
            Some(info) => Ok((info.clone(), bump)),
            None => {
                msg!("record not provided address={}", address);
                Err(error!(PlatformError::RecordNotProvided))
            }
        }
    }

    fn create(&self, info: &AccountInfo<'info>, signer: &[&[u8]], space: usize) -> Result<()> {
        let rent = Rent::get()?.minimum_balance(space);
        let current = info.lamports();
        let signers: &[&[&[u8]]] = &[signer];

        if current == 0 {
            let ix = system_instruction::create_account(
                self.payer.key,
                info.key,
                rent,
                space as u64,
                &crate::ID,
            );
            invoke_signed(
                &ix,
                &[self.payer.clone(), info.clone(), self.system_program.clone()],
                signers,
            )?;
            return Ok(());
        }

        // Someone pre-funded the address; create_account would refuse it.
        let top_up = rent.saturating_sub(current);
        if top_up > 0 {
            invoke(
                &system_instruction::transfer(self.payer.key, info.key, top_up),
                &[self.payer.clone(), info.clone(), self.system_program.clone()],
            )?;
        }
        invoke_signed(
            &system_instruction::allocate(info.key, space as u64),
            &[info.clone(), self.system_program.clone()],
            signers,
        )?;
        invoke_signed(
            &system_instruction::assign(info.key, &crate::ID),
            &[info.clone(), self.system_program.clone()],
            signers,
        )?;
        Ok(())
    }

    fn write<T>(&self, seeds: &[&[u8]], value: &T) -> Result<()>
    where
        T: AccountSerialize + AnchorSerialize + Space,
    {
        let (info, bump) = self.locate(seeds)?;
        if info.owner != &crate::ID {
            let bump = [bump];
            let mut signer = seeds.to_vec();
            signer.push(&bump);
            self.create(&info, &signer, 8 + T::INIT_SPACE)?;
        }

        require!(
            required_space(value)? <= info.data_len(),
            PlatformError::InvalidArgument
        );

        let mut data = info.try_borrow_mut_data()?;
        let mut w = std::io::Cursor::new(&mut data[..]);
        value.try_serialize(&mut w)
    }

    fn read<T: AccountDeserialize>(&self, seeds: &[&[u8]]) -> Result<Option<T>> {
        let (info, _) = self.locate(seeds)?;
        load(&info)
    }

    fn close(&self, seeds: &[&[u8]]) -> Result<()> {
        let (info, _) = self.locate(seeds)?;
        if info.owner != &crate::ID {
            return Ok(());
        }
        let refund = info.lamports();
        info.sub_lamports(refund)?;
        self.payer.add_lamports(refund)?;
        info.assign(&system_program::ID);
        info.resize(0)?;
        Ok(())
    }
}

/// `None` for an address that holds no record of ours.
fn load<T: AccountDeserialize>(info: &AccountInfo) -> Result<Option<T>> {
    if info.owner != &crate::ID || info.data_is_empty() {
        return Ok(None);
    }
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..]).map(Some)
}

/// `RegistryStore` over the per-id PDAs of one platform.
pub struct ProgramStore<'a, 'info> {
    platform: Pubkey,
    records: Records<'a, 'info>,
}

impl<'a, 'info> ProgramStore<'a, 'info> {
    pub fn new(
        platform: Pubkey,
        candidates: &'a [AccountInfo<'info>],
        payer: AccountInfo<'info>,
        system_program: AccountInfo<'info>,
    ) -> Self {
        Self {
            platform,
            records: Records {
                candidates,
                payer,
                system_program,
            },
        }
    }

    pub fn account_address(platform: &Pubkey, id: u64) -> Pubkey {
        let id = id.to_le_bytes();
        Pubkey::find_program_address(&[ACCOUNT_SEED, platform.as_ref(), &id], &crate::ID).0
    }
}

impl RegistryStore for ProgramStore<'_, '_> {
    fn account(&self, id: u64) -> Result<Option<PlatformAccount>> {
        let id = id.to_le_bytes();
        self.records
            .read(&[ACCOUNT_SEED, self.platform.as_ref(), &id])
    }

    fn save_account(&mut self, account: &PlatformAccount) -> Result<()> {
        let id = account.id.to_le_bytes();
        self.records
            .write(&[ACCOUNT_SEED, self.platform.as_ref(), &id], account)
    }

    fn remove_account(&mut self, id: u64) -> Result<()> {
        let id = id.to_le_bytes();
        self.records.close(&[ACCOUNT_SEED, self.platform.as_ref(), &id])
    }

    /// Scans the supplied records. The caller proves adjacency by passing
    /// the predecessor; the registry rejects a link that skips one.
    fn predecessor(&self, id: u64) -> Result<Option<PlatformAccount>> {
        let mut best: Option<PlatformAccount> = None;
        for info in self.records.candidates {
            let Ok(Some(record)) = load::<PlatformAccount>(info) else {
                continue;
            };
            if record.platform != self.platform || record.id >= id {
                continue;
            }
            if best.as_ref().map_or(true, |b| record.id > b.id) {
                best = Some(record);
            }
        }
        Ok(best)
    }

    fn pending(&self, id: u64) -> Result<Option<PendingAccount>> {
        let id = id.to_le_bytes();
        self.records
            .read(&[PENDING_SEED, self.platform.as_ref(), &id])
    }

    fn save_pending(&mut self, pending: &PendingAccount) -> Result<()> {
        let id = pending.id.to_le_bytes();
        self.records
            .write(&[PENDING_SEED, self.platform.as_ref(), &id], pending)
    }

    fn remove_pending(&mut self, id: u64) -> Result<()> {
        let id = id.to_le_bytes();
        self.records.close(&[PENDING_SEED, self.platform.as_ref(), &id])
    }

    fn escrow(&self, id: u64) -> Result<Option<EscrowHold>> {
        let id = id.to_le_bytes();
        self.records
            .read(&[ESCROW_HOLD_SEED, self.platform.as_ref(), &id])
    }

    fn save_escrow(&mut self, hold: &EscrowHold) -> Result<()> {
        let id = hold.to_id.to_le_bytes();
        self.records
            .write(&[ESCROW_HOLD_SEED, self.platform.as_ref(), &id], hold)
    }

    fn remove_escrow(&mut self, id: u64) -> Result<()> {
        let id = id.to_le_bytes();
        self.records
            .close(&[ESCROW_HOLD_SEED, self.platform.as_ref(), &id])
    }
}

/// `ClaimStore` over one PDA per (platform, account).
pub struct ProgramClaims<'a, 'info> {
    records: Records<'a, 'info>,
}

impl<'a, 'info> ProgramClaims<'a, 'info> {
    pub fn new(
        candidates: &'a [AccountInfo<'info>],
        payer: AccountInfo<'info>,
        system_program: AccountInfo<'info>,
    ) -> Self {
        Self {
            records: Records {
                candidates,
                payer,
                system_program,
            },
        }
    }
}

impl ClaimStore for ProgramClaims<'_, '_> {
    fn is_claimed(&self, platform: &Pubkey, account: &Pubkey) -> Result<bool> {
        let claim: Option<AirdropClaim> = self.records.read(&[
            AIRDROP_CLAIM_SEED,
            platform.as_ref(),
            account.as_ref(),
        ])?;
        Ok(claim.is_some())
    }

    fn record_claim(&mut self, claim: &AirdropClaim) -> Result<()> {
        self.records.write(
            &[
                AIRDROP_CLAIM_SEED,
                claim.platform.as_ref(),
                claim.account.as_ref(),
            ],
            claim,
        )
    }
}

/// Claim store for instructions that carry no claim records.
pub struct NoClaims;

impl ClaimStore for NoClaims {
    fn is_claimed(&self, _platform: &Pubkey, _account: &Pubkey) -> Result<bool> {
        Err(error!(PlatformError::RecordNotProvided))
    }

    fn record_claim(&mut self, _claim: &AirdropClaim) -> Result<()> {
        Err(error!(PlatformError::RecordNotProvided))
    }
}
