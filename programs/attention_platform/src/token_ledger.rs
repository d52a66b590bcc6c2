use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::{engine::Ledger, errors::PlatformError, state::Asset};

/// A name the program can move tokens for: either a transaction signer or a
/// PDA it signs for with `seeds`.
struct Authority<'info> {
    info: AccountInfo<'info>,
    seeds: Option<Vec<Vec<u8>>>,
}

/// Where the token accounts of a program-owned name must live.
enum Pin {
    Address(Pubkey),
    /// One vault per mint at `[seed, scope, mint]`.
    PerMint { seed: Vec<u8>, scope: Pubkey },
}

struct PinnedVault {
    owner: Pubkey,
    pin: Pin,
}

/// `Ledger` over SPL token accounts supplied with the instruction.
///
/// Token accounts are resolved by (owner, mint) among `accounts`, so the
/// client must pass every account a handler may touch. Names the program
/// owns are pinned to their canonical vault, and any other account they
/// happen to own is ignored.
pub struct TokenLedger<'info> {
    token_program: AccountInfo<'info>,
    accounts: Vec<AccountInfo<'info>>,
    authorities: Vec<Authority<'info>>,
    pins: Vec<PinnedVault>,
}

impl<'info> TokenLedger<'info> {
    pub fn new(token_program: AccountInfo<'info>, accounts: Vec<AccountInfo<'info>>) -> Self {
        Self {
            token_program,
            accounts,
            authorities: Vec::new(),
            pins: Vec::new(),
        }
    }

    /// Resolves `owner` only through the token account at `address`.
    pub fn with_vault(mut self, owner: Pubkey, address: Pubkey) -> Self {
        self.pins.push(PinnedVault {
            owner,
            pin: Pin::Address(address),
        });
        self
    }

    /// Resolves `owner` only through the per-mint vault PDA under `scope`.
    pub fn with_mint_vaults(mut self, owner: Pubkey, seed: &[u8], scope: Pubkey) -> Self {
        self.pins.push(PinnedVault {
            owner,
            pin: Pin::PerMint {
                seed: seed.to_vec(),
                scope,
            },
        });
        self
    }

    fn pinned_address(&self, owner: &Pubkey, mint: &Pubkey) -> Option<Pubkey> {
        let pinned = self.pins.iter().find(|p| p.owner == *owner)?;
        Some(match &pinned.pin {
            Pin::Address(address) => *address,
            Pin::PerMint { seed, scope } => {
                Pubkey::find_program_address(
                    &[seed.as_slice(), scope.as_ref(), mint.as_ref()],
                    &crate::ID,
                )
                .0
            }
        })
    }

    pub fn with_account(mut self, account: AccountInfo<'info>) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_signer(mut self, signer: AccountInfo<'info>) -> Self {
        self.authorities.push(Authority {
            info: signer,
            seeds: None,
        });
        self
    }

    pub fn with_pda(mut self, pda: AccountInfo<'info>, seeds: Vec<Vec<u8>>) -> Self {
        self.authorities.push(Authority {
            info: pda,
            seeds: Some(seeds),
        });
        self
    }

    fn find(&self, owner: &Pubkey, mint: &Pubkey) -> Result<(AccountInfo<'info>, TokenAccount)> {
        let pinned = self.pinned_address(owner, mint);
        for info in self.accounts.iter() {
            if pinned.map_or(false, |address| *info.key != address) {
                continue;
            }
            if info.owner != &token::ID || info.data_is_empty() {
                continue;
            }
            let data = info.try_borrow_data()?;
            let Ok(parsed) = TokenAccount::try_deserialize(&mut &data[..]) else {
                continue;
            };
            if parsed.owner == *owner && parsed.mint == *mint {
                return Ok((info.clone(), parsed));
            }
        }
        msg!("no token account for owner={} mint={}", owner, mint);
        Err(error!(PlatformError::TokenAccountNotFound))
    }
}

impl<'info> Ledger for TokenLedger<'info> {
    fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64> {
        self.find(owner, mint).map(|(_, parsed)| parsed.amount)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, asset: Asset, memo: &str) -> Result<()> {
        if asset.amount == 0 {
            return Ok(());
        }

        let (source, parsed) = self.find(from, &asset.mint)?;
        require!(parsed.amount >= asset.amount, PlatformError::InsufficientFunds);
        let (destination, _) = self.find(to, &asset.mint)?;

        let authority = self
            .authorities
            .iter()
            .find(|a| a.info.key == from)
            .ok_or(PlatformError::Unauthorized)?;

        let accounts = Transfer {
            from: source,
            to: destination,
            authority: authority.info.clone(),
        };

        match &authority.seeds {
            Some(seeds) => {
                let seeds: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();
                let signer_seeds: &[&[&[u8]]] = &[&seeds];
                token::transfer(
                    CpiContext::new_with_signer(self.token_program.clone(), accounts, signer_seeds),
                    asset.amount,
                )?;
            }
            None => {
                token::transfer(
                    CpiContext::new(self.token_program.clone(), accounts),
                    asset.amount,
                )?;
            }
        }

        msg!("transfer {} -> {} amount={} memo={}", from, to, asset.amount, memo);
        Ok(())
    }
}

/// Ledger for instructions that carry no token accounts. Any value movement
/// fails as if the account had not been supplied.
pub struct NoTokenAccounts;

impl Ledger for NoTokenAccounts {
    fn balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> Result<u64> {
        Err(error!(PlatformError::TokenAccountNotFound))
    }

    fn transfer(&mut self, _from: &Pubkey, _to: &Pubkey, _asset: Asset, _memo: &str) -> Result<()> {
        Err(error!(PlatformError::TokenAccountNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ESCROW_VAULT_SEED;

    struct Raw {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    }

    impl Raw {
        fn program() -> Self {
            Self {
                key: token::ID,
                owner: Pubkey::default(),
                lamports: 1,
                data: Vec::new(),
            }
        }

        /// An initialized SPL token account in its packed layout.
        fn token(key: Pubkey, mint: Pubkey, owner: Pubkey, amount: u64) -> Self {
            let mut data = vec![0u8; 165];
            data[0..32].copy_from_slice(mint.as_ref());
            data[32..64].copy_from_slice(owner.as_ref());
            data[64..72].copy_from_slice(&amount.to_le_bytes());
            data[108] = 1;
            Self {
                key,
                owner: token::ID,
                lamports: 1,
                data,
            }
        }

        fn info(&mut self) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                false,
                true,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                false,
                0,
            )
        }
    }

    fn escrow_vault(platform: &Pubkey, mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[ESCROW_VAULT_SEED, platform.as_ref(), mint.as_ref()],
            &crate::ID,
        )
        .0
    }

    #[test]
    fn pinned_owner_ignores_lookalike_accounts() {
        let (platform, escrow, mint) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut raws = vec![
            Raw::program(),
            Raw::token(Pubkey::new_unique(), mint, escrow, 1),
            Raw::token(escrow_vault(&platform, &mint), mint, escrow, 50),
        ];
        let mut infos: Vec<AccountInfo> = raws.iter_mut().map(Raw::info).collect();
        let program = infos.remove(0);

        let ledger = TokenLedger::new(program, infos).with_mint_vaults(
            escrow,
            ESCROW_VAULT_SEED,
            platform,
        );

        assert_eq!(ledger.balance(&escrow, &mint).unwrap(), 50);
    }

    #[test]
    fn pinned_owner_without_its_vault_is_not_found() {
        let (treasury, mint) = (Pubkey::new_unique(), Pubkey::new_unique());
        let vault = Pubkey::new_unique();
        let mut raws = vec![
            Raw::program(),
            Raw::token(Pubkey::new_unique(), mint, treasury, 1_000),
        ];
        let mut infos: Vec<AccountInfo> = raws.iter_mut().map(Raw::info).collect();
        let program = infos.remove(0);

        let ledger = TokenLedger::new(program, infos).with_vault(treasury, vault);

        assert_eq!(
            ledger.balance(&treasury, &mint).unwrap_err(),
            PlatformError::TokenAccountNotFound.into()
        );
    }

    #[test]
    fn unpinned_owner_resolves_by_owner_and_mint() {
        let (user, mint, other) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let mut raws = vec![
            Raw::program(),
            Raw::token(Pubkey::new_unique(), other, user, 3),
            Raw::token(Pubkey::new_unique(), mint, user, 7),
        ];
        let mut infos: Vec<AccountInfo> = raws.iter_mut().map(Raw::info).collect();
        let program = infos.remove(0);

        let ledger = TokenLedger::new(program, infos);

        assert_eq!(ledger.balance(&user, &mint).unwrap(), 7);
    }
}
