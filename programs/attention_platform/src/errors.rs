use anchor_lang::prelude::*;

#[error_code]
pub enum PlatformError {
    #[msg("Unauthorized")]
    Unauthorized,

    // -----------------
    // Lifecycle
    // -----------------
    #[msg("Platform not initialized")]
    NotInitialized,
    #[msg("Already initialized")]
    AlreadyInitialized,

    // -----------------
    // Registry
    // -----------------
    #[msg("Identifier already exists")]
    DuplicateIdentifier,
    #[msg("Unknown identifier")]
    UnknownIdentifier,
    #[msg("Invalid argument")]
    InvalidArgument,
    #[msg("Too many entries")]
    TooManyEntries,

    // -----------------
    // Rounds
    // -----------------
    #[msg("Registry is locked for the current round")]
    RoundLocked,
    #[msg("Round already locked")]
    AlreadyLocked,
    #[msg("Round not locked")]
    NotLocked,
    #[msg("Round is not paying out")]
    NotPaying,

    // -----------------
    // Airdrop
    // -----------------
    #[msg("Platform is not known to the system")]
    UnknownPlatform,
    #[msg("Already registered")]
    AlreadyRegistered,
    #[msg("Platform not registered with the airdrop")]
    PlatformNotRegistered,

    // -----------------
    // Ledger
    // -----------------
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Insufficient funds")]
    InsufficientFunds,
    #[msg("Token account not provided")]
    TokenAccountNotFound,
    #[msg("Mint does not match platform")]
    MintMismatch,

    // -----------------
    // Records
    // -----------------
    #[msg("Record account not provided")]
    RecordNotProvided,
    #[msg("Neighbouring account not provided")]
    NeighbourNotProvided,
}
