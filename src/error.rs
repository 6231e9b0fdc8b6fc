/// A collaborator fetch failure: which address was requested and why it failed.
///
/// Produced by [`crate::metadata::AccountDataSource`] and
/// [`crate::pipeline::TransactionSource`] implementations; this crate only
/// propagates it, it never retries.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("fetch failed for {address}: {reason}")]
pub struct FetchError {
    pub address: String,
    pub reason: String,
}

/// A single malformed compiled instruction. Local by design: the walker logs
/// and skips it, the rest of the transaction scan continues.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload too short for opcode {opcode}: {len} bytes, need {need}")]
    PayloadTooShort { opcode: u8, len: usize, need: usize },

    #[error("too few accounts for opcode {opcode}: {len}, need {need}")]
    MissingAccounts { opcode: u8, len: usize, need: usize },

    #[error("account index {index} out of range (table has {len} keys)")]
    AccountIndexOutOfRange { index: usize, len: usize },

    #[error("inner group references outer instruction {index} but transaction has {len}")]
    OuterIndexOutOfRange { index: usize, len: usize },
}

/// A per-mint enrichment failure. Local by design: the affected event keeps
/// its decoded fields but decimals/symbol/name stay absent, and sibling
/// events still enrich.
///
/// The four variants are deliberately distinct so callers can tell a missing
/// mint account from a malformed metadata record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("mint account fetch: {0}")]
    MintFetch(#[source] FetchError),

    #[error("mint account for {mint} too short: {len} bytes")]
    MintDataTooShort { mint: String, len: usize },

    #[error("metadata account fetch: {0}")]
    MetadataFetch(#[source] FetchError),

    #[error("metadata record for {mint}: {reason}")]
    MetadataParse { mint: String, reason: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// The transaction itself could not be retrieved. Fatal: there is no
    /// partial per-transaction result to return.
    #[error("transaction fetch: {0}")]
    TransactionFetch(#[source] FetchError),
}
