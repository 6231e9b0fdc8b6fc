pub mod record;

use std::collections::HashMap;
use std::str::FromStr;

use solana_pubkey::Pubkey;

use crate::error::{FetchError, ResolveError};

/// The Metaplex token-metadata program holding per-mint symbol/name records.
pub const TOKEN_METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// Seed prefix of the metadata record PDA.
const METADATA_SEED: &[u8] = b"metadata";

/// Byte offset of the decimals field in a mint account's fixed layout.
/// A structural constant of the mint account format, not a tunable.
pub const MINT_DECIMALS_OFFSET: usize = 44;

/// Minimum mint account length that makes the decimals byte addressable.
pub const MINT_ACCOUNT_MIN_LEN: usize = MINT_DECIMALS_OFFSET + 1;

/// Collaborator contract for raw account-data retrieval.
///
/// Implemented outside this crate (an RPC client, a snapshot store, a test
/// stub). Timeouts and cancellation are the implementor's responsibility; a
/// failure here surfaces as a per-event enrichment failure, never a retry
/// loop.
pub trait AccountDataSource {
    fn fetch_account_data(&self, address: &str) -> Result<Vec<u8>, FetchError>;
}

/// Human-readable facts about a mint, composed from the mint account and its
/// metadata record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AssetMetadata {
    pub mint: String,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

/// Derives the metadata record address for a mint:
/// `find_program_address(["metadata", program, mint], metadata_program)`.
pub fn metadata_address(mint: &str) -> Option<String> {
    let mint = Pubkey::from_str(mint).ok()?;
    let program = Pubkey::from_str(TOKEN_METADATA_PROGRAM_ID).ok()?;
    let (address, _bump) = Pubkey::try_find_program_address(
        &[METADATA_SEED, program.as_ref(), mint.as_ref()],
        &program,
    )?;
    Some(address.to_string())
}

/// Resolves mint decimals plus symbol/name, with a cache scoped to one
/// decoding run.
///
/// The cache is owned by the resolver and accessed through `&mut self`, so
/// concurrent decoding runs each carry their own resolver and cannot
/// cross-contaminate. Construct one per run; do not hold it process-wide.
pub struct AssetMetadataResolver<'a, S: AccountDataSource + ?Sized> {
    source: &'a S,
    cache: HashMap<String, AssetMetadata>,
}

impl<'a, S: AccountDataSource + ?Sized> AssetMetadataResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// Fetches and composes metadata for `mint`, or returns the cached result
    /// from earlier in this run.
    ///
    /// The four failure modes (mint fetch, mint too short, metadata fetch,
    /// metadata parse) stay distinct so callers can report them separately.
    pub fn resolve(&mut self, mint: &str) -> Result<AssetMetadata, ResolveError> {
        if let Some(cached) = self.cache.get(mint) {
            return Ok(cached.clone());
        }

        let mint_data = self
            .source
            .fetch_account_data(mint)
            .map_err(ResolveError::MintFetch)?;
        if mint_data.len() < MINT_ACCOUNT_MIN_LEN {
            return Err(ResolveError::MintDataTooShort {
                mint: mint.to_string(),
                len: mint_data.len(),
            });
        }
        let decimals = mint_data[MINT_DECIMALS_OFFSET];

        let record_address = metadata_address(mint).ok_or_else(|| ResolveError::MetadataParse {
            mint: mint.to_string(),
            reason: "metadata address derivation failed".to_string(),
        })?;
        let record_data = self
            .source
            .fetch_account_data(&record_address)
            .map_err(ResolveError::MetadataFetch)?;
        let record =
            record::parse_metadata_record(&record_data).map_err(|e| ResolveError::MetadataParse {
                mint: mint.to_string(),
                reason: e.to_string(),
            })?;

        let metadata = AssetMetadata {
            mint: mint.to_string(),
            decimals,
            symbol: record.symbol,
            name: record.name,
        };
        self.cache.insert(mint.to_string(), metadata.clone());
        Ok(metadata)
    }
}
