//! End-to-end composition: walk the instructions, infer missing mints,
//! enrich with asset metadata, normalize display amounts.

use tracing::warn;

use crate::amount::format_token_amount;
use crate::error::{Error, FetchError};
use crate::extract::infer::infer_missing_mints;
use crate::extract::{TransferEvent, extract_transfers};
use crate::metadata::{AccountDataSource, AssetMetadataResolver};
use crate::types::RawTransaction;

/// Collaborator contract for transaction retrieval.
///
/// A failure here is fatal for the requested signature: there is no partial
/// transaction-level result to salvage.
pub trait TransactionSource {
    fn fetch_transaction(&self, signature: &str) -> Result<RawTransaction, FetchError>;
}

/// Extracts and fully enriches every token transfer in an already-fetched
/// transaction.
///
/// Enrichment failures are per-event: the event keeps its decoded fields,
/// `decimals`/`symbol`/`name` stay absent and `ui_amount` stays the raw
/// integer string. All lookups complete (or fail) before this returns — no
/// partial output. Metadata lookups within the run are cached per mint.
pub fn extract_transaction_transfers<S: AccountDataSource + ?Sized>(
    tx: &RawTransaction,
    source: &S,
) -> Vec<TransferEvent> {
    let mut events = extract_transfers(tx);
    infer_missing_mints(&mut events, tx);

    let mut resolver = AssetMetadataResolver::new(source);
    for event in &mut events {
        let Some(mint) = event.mint.clone() else {
            continue;
        };
        match resolver.resolve(&mint) {
            Ok(meta) => {
                event.decimals = Some(meta.decimals);
                event.symbol = Some(meta.symbol);
                event.name = Some(meta.name);
                event.ui_amount = format_token_amount(event.amount, meta.decimals);
            }
            Err(e) => {
                warn!(signature = %tx.signature, mint = %mint, error = %e, "enrichment failed; event keeps raw amount");
            }
        }
    }

    events
}

/// Fetches a transaction by signature and extracts its transfers.
pub fn extract_signature_transfers<C>(
    client: &C,
    signature: &str,
) -> Result<Vec<TransferEvent>, Error>
where
    C: TransactionSource + AccountDataSource,
{
    let tx = client
        .fetch_transaction(signature)
        .map_err(Error::TransactionFetch)?;
    Ok(extract_transaction_transfers(&tx, client))
}
