use std::str::FromStr;

use solana_pubkey::Pubkey;
use tracing::debug;

use crate::extract::{TOKEN_PROGRAM_ID, TransferEvent};
use crate::types::RawTransaction;

/// The associated-token-account program that anchors the ATA derivation.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Derives the associated token account address for `(owner, mint)`:
/// `find_program_address([owner, token_program, mint], ata_program)`.
///
/// Returns `None` when either address is not a valid base58 pubkey or the
/// derivation exhausts its bump seeds (practically never for this scheme).
pub fn associated_token_address(owner: &str, mint: &str) -> Option<String> {
    let owner = Pubkey::from_str(owner).ok()?;
    let mint = Pubkey::from_str(mint).ok()?;
    let token_program = Pubkey::from_str(TOKEN_PROGRAM_ID).ok()?;
    let ata_program = Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID).ok()?;

    let (address, _bump) = Pubkey::try_find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ata_program,
    )?;
    Some(address.to_string())
}

/// Fills in the mint for legacy `transfer` events, which never name it.
///
/// The mint is reverse-derived: for every distinct transfer authority and
/// every mint seen in the pre-balance snapshot, the associated token address
/// is computed and compared against the event's source and destination. The
/// first matching `(authority, mint)` pair wins.
///
/// Known limitation: if two distinct pairs happen to derive the same address
/// against an event's accounts, whichever enumerates first is accepted —
/// there is no disambiguation signal beyond address equality. Enumeration
/// order is fixed (authorities in first-observation order, mints in snapshot
/// order) so repeated runs over the same input agree.
///
/// Cost is `O(events × authorities × mints)` derivations; transaction-scoped
/// sets are tens of elements at most, so a plain nested search is deliberate.
pub fn infer_missing_mints(events: &mut [TransferEvent], tx: &RawTransaction) {
    let authorities = distinct_authorities(events);
    let candidate_mints = distinct_pre_balance_mints(tx);
    if authorities.is_empty() || candidate_mints.is_empty() {
        return;
    }

    for event in events.iter_mut().filter(|e| e.mint.is_none()) {
        'pairs: for authority in &authorities {
            for mint in &candidate_mints {
                let Some(derived) = associated_token_address(authority, mint) else {
                    continue;
                };
                if derived == event.source || derived == event.destination {
                    debug!(mint = %mint, authority = %authority, "inferred mint for legacy transfer");
                    event.mint = Some(mint.clone());
                    break 'pairs;
                }
            }
        }
    }
}

/// Distinct transfer authorities, in first-observation order.
fn distinct_authorities(events: &[TransferEvent]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for event in events {
        if !out.iter().any(|a| a == &event.authority) {
            out.push(event.authority.clone());
        }
    }
    out
}

/// Distinct mints from the pre-execution balance snapshot, in snapshot order.
fn distinct_pre_balance_mints(tx: &RawTransaction) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for balance in &tx.pre_token_balances {
        if !balance.mint.is_empty() && !out.iter().any(|m| m == &balance.mint) {
            out.push(balance.mint.clone());
        }
    }
    out
}
