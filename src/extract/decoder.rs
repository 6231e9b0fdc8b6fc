use crate::error::DecodeError;
use crate::extract::{TransferEvent, TransferKind};
use crate::types::{AccountKeys, RawInstruction};

/// SPL token `Transfer` opcode: `[3, amount: u64 LE]`, accounts
/// `[source, destination, authority]`. Carries no mint.
pub const OP_TRANSFER: u8 = 3;

/// SPL token `TransferChecked` opcode: `[12, amount: u64 LE, decimals]`,
/// accounts `[source, mint, destination, authority]` — the mint occupies the
/// slot immediately after source, not after destination.
pub const OP_TRANSFER_CHECKED: u8 = 12;

const AMOUNT_RANGE: std::ops::Range<usize> = 1..9;

/// A transfer decoded from one instruction, before provenance tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransfer {
    pub kind: TransferKind,
    pub source: String,
    pub destination: String,
    pub authority: String,
    pub mint: Option<String>,
    pub amount: u64,
}

impl DecodedTransfer {
    pub(crate) fn into_event(
        self,
        is_inner: bool,
        outer_index: usize,
        outer_program_id: String,
    ) -> TransferEvent {
        TransferEvent {
            kind: self.kind,
            source: self.source,
            destination: self.destination,
            authority: self.authority,
            mint: self.mint,
            ui_amount: self.amount.to_string(),
            amount: self.amount,
            decimals: None,
            symbol: None,
            name: None,
            is_inner,
            outer_index,
            outer_program_id,
        }
    }
}

/// Decodes one compiled instruction's opcode and payload.
///
/// Returns `Ok(None)` for empty payloads and unrecognized opcodes so callers
/// can skip unrelated token-program instructions cheaply; returns an error
/// only for a recognized opcode with a violated length or account-count
/// precondition. Pure function of its inputs, no I/O.
pub fn decode_transfer(
    ix: &RawInstruction,
    keys: &AccountKeys,
) -> Result<Option<DecodedTransfer>, DecodeError> {
    let Some(&opcode) = ix.data.first() else {
        return Ok(None);
    };

    match opcode {
        OP_TRANSFER => {
            require_payload(opcode, ix.data.len(), 9)?;
            require_accounts(opcode, ix.accounts.len(), 3)?;
            Ok(Some(DecodedTransfer {
                kind: TransferKind::Transfer,
                source: resolve(keys, ix, 0)?,
                destination: resolve(keys, ix, 1)?,
                authority: resolve(keys, ix, 2)?,
                mint: None,
                amount: read_amount(&ix.data),
            }))
        }
        OP_TRANSFER_CHECKED => {
            // Amount plus the trailing decimals byte the checked variant carries.
            require_payload(opcode, ix.data.len(), 10)?;
            require_accounts(opcode, ix.accounts.len(), 4)?;
            Ok(Some(DecodedTransfer {
                kind: TransferKind::TransferChecked,
                source: resolve(keys, ix, 0)?,
                mint: Some(resolve(keys, ix, 1)?),
                destination: resolve(keys, ix, 2)?,
                authority: resolve(keys, ix, 3)?,
                amount: read_amount(&ix.data),
            }))
        }
        _ => Ok(None),
    }
}

fn read_amount(data: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[AMOUNT_RANGE]);
    u64::from_le_bytes(bytes)
}

fn resolve(keys: &AccountKeys, ix: &RawInstruction, slot: usize) -> Result<String, DecodeError> {
    // Slot presence was checked by require_accounts; the index value itself
    // can still be out of the table's range.
    let index = ix
        .accounts
        .get(slot)
        .copied()
        .ok_or(DecodeError::MissingAccounts {
            opcode: ix.data.first().copied().unwrap_or_default(),
            len: ix.accounts.len(),
            need: slot + 1,
        })?;
    keys.get(index).map(str::to_string)
}

fn require_payload(opcode: u8, len: usize, need: usize) -> Result<(), DecodeError> {
    if len < need {
        return Err(DecodeError::PayloadTooShort { opcode, len, need });
    }
    Ok(())
}

fn require_accounts(opcode: u8, len: usize, need: usize) -> Result<(), DecodeError> {
    if len < need {
        return Err(DecodeError::MissingAccounts { opcode, len, need });
    }
    Ok(())
}
