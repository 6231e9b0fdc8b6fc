pub mod decoder;
pub mod infer;

use serde::Serialize;
use tracing::warn;

use crate::types::{AccountKeys, RawTransaction};

/// The SPL token program that owns transfer instructions.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Which transfer opcode produced an event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum TransferKind {
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "transferChecked")]
    TransferChecked,
}

fn amount_as_string<S: serde::Serializer>(amount: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&amount.to_string())
}

/// One decoded token transfer, with instruction-position provenance and
/// (after enrichment) asset metadata and a decimal-adjusted display amount.
///
/// `amount` is exactly the little-endian u64 found at payload offset 1 of the
/// source instruction; it serializes as a string so JSON consumers never round
/// it through a float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEvent {
    #[serde(rename = "type")]
    pub kind: TransferKind,
    pub source: String,
    pub destination: String,
    pub authority: String,
    /// `None` for legacy transfers until (and unless) inference succeeds.
    pub mint: Option<String>,
    #[serde(serialize_with = "amount_as_string")]
    pub amount: u64,
    /// Filled by metadata resolution; absent stays visible, never defaulted.
    pub decimals: Option<u8>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    /// Decimal-adjusted display amount; the raw integer string when the mint
    /// is unknown or enrichment failed.
    pub ui_amount: String,
    pub is_inner: bool,
    /// Position of the (outer) instruction this transfer belongs to.
    pub outer_index: usize,
    /// Program that owns the outer instruction. For inner transfers this is
    /// the invoking program (e.g. a swap), not the token program.
    pub outer_program_id: String,
}

/// Walks top-level instructions and inner instruction groups, in original
/// order, and decodes every token-program transfer found.
///
/// Malformed individual instructions are logged and skipped; one noisy
/// instruction never hides the rest of a transaction's transfers. Output
/// ordering is top-level instructions first, then inner groups, each in
/// original order.
pub fn extract_transfers(tx: &RawTransaction) -> Vec<TransferEvent> {
    let keys = AccountKeys::from_transaction(tx);
    let mut events = Vec::new();

    for (index, ix) in tx.instructions.iter().enumerate() {
        let program_id = match keys.get(ix.program_id_index) {
            Ok(p) => p,
            Err(e) => {
                warn!(signature = %tx.signature, outer_index = index, error = %e, "skipping instruction with bad program index");
                continue;
            }
        };
        if program_id != TOKEN_PROGRAM_ID {
            continue;
        }
        match decoder::decode_transfer(ix, &keys) {
            Ok(Some(decoded)) => {
                events.push(decoded.into_event(false, index, TOKEN_PROGRAM_ID.to_string()));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(signature = %tx.signature, outer_index = index, error = %e, "skipping malformed top-level instruction");
            }
        }
    }

    for group in &tx.inner_instruction_groups {
        // The group's provenance program is the *outer* instruction's owner,
        // which lets callers tell a direct transfer from a CPI side-effect.
        let outer_program_id = match tx
            .instructions
            .get(group.index)
            .ok_or(crate::error::DecodeError::OuterIndexOutOfRange {
                index: group.index,
                len: tx.instructions.len(),
            })
            .and_then(|outer| keys.get(outer.program_id_index))
        {
            Ok(p) => p.to_string(),
            Err(e) => {
                warn!(signature = %tx.signature, outer_index = group.index, error = %e, "skipping inner group with unresolvable outer program");
                continue;
            }
        };

        for ix in &group.instructions {
            let program_id = match keys.get(ix.program_id_index) {
                Ok(p) => p,
                Err(e) => {
                    warn!(signature = %tx.signature, outer_index = group.index, error = %e, "skipping inner instruction with bad program index");
                    continue;
                }
            };
            if program_id != TOKEN_PROGRAM_ID {
                continue;
            }
            match decoder::decode_transfer(ix, &keys) {
                Ok(Some(decoded)) => {
                    events.push(decoded.into_event(true, group.index, outer_program_id.clone()));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(signature = %tx.signature, outer_index = group.index, error = %e, "skipping malformed inner instruction");
                }
            }
        }
    }

    events
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::types::{InnerInstructionGroup, RawInstruction};

    fn transfer_payload(amount: u64) -> Vec<u8> {
        let mut data = vec![3u8];
        data.extend_from_slice(&amount.to_le_bytes());
        data
    }

    fn transfer_checked_payload(amount: u64, decimals: u8) -> Vec<u8> {
        let mut data = vec![12u8];
        data.extend_from_slice(&amount.to_le_bytes());
        data.push(decimals);
        data
    }

    fn base_tx() -> RawTransaction {
        RawTransaction {
            signature: "sig".to_string(),
            account_keys: vec![
                "source".to_string(),
                "destination".to_string(),
                "authority".to_string(),
                "mint".to_string(),
                TOKEN_PROGRAM_ID.to_string(),
                "SwapProgram1111111111111111111111111111111".to_string(),
            ],
            instructions: Vec::new(),
            inner_instruction_groups: Vec::new(),
            pre_token_balances: Vec::new(),
        }
    }

    #[test]
    fn top_level_transfer_checked_is_decoded_with_provenance() {
        let mut tx = base_tx();
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 3, 1, 2],
            data: transfer_checked_payload(10_000_000, 8),
        });

        let events = extract_transfers(&tx);
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.kind, TransferKind::TransferChecked);
        assert_eq!(ev.amount, 10_000_000);
        assert_eq!(ev.mint.as_deref(), Some("mint"));
        assert_eq!(ev.source, "source");
        assert_eq!(ev.destination, "destination");
        assert_eq!(ev.authority, "authority");
        assert!(!ev.is_inner);
        assert_eq!(ev.outer_index, 0);
        assert_eq!(ev.outer_program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ev.ui_amount, "10000000");
        assert_eq!(ev.decimals, None);
    }

    #[test]
    fn inner_transfer_reports_outer_program() {
        let mut tx = base_tx();
        // Four non-token placeholders so the swap invocation lands at index 4.
        for _ in 0..4 {
            tx.instructions.push(RawInstruction {
                program_id_index: 5,
                accounts: vec![],
                data: vec![],
            });
        }
        tx.instructions.push(RawInstruction {
            program_id_index: 5,
            accounts: vec![0, 1],
            data: vec![1, 2, 3],
        });
        tx.inner_instruction_groups.push(InnerInstructionGroup {
            index: 4,
            instructions: vec![RawInstruction {
                program_id_index: 4,
                accounts: vec![0, 3, 1, 2],
                data: transfer_checked_payload(42, 6),
            }],
        });

        let events = extract_transfers(&tx);
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert!(ev.is_inner);
        assert_eq!(ev.outer_index, 4);
        assert_eq!(
            ev.outer_program_id,
            "SwapProgram1111111111111111111111111111111"
        );
    }

    #[test]
    fn ordering_is_top_level_then_groups_in_original_order() {
        let mut tx = base_tx();
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 1, 2],
            data: transfer_payload(1),
        });
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 1, 2],
            data: transfer_payload(2),
        });
        tx.inner_instruction_groups.push(InnerInstructionGroup {
            index: 0,
            instructions: vec![
                RawInstruction {
                    program_id_index: 4,
                    accounts: vec![0, 1, 2],
                    data: transfer_payload(3),
                },
                RawInstruction {
                    program_id_index: 4,
                    accounts: vec![0, 1, 2],
                    data: transfer_payload(4),
                },
            ],
        });

        let amounts: Vec<u64> = extract_transfers(&tx).iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![1, 2, 3, 4]);
    }

    #[test]
    fn walker_is_idempotent_over_immutable_input() {
        let mut tx = base_tx();
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 3, 1, 2],
            data: transfer_checked_payload(123_456_789, 9),
        });
        tx.inner_instruction_groups.push(InnerInstructionGroup {
            index: 0,
            instructions: vec![RawInstruction {
                program_id_index: 4,
                accounts: vec![0, 1, 2],
                data: transfer_payload(7),
            }],
        });

        let first = extract_transfers(&tx);
        let second = extract_transfers(&tx);
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_instruction_does_not_abort_scan() {
        let mut tx = base_tx();
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 1, 2],
            data: vec![3, 1, 0], // truncated amount
        });
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 1, 2],
            data: transfer_payload(99),
        });

        let events = extract_transfers(&tx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].amount, 99);
        assert_eq!(events[0].outer_index, 1);
    }

    #[test]
    fn unknown_opcode_is_ignored_not_errored() {
        let mut tx = base_tx();
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 1, 2],
            data: vec![255, 1, 2, 3],
        });

        assert!(extract_transfers(&tx).is_empty());
    }

    #[test]
    fn non_token_program_instructions_are_not_decoded() {
        let mut tx = base_tx();
        // Opcode 3 shape, but owned by the swap program.
        tx.instructions.push(RawInstruction {
            program_id_index: 5,
            accounts: vec![0, 1, 2],
            data: transfer_payload(5),
        });

        assert!(extract_transfers(&tx).is_empty());
    }

    #[test]
    fn inner_group_with_out_of_range_outer_index_is_skipped() {
        let mut tx = base_tx();
        tx.inner_instruction_groups.push(InnerInstructionGroup {
            index: 9,
            instructions: vec![RawInstruction {
                program_id_index: 4,
                accounts: vec![0, 1, 2],
                data: transfer_payload(1),
            }],
        });

        assert!(extract_transfers(&tx).is_empty());
    }

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!(TransferKind::Transfer.to_string(), "transfer");
        assert_eq!(TransferKind::TransferChecked.to_string(), "transferChecked");
        assert_eq!(
            "transferChecked".parse::<TransferKind>().ok(),
            Some(TransferKind::TransferChecked)
        );
    }

    #[test]
    fn event_serializes_amount_as_string() {
        let mut tx = base_tx();
        tx.instructions.push(RawInstruction {
            program_id_index: 4,
            accounts: vec![0, 3, 1, 2],
            data: transfer_checked_payload(18_446_744_073_709_551_615, 0),
        });
        let events = extract_transfers(&tx);
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["amount"], "18446744073709551615");
        assert_eq!(json["type"], "transferChecked");
        assert_eq!(json["isInner"], false);
    }
}
