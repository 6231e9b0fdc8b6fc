use crate::error::DecodeError;

/// A compiled instruction as carried by a fetched transaction record.
///
/// Account references are indices into the transaction's flat account-key
/// table ([`AccountKeys`]), not addresses.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawInstruction {
    /// Index of the owning program in the account-key table.
    pub program_id_index: usize,
    /// Ordered account indices referenced by this instruction.
    pub accounts: Vec<usize>,
    /// Raw instruction payload. Byte 0 is the opcode selector.
    pub data: Vec<u8>,
}

/// Instructions spawned by one top-level instruction during execution.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct InnerInstructionGroup {
    /// Index of the top-level instruction that spawned this group.
    pub index: usize,
    /// Spawned instructions, in execution order.
    pub instructions: Vec<RawInstruction>,
}

/// One entry of the pre-execution token balance snapshot.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenBalance {
    /// Mint of the held token (base58).
    pub mint: String,
    /// Owner of the token account, if the RPC reported it.
    #[serde(default)]
    pub owner: Option<String>,
}

/// A fetched executed transaction, reduced to the fields this crate reads.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawTransaction {
    /// Transaction signature (base58). Carried for log context only.
    #[serde(default)]
    pub signature: String,
    /// Canonical account-key ordering; index 0 is typically the fee payer.
    pub account_keys: Vec<String>,
    /// Top-level compiled instructions, in transaction order.
    pub instructions: Vec<RawInstruction>,
    /// Inner instruction groups, in execution order. May be empty.
    #[serde(default)]
    pub inner_instruction_groups: Vec<InnerInstructionGroup>,
    /// Token balances before execution; source of candidate mints for
    /// inference of legacy transfers.
    #[serde(default)]
    pub pre_token_balances: Vec<TokenBalance>,
}

/// The transaction's account index table: integer position to base58 address.
///
/// Built once per transaction, immutable afterwards. Lookups are total for any
/// index a well-formed instruction from the same transaction references; an
/// out-of-range index is a decode error, never a silent default.
#[derive(Debug, Clone)]
pub struct AccountKeys {
    keys: Vec<String>,
}

impl AccountKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn from_transaction(tx: &RawTransaction) -> Self {
        Self::new(tx.account_keys.clone())
    }

    pub fn get(&self, index: usize) -> Result<&str, DecodeError> {
        self.keys
            .get(index)
            .map(String::as_str)
            .ok_or(DecodeError::AccountIndexOutOfRange {
                index,
                len: self.keys.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
