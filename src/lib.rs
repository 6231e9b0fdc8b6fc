#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod amount;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod pipeline;
pub mod types;

pub use amount::format_token_amount;
pub use error::{DecodeError, Error, FetchError, ResolveError};
pub use extract::decoder::{DecodedTransfer, OP_TRANSFER, OP_TRANSFER_CHECKED, decode_transfer};
pub use extract::infer::{
    ASSOCIATED_TOKEN_PROGRAM_ID, associated_token_address, infer_missing_mints,
};
pub use extract::{TOKEN_PROGRAM_ID, TransferEvent, TransferKind, extract_transfers};
pub use metadata::record::{MetadataRecord, RecordError, parse_metadata_record};
pub use metadata::{
    AccountDataSource, AssetMetadata, AssetMetadataResolver, MINT_ACCOUNT_MIN_LEN,
    MINT_DECIMALS_OFFSET, TOKEN_METADATA_PROGRAM_ID, metadata_address,
};
pub use pipeline::{TransactionSource, extract_signature_transfers, extract_transaction_transfers};
pub use types::{AccountKeys, InnerInstructionGroup, RawInstruction, RawTransaction, TokenBalance};
