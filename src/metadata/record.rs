//! Parser for the Metaplex metadata record: a fixed header (key byte, update
//! authority, mint) followed by self-describing length-prefixed strings
//! (u32 LE length, then bytes). On-chain records pad name/symbol/uri with
//! trailing NULs to fixed capacity; the padding is trimmed here.

/// Truncated or non-UTF-8 metadata record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record truncated while reading {field}")]
    Truncated { field: &'static str },

    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
}

/// The fields of a metadata record this crate consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Mint the record describes (base58), from the record header.
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

const KEY_LEN: usize = 1;
const PUBKEY_LEN: usize = 32;

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], RecordError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(RecordError::Truncated { field })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_string(&mut self, field: &'static str) -> Result<String, RecordError> {
        let len_bytes = self.take(4, field)?;
        let mut len = [0u8; 4];
        len.copy_from_slice(len_bytes);
        let raw = self.take(u32::from_le_bytes(len) as usize, field)?;
        let text = std::str::from_utf8(raw).map_err(|_| RecordError::InvalidUtf8 { field })?;
        Ok(text.trim_end_matches('\0').to_string())
    }
}

/// Parses a raw metadata account. Trailing bytes beyond the uri (creators,
/// editions) are ignored.
pub fn parse_metadata_record(data: &[u8]) -> Result<MetadataRecord, RecordError> {
    let mut reader = Reader { data, pos: 0 };
    reader.take(KEY_LEN, "key")?;
    reader.take(PUBKEY_LEN, "update authority")?;
    let mint = bs58::encode(reader.take(PUBKEY_LEN, "mint")?).into_string();
    let name = reader.read_string("name")?;
    let symbol = reader.read_string("symbol")?;
    let uri = reader.read_string("uri")?;
    Ok(MetadataRecord {
        mint,
        name,
        symbol,
        uri,
    })
}


#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn parses_padded_record_and_trims_nuls() {
        let data = tests_support::encode_record(WSOL_MINT, "Wrapped SOL", "SOL", "https://x");
        let record = parse_metadata_record(&data).unwrap();
        assert_eq!(record.mint, WSOL_MINT);
        assert_eq!(record.name, "Wrapped SOL");
        assert_eq!(record.symbol, "SOL");
        assert_eq!(record.uri, "https://x");
    }

    #[test]
    fn oversized_strings_are_length_prefixed_not_capacity_bound() {
        let name = "a".repeat(64);
        let data = tests_support::encode_record(WSOL_MINT, &name, "S", "");
        assert_eq!(parse_metadata_record(&data).unwrap().name, name);
    }

    #[test]
    fn truncated_header_errors() {
        assert_eq!(
            parse_metadata_record(&[4u8; 10]),
            Err(RecordError::Truncated {
                field: "update authority"
            })
        );
    }

    #[test]
    fn truncated_string_names_the_field() {
        let mut data = tests_support::encode_record(WSOL_MINT, "Name", "SYM", "");
        data.truncate(1 + 32 + 32 + 2); // inside the name length prefix
        assert_eq!(
            parse_metadata_record(&data),
            Err(RecordError::Truncated { field: "name" })
        );
    }

    #[test]
    fn declared_length_past_end_errors_without_panicking() {
        let mut data = vec![4u8];
        data.extend_from_slice(&[0u8; 64]);
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(
            parse_metadata_record(&data),
            Err(RecordError::Truncated { field: "name" })
        );
    }

    #[test]
    fn non_utf8_symbol_errors() {
        let mut data = vec![4u8];
        data.extend_from_slice(&[0u8; 64]);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(b'N');
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[0xFF, 0xFE]);
        assert_eq!(
            parse_metadata_record(&data),
            Err(RecordError::InvalidUtf8 { field: "symbol" })
        );
    }
}
