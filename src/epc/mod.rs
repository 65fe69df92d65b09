//! SGTIN-96 EPC codec.
//!
//! Pure, stateless conversion between a structured SGTIN-96 identifier and
//! its compact 96-bit hex representation, per the EPC Tag Data Standard.
//!
//! The 96 bits are packed most-significant-bit first:
//!
//! ```text
//! | 8 bits | 3 bits | 3 bits    | N bits         | M bits         | 38 bits |
//! | header | filter | partition | company prefix | item reference | serial  |
//! ```
//!
//! `N` and `M` are fixed by the partition row (see [`partition`]) and always
//! sum to 44, for a total of 96 bits. The company prefix and item reference
//! are packed as numeric values, not digit-wise; their leading zeros are
//! recovered on decode from the row's mandated digit widths.
//!
//! [`decode`] additionally derives the GTIN-14 (13-digit body plus GS1 check
//! digit, see [`checksum`]) and the two URN renderings of the identifier.
//!
//! Encoding and decoding are exact inverses for all valid inputs.

pub mod checksum;
pub mod partition;

use crate::error::{AppResult, RfidError};
use checksum::gs1_check_digit;
use partition::{row_for_prefix_digits, row_for_selector, PartitionRow};

/// Header byte identifying the SGTIN-96 scheme.
pub const SGTIN_96_HEADER: u8 = 0x30;

/// Bit width of the serial number field.
const SERIAL_BITS: u32 = 38;

/// Exclusive upper bound of the serial number (2^38).
pub const SERIAL_LIMIT: u64 = 1 << SERIAL_BITS;

/// A decoded SGTIN-96 identifier.
///
/// Transient decoding result; built on demand by [`decode`] and never stored.
/// `company_prefix` and `item_reference` are decimal-digit strings zero-padded
/// to the widths mandated by the partition row; their lengths sum to 13.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epc {
    /// Scheme header, always [`SGTIN_96_HEADER`] for this codec.
    pub header: u8,
    /// 3-bit filter value (packaging level hint).
    pub filter: u8,
    /// 3-bit partition selector.
    pub partition: u8,
    /// GS1 company prefix, zero-padded decimal digits.
    pub company_prefix: String,
    /// Item reference, zero-padded decimal digits.
    pub item_reference: String,
    /// 38-bit serial number.
    pub serial_number: u64,
    /// GTIN-14: company prefix + item reference + GS1 check digit.
    pub gtin14: String,
    /// Tag URN, includes the filter value.
    pub tag_urn: String,
    /// Pure-identity URN, omits the filter value.
    pub id_urn: String,
}

/// Encodes an SGTIN-96 identifier into 24 uppercase hex characters.
///
/// The item reference is left-zero-padded to `13 - company_prefix.len()`
/// digits; supplying more digits than that width is rejected rather than
/// truncated.
///
/// # Errors
///
/// Returns [`RfidError::InvalidField`] naming the offending field when the
/// filter exceeds 7, the company prefix length has no partition row, the
/// item reference is oversized or non-numeric, or the serial number does not
/// fit 38 bits.
pub fn encode(
    filter: u8,
    company_prefix: &str,
    item_reference: &str,
    serial_number: u64,
) -> AppResult<String> {
    if filter > 7 {
        return Err(RfidError::invalid_field(
            "filter",
            format!("{filter} is out of range 0-7"),
        ));
    }
    let prefix_value = parse_digits("companyPrefix", company_prefix)?;
    let row = row_for_prefix_digits(company_prefix.len())?;

    let item_value = parse_digits("itemReference", item_reference)?;
    if item_reference.len() > row.item_reference_digits {
        return Err(RfidError::invalid_field(
            "itemReference",
            format!(
                "{} digits exceed the {} allowed by a {}-digit company prefix",
                item_reference.len(),
                row.item_reference_digits,
                row.company_prefix_digits
            ),
        ));
    }
    if serial_number >= SERIAL_LIMIT {
        return Err(RfidError::invalid_field(
            "serialNumber",
            format!("{serial_number} exceeds 38 bits"),
        ));
    }

    let value = (u128::from(SGTIN_96_HEADER) << 88)
        | (u128::from(filter) << 85)
        | (u128::from(row.partition) << 82)
        | (u128::from(prefix_value) << (SERIAL_BITS + row.item_reference_bits))
        | (u128::from(item_value) << SERIAL_BITS)
        | u128::from(serial_number);

    Ok(format!("{value:024X}"))
}

/// Decodes 24 hex characters (optionally `0x`-prefixed, any case) into an
/// [`Epc`].
///
/// # Errors
///
/// Returns [`RfidError::MalformedHex`] for a wrong-length input,
/// [`RfidError::UnexpectedHeader`] when the header byte is not SGTIN-96, and
/// [`RfidError::UnknownPartition`] for the unassigned selector 7. Fields
/// whose extracted value cannot render within the row's digit width fail
/// with [`RfidError::InvalidField`].
pub fn decode(hex: &str) -> AppResult<Epc> {
    let cleaned = hex
        .trim()
        .strip_prefix("0x")
        .or_else(|| hex.trim().strip_prefix("0X"))
        .unwrap_or_else(|| hex.trim());
    if cleaned.len() != 24 {
        return Err(RfidError::MalformedHex(cleaned.len()));
    }
    // from_str_radix tolerates a leading '+', so gate on hex digits first.
    if !cleaned.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RfidError::invalid_field(
            "hex",
            "contains non-hexadecimal characters",
        ));
    }
    let value = u128::from_str_radix(cleaned, 16)
        .map_err(|_| RfidError::invalid_field("hex", "unparseable hex value"))?;

    let header = (value >> 88) as u8;
    if header != SGTIN_96_HEADER {
        return Err(RfidError::UnexpectedHeader(header));
    }
    let filter = ((value >> 85) & 0x7) as u8;
    let selector = ((value >> 82) & 0x7) as u8;
    let row = row_for_selector(selector)?;

    let prefix_value = extract(value, SERIAL_BITS + row.item_reference_bits, row.company_prefix_bits);
    let item_value = extract(value, SERIAL_BITS, row.item_reference_bits);
    let serial_number = extract(value, 0, SERIAL_BITS);

    let company_prefix = render_digits("companyPrefix", prefix_value, row.company_prefix_digits)?;
    let item_reference = render_digits("itemReference", item_value, row.item_reference_digits)?;

    let body = format!("{company_prefix}{item_reference}");
    let gtin14 = format!("{body}{}", gs1_check_digit(&body));
    let tag_urn =
        format!("urn:epc:tag:sgtin-96:{filter}.{company_prefix}.{item_reference}.{serial_number}");
    let id_urn = format!("urn:epc:id:sgtin:{company_prefix}.{item_reference}.{serial_number}");

    Ok(Epc {
        header,
        filter,
        partition: row.partition,
        company_prefix,
        item_reference,
        serial_number,
        gtin14,
        tag_urn,
        id_urn,
    })
}

/// Extracts `bits` bits of `value` starting `shift` bits above the LSB.
fn extract(value: u128, shift: u32, bits: u32) -> u64 {
    ((value >> shift) & ((1u128 << bits) - 1)) as u64
}

/// Parses a non-empty ASCII-digit string into its numeric value.
fn parse_digits(field: &'static str, digits: &str) -> AppResult<u64> {
    if digits.is_empty() {
        return Err(RfidError::invalid_field(field, "must not be empty"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RfidError::invalid_field(field, "must be decimal digits"));
    }
    digits
        .parse::<u64>()
        .map_err(|_| RfidError::invalid_field(field, "numeric overflow"))
}

/// Renders a field value as a zero-padded digit string of fixed width.
///
/// A value needing more digits than the partition row allows cannot have
/// come from a conformant encoder; it is rejected so the 13-digit invariant
/// holds for every decoded identifier.
fn render_digits(field: &'static str, value: u64, width: usize) -> AppResult<String> {
    let rendered = format!("{value:0width$}");
    if rendered.len() > width {
        return Err(RfidError::invalid_field(
            field,
            format!("value {value} does not fit {width} digits"),
        ));
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_the_standard_example() {
        let hex = encode(3, "0614141", "812345", 6789).unwrap();
        assert_eq!(hex, "3074257BF7194E4000001A85");
    }

    #[test]
    fn decodes_the_standard_example() {
        let epc = decode("3074257BF7194E4000001A85").unwrap();
        assert_eq!(epc.header, 0x30);
        assert_eq!(epc.filter, 3);
        assert_eq!(epc.partition, 5);
        assert_eq!(epc.company_prefix, "0614141");
        assert_eq!(epc.item_reference, "812345");
        assert_eq!(epc.serial_number, 6789);
        assert_eq!(epc.gtin14, "06141418123456");
        assert_eq!(epc.id_urn, "urn:epc:id:sgtin:0614141.812345.6789");
        assert_eq!(epc.tag_urn, "urn:epc:tag:sgtin-96:3.0614141.812345.6789");
    }

    #[test]
    fn accepts_prefixed_and_lowercase_hex() {
        let epc = decode("0x3074257bf7194e4000001a85").unwrap();
        assert_eq!(epc.serial_number, 6789);
    }

    #[test]
    fn round_trips_every_partition_row() {
        for row in partition::PARTITION_TABLE {
            let prefix = "41".repeat(6).chars().take(row.company_prefix_digits).collect::<String>();
            let item = "09".repeat(4).chars().take(row.item_reference_digits).collect::<String>();
            let hex = encode(1, &prefix, &item, 42).unwrap();
            let epc = decode(&hex).unwrap();
            assert_eq!(epc.filter, 1);
            assert_eq!(epc.partition, row.partition);
            assert_eq!(epc.company_prefix, prefix);
            assert_eq!(epc.item_reference, item);
            assert_eq!(epc.serial_number, 42);
        }
    }

    #[test]
    fn zero_pads_short_item_references() {
        // 7-digit prefix mandates 6 item digits; "7" becomes "000007".
        let hex = encode(0, "0037000", "7", 1).unwrap();
        let epc = decode(&hex).unwrap();
        assert_eq!(epc.item_reference, "000007");
        assert_eq!(epc.company_prefix, "0037000");
    }

    #[test]
    fn round_trips_serial_extremes() {
        for serial in [0, 1, SERIAL_LIMIT - 1] {
            let hex = encode(7, "123456", "7654321", serial).unwrap();
            assert_eq!(decode(&hex).unwrap().serial_number, serial);
        }
    }

    #[test]
    fn rejects_out_of_range_filter() {
        let err = encode(8, "0614141", "812345", 1).unwrap_err();
        assert!(err.to_string().contains("filter"));
    }

    #[test]
    fn rejects_unsupported_prefix_length() {
        assert!(encode(0, "12345", "1", 1).is_err());
        assert!(encode(0, "1234567890123", "1", 1).is_err());
    }

    #[test]
    fn rejects_oversized_item_reference() {
        // 7-digit prefix allows at most 6 item digits; never truncate.
        let err = encode(0, "0614141", "8123456", 1).unwrap_err();
        assert!(err.to_string().contains("itemReference"));
    }

    #[test]
    fn rejects_oversized_serial() {
        let err = encode(0, "0614141", "812345", SERIAL_LIMIT).unwrap_err();
        assert!(err.to_string().contains("serialNumber"));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(encode(0, "06x4141", "812345", 1).is_err());
        assert!(encode(0, "0614141", "81a345", 1).is_err());
    }

    #[test]
    fn rejects_wrong_length_hex() {
        assert!(matches!(decode("3074"), Err(RfidError::MalformedHex(4))));
        assert!(matches!(
            decode("3074257BF7194E4000001A8500"),
            Err(RfidError::MalformedHex(26))
        ));
    }

    #[test]
    fn rejects_non_hex_characters() {
        assert!(decode("3074257BF7194E4000001AZZ").is_err());
    }

    #[test]
    fn rejects_foreign_header() {
        // SSCC-96 header (0x31) in front of otherwise plausible bits.
        let err = decode("3174257BF7194E4000001A85").unwrap_err();
        assert!(matches!(err, RfidError::UnexpectedHeader(0x31)));
    }

    #[test]
    fn rejects_unassigned_partition_selector() {
        let value = (u128::from(SGTIN_96_HEADER) << 88) | (7u128 << 82);
        let err = decode(&format!("{value:024X}")).unwrap_err();
        assert!(matches!(err, RfidError::UnknownPartition(7)));
    }

    #[test]
    fn gtin14_check_digit_matches_identity() {
        let epc = decode("3074257BF7194E4000001A85").unwrap();
        let body = &epc.gtin14[..13];
        let check = epc.gtin14.as_bytes()[13] - b'0';
        assert_eq!(gs1_check_digit(body), check);
    }
}
