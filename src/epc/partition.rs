//! SGTIN-96 partition table.
//!
//! The 3-bit partition selector fixes how the 44 bits shared by the company
//! prefix and the item reference are split, and how many decimal digits each
//! field renders to. Digit widths always sum to 13, the GTIN body length.

use crate::error::{AppResult, RfidError};

/// One row of the SGTIN-96 partition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRow {
    /// 3-bit selector value stored in the EPC.
    pub partition: u8,
    /// Bit width of the company prefix field.
    pub company_prefix_bits: u32,
    /// Decimal digits the company prefix renders to.
    pub company_prefix_digits: usize,
    /// Bit width of the item reference field.
    pub item_reference_bits: u32,
    /// Decimal digits the item reference renders to.
    pub item_reference_digits: usize,
}

/// The full table from the EPC Tag Data Standard, selector 0 through 6.
pub const PARTITION_TABLE: [PartitionRow; 7] = [
    PartitionRow { partition: 0, company_prefix_bits: 40, company_prefix_digits: 12, item_reference_bits: 4, item_reference_digits: 1 },
    PartitionRow { partition: 1, company_prefix_bits: 37, company_prefix_digits: 11, item_reference_bits: 7, item_reference_digits: 2 },
    PartitionRow { partition: 2, company_prefix_bits: 34, company_prefix_digits: 10, item_reference_bits: 10, item_reference_digits: 3 },
    PartitionRow { partition: 3, company_prefix_bits: 30, company_prefix_digits: 9, item_reference_bits: 14, item_reference_digits: 4 },
    PartitionRow { partition: 4, company_prefix_bits: 27, company_prefix_digits: 8, item_reference_bits: 17, item_reference_digits: 5 },
    PartitionRow { partition: 5, company_prefix_bits: 24, company_prefix_digits: 7, item_reference_bits: 20, item_reference_digits: 6 },
    PartitionRow { partition: 6, company_prefix_bits: 20, company_prefix_digits: 6, item_reference_bits: 24, item_reference_digits: 7 },
];

/// Looks up the row for a 3-bit selector extracted during decode.
///
/// Selector 7 is unassigned by the standard; decoding fails rather than
/// defaulting.
pub fn row_for_selector(selector: u8) -> AppResult<PartitionRow> {
    PARTITION_TABLE
        .get(selector as usize)
        .copied()
        .ok_or(RfidError::UnknownPartition(selector))
}

/// Looks up the row matching a company prefix digit count during encode.
pub fn row_for_prefix_digits(digits: usize) -> AppResult<PartitionRow> {
    PARTITION_TABLE
        .iter()
        .find(|row| row.company_prefix_digits == digits)
        .copied()
        .ok_or_else(|| {
            RfidError::invalid_field(
                "companyPrefix",
                format!("length {digits} is not a supported partition width (6-12 digits)"),
            )
        })
}
