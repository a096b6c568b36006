use sha2::{Digest, Sha256};

use crate::dataset::{ColumnKind, ColumnValues, Dataset};
use crate::value::format_number;

/// Stable SHA-256 fingerprint of a dataset (column names, kinds and cells).
pub fn dataset_fingerprint(dataset: &Dataset) -> String {
    let mut hasher = Sha256::new();
    hasher.update((dataset.row_count() as u64).to_le_bytes());

    for column in dataset.columns() {
        hasher.update(column.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(match column.kind() {
            ColumnKind::Numeric => b"n",
            ColumnKind::Categorical => b"c",
        });

        match &column.values {
            ColumnValues::Numeric(values) => {
                for value in values {
                    match value {
                        Some(value) => {
                            hasher.update([1u8]);
                            hasher.update(format_number(*value).as_bytes());
                        }
                        None => hasher.update([0u8]),
                    }
                    hasher.update([0x1f]);
                }
            }
            ColumnValues::Categorical(values) => {
                for value in values {
                    match value {
                        Some(value) => {
                            hasher.update([1u8]);
                            hasher.update(value.as_bytes());
                        }
                        None => hasher.update([0u8]),
                    }
                    hasher.update([0x1f]);
                }
            }
        }
        hasher.update([0x1e]);
    }

    format!("sha256:{}", hex::encode(hasher.finalize()))
}
