//! Sparse and small dense matrix storage for mortar assembly.

use serde::{Deserialize, Serialize};
use tactus_types::Scalar;

/// Compressed Sparse Row matrix.
///
/// Built from `(row, col, value)` triplets; duplicate entries are summed
/// during finalization. This is the exchange format handed back to the
/// host (`row_ptr`, `col_idx`, `values`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries, sorted within each row.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<Scalar>,
}

impl CsrMatrix {
    /// Number of stored non-zeros.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Builds a CSR matrix from triplets, summing duplicates.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, Scalar)]) -> Self {
        // count entries per row
        let mut row_counts = vec![0usize; rows];
        for &(r, _, _) in triplets {
            row_counts[r] += 1;
        }

        let mut row_ptr = vec![0usize; rows + 1];
        for i in 0..rows {
            row_ptr[i + 1] = row_ptr[i] + row_counts[i];
        }

        let nnz = row_ptr[rows];
        let mut col_idx = vec![0usize; nnz];
        let mut values = vec![0.0; nnz];

        // fill, using a per-row write cursor
        let mut cursor = row_ptr[..rows].to_vec();
        for &(r, c, v) in triplets {
            let pos = cursor[r];
            col_idx[pos] = c;
            values[pos] = v;
            cursor[r] += 1;
        }

        // sort each row by column (insertion sort; rows are small) and
        // merge duplicate columns
        let mut merged_col = Vec::with_capacity(nnz);
        let mut merged_val = Vec::with_capacity(nnz);
        let mut merged_ptr = vec![0usize; rows + 1];

        for i in 0..rows {
            let start = row_ptr[i];
            let end = row_ptr[i + 1];
            let cols_row = &mut col_idx[start..end];
            let vals_row = &mut values[start..end];

            for j in 1..cols_row.len() {
                let mut k = j;
                while k > 0 && cols_row[k - 1] > cols_row[k] {
                    cols_row.swap(k - 1, k);
                    vals_row.swap(k - 1, k);
                    k -= 1;
                }
            }

            let mut j = 0;
            while j < cols_row.len() {
                let c = cols_row[j];
                let mut v = vals_row[j];
                let mut k = j + 1;
                while k < cols_row.len() && cols_row[k] == c {
                    v += vals_row[k];
                    k += 1;
                }
                merged_col.push(c);
                merged_val.push(v);
                j = k;
            }
            merged_ptr[i + 1] = merged_col.len();
        }

        Self {
            rows,
            cols,
            row_ptr: merged_ptr,
            col_idx: merged_col,
            values: merged_val,
        }
    }

    /// Value at `(r, c)`; zero when the entry is not stored.
    pub fn get(&self, r: usize, c: usize) -> Scalar {
        let start = self.row_ptr[r];
        let end = self.row_ptr[r + 1];
        for k in start..end {
            if self.col_idx[k] == c {
                return self.values[k];
            }
        }
        0.0
    }
}

/// Small row-major dense matrix used for per-element Jacobian blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseMat {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Scalar>,
}

impl DenseMat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    #[inline]
    pub fn at(&self, r: usize, c: usize) -> Scalar {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub fn at_mut(&mut self, r: usize, c: usize) -> &mut Scalar {
        &mut self.data[r * self.cols + c]
    }
}
