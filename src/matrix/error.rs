use thiserror::Error;

#[derive(Debug, Error)]
pub enum SparseVecError {
    #[error("dense target of length {dense_len} cannot hold index {max_index}")]
    DenseTooSmall { max_index: usize, dense_len: usize },
}

#[derive(Debug, Error)]
pub enum CscError {
    #[error("column pointer array has length {actual}, expected {expected}")]
    ColumnPointerLength { expected: usize, actual: usize },

    #[error("column pointer {col} is {actual}, expected {expected}")]
    ColumnPointerMismatch { col: usize, expected: usize, actual: usize },

    #[error("row index array has length {row_idx}, value array {values}")]
    IndexValueLengthMismatch { row_idx: usize, values: usize },

    #[error("{nnz} stored entries exceed allocated storage {len}")]
    EntryCountExceedsStorage { nnz: usize, len: usize },

    #[error("row {row} out of bounds for {nrows} rows")]
    RowOutOfBounds { row: usize, nrows: usize },

    #[error("column {col} out of bounds for {ncols} columns")]
    ColumnOutOfBounds { col: usize, ncols: usize },

    #[error("rows in column {col} not strictly ascending: {prev} then {row}")]
    RowsNotAscending { col: usize, prev: usize, row: usize },
}
