use thiserror::Error;

#[derive(Error, Debug)]
pub enum PclError {
    #[error("IO error")]
    IoError(std::io::Error),
    #[error("row length {actual} does not match the image box width {expected}")]
    RowLengthMismatch { expected: usize, actual: usize },
    #[error("more rows were written than the page height declares")]
    TooManyRows,
    #[error("page was dropped before all rows were written")]
    IncompletePage,
}

/// `PclLineEncoder::poll_write` can only return `std::io::Result` (the
/// `AsyncWrite` signature), so it wraps its structured validation failures
/// as the inner error of a plain `io::Error`. Recover the original variant
/// here instead of collapsing every I/O error into `IoError`.
impl From<std::io::Error> for PclError {
    fn from(err: std::io::Error) -> Self {
        let carries_pcl_error = err.get_ref().map(|inner| inner.is::<PclError>()).unwrap_or(false);
        if carries_pcl_error {
            let boxed = err.into_inner().expect("checked Some above");
            return *boxed.downcast::<PclError>().expect("checked is::<PclError>() above");
        }
        PclError::IoError(err)
    }
}
