/// Coarse classification shared by the crate's error types.
///
/// Callers use it to decide between reporting (`NotFound`, `Unsupported`), retrying or
/// suppressing (`Cancelled`) and aborting the enclosing pass (`Internal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unsupported,
    Cancelled,
    Internal,
}
