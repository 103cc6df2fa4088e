use core::fmt;

/// All errors the crate can produce.
///
/// Messages are kept terse; callers that need richer context should wrap
/// `Error` in their own type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The (m, t) pair is out of range, or m·t is not below 2^m.
    InvalidParameters,
    /// The field extension degree exceeds 16.
    FieldTooLarge,
    /// The parity-check matrix is rank-deficient (keygen retries internally;
    /// this only reaches a caller through lower-level entry points).
    MatrixSingular,
    /// The error-locator polynomial has the wrong degree or too few roots;
    /// the block cannot be decoded.
    Undecodable,
    /// The constant-weight codec ran out of bits before covering the
    /// requested length.
    CwwShortBuffer,
    /// The codec was invoked with (m, t) different from the precomputation
    /// it was handed.
    InconsistentPrecomp,
    /// A bit-level read or write landed beyond the logical end of a buffer.
    BufferOverrun,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameters => write!(f, "invalid (m, t) parameters"),
            Error::FieldTooLarge => write!(f, "field extension degree above 16"),
            Error::MatrixSingular => write!(f, "parity-check matrix is singular"),
            Error::Undecodable => write!(f, "ciphertext block is undecodable"),
            Error::CwwShortBuffer => write!(f, "constant-weight codec exhausted its bit budget"),
            Error::InconsistentPrecomp => write!(f, "precomputation does not match (m, t)"),
            Error::BufferOverrun => write!(f, "bit access beyond end of buffer"),
        }
    }
}

impl std::error::Error for Error {}
