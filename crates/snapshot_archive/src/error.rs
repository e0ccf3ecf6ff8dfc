//! Archive-layer error types.

/// Errors that can occur while reading or writing an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The underlying stream failed.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a value could be read in full.
    #[error("unexpected end of archive: needed {needed} more bytes")]
    UnexpectedEof {
        /// How many bytes the failed read still required.
        needed: usize,
    },

    /// A length prefix exceeded the archive's sanity limit.
    #[error("declared payload length {length} exceeds the limit of {limit} bytes")]
    PayloadTooLarge {
        /// The declared length.
        length: usize,
        /// The configured limit.
        limit: usize,
    },
}
