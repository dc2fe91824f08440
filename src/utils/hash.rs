use crate::cancel::CancellationToken;
use crate::error::{HashError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Length in characters of a rendered digest (two hex digits per SHA-256 byte).
pub const DIGEST_HEX_LEN: usize = 64;

/// Default size of the per-worker read buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Why streaming a reader into the digest stopped early.
#[derive(Debug)]
pub enum StreamError {
    /// The underlying reader failed
    Io(std::io::Error),
    /// The cancellation token fired between reads
    Cancelled,
}

/// Digest of in-memory content, rendered as lowercase hex.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Stream `reader` through `buffer` into a fresh SHA-256 context.
///
/// Interrupted reads are retried; any other read error ends the stream so the
/// caller never sees a digest of partial content.
///
/// # Errors
///
/// Returns [`StreamError::Io`] on a read failure and [`StreamError::Cancelled`]
/// if `cancel` fires before the end of the stream.
pub fn hash_reader<R: Read>(
    mut reader: R,
    buffer: &mut [u8],
    cancel: Option<&CancellationToken>,
) -> std::result::Result<String, StreamError> {
    let mut hasher = Sha256::new();

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(StreamError::Cancelled);
        }

        let bytes_read = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Io(e)),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash one file through the caller-owned `buffer`.
///
/// # Errors
///
/// - [`HashError::Open`] if the file cannot be opened
/// - [`HashError::Read`] if reading fails part way through
/// - [`HashError::Cancelled`] if `cancel` fires first
pub fn hash_file_with(
    path: &Path,
    buffer: &mut [u8],
    cancel: Option<&CancellationToken>,
) -> Result<String> {
    let file = File::open(path).map_err(|e| HashError::open(path, e))?;

    match hash_reader(file, buffer, cancel) {
        Ok(digest) => Ok(digest),
        Err(StreamError::Io(e)) => Err(HashError::read(path, e)),
        Err(StreamError::Cancelled) => Err(HashError::Cancelled),
    }
}

/// Hash one file using the default buffer size.
///
/// # Errors
///
/// See [`hash_file_with`].
pub fn hash_file(path: &Path) -> Result<String> {
    let mut buffer = vec![0u8; DEFAULT_BUFFER_SIZE];
    hash_file_with(path, &mut buffer, None)
}

/// Whether `s` has the shape of a rendered digest (either case).
#[must_use]
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Compare two rendered digests, ignoring ASCII case.
#[must_use]
pub fn digests_match(stored: &str, computed: &str) -> bool {
    stored.eq_ignore_ascii_case(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    const SHA256_X: &str = "2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881";
    const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    /// Reader that yields some bytes, then fails
    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("device went away"));
            }
            self.served = true;
            buf[0] = b'x';
            Ok(1)
        }
    }

    /// Reader that is interrupted once before serving its content
    struct InterruptedReader {
        interrupted: bool,
        inner: io::Cursor<Vec<u8>>,
    }

    impl Read for InterruptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_hash_bytes_known_values() {
        assert_eq!(hash_bytes(b"x"), SHA256_X);
        assert_eq!(hash_bytes(b""), SHA256_EMPTY);
        assert_eq!(hash_bytes(b"x").len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_hash_file_matches_bytes() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "x")?;

        assert_eq!(hash_file(&file_path)?, SHA256_X);
        assert_eq!(hash_file(&file_path)?, hash_file(&file_path)?);

        Ok(())
    }

    #[test]
    fn test_small_buffer_spans_many_reads() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file_path, &content)?;

        let mut tiny = vec![0u8; 7];
        assert_eq!(hash_file_with(&file_path, &mut tiny, None)?, hash_bytes(&content));

        Ok(())
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = hash_file(Path::new("/definitely/not/here.bin")).unwrap_err();
        assert!(matches!(err, HashError::Open { .. }));
    }

    #[test]
    fn test_read_failure_is_not_a_digest() {
        let mut buffer = vec![0u8; 16];
        let result = hash_reader(FailingReader { served: false }, &mut buffer, None);
        assert!(matches!(result, Err(StreamError::Io(_))));
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut buffer = vec![0u8; 16];
        let reader = InterruptedReader {
            interrupted: false,
            inner: io::Cursor::new(b"x".to_vec()),
        };
        let digest = hash_reader(reader, &mut buffer, None).unwrap();
        assert_eq!(digest, SHA256_X);
    }

    #[test]
    fn test_cancelled_before_first_read() {
        let token = CancellationToken::new();
        token.cancel();

        let mut buffer = vec![0u8; 16];
        let result = hash_reader(io::Cursor::new(b"x".to_vec()), &mut buffer, Some(&token));
        assert!(matches!(result, Err(StreamError::Cancelled)));
    }

    #[test]
    fn test_digest_shape_and_comparison() {
        assert!(is_hex_digest(SHA256_X));
        assert!(is_hex_digest(&SHA256_X.to_uppercase()));
        assert!(!is_hex_digest("abc"));
        assert!(!is_hex_digest(&"g".repeat(DIGEST_HEX_LEN)));

        assert!(digests_match(&SHA256_X.to_uppercase(), SHA256_X));
        assert!(!digests_match(SHA256_EMPTY, SHA256_X));
    }
}
