//! Decompression stream over the raw input file
//!
//! The codec is chosen from the frame magic at the start of the file, so a
//! malformed or unsupported input fails before any segment file is created.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Size of the buffer between the raw file and the decoder
const SOURCE_BUFFER_SIZE: usize = 1024 * 1024;

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Supported compression codecs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Codec {
    /// Detect the codec from the frame magic
    #[default]
    Auto,
    /// Zstandard frames
    Zstd,
    /// Gzip members
    Gzip,
}

impl Codec {
    /// Codec identifier as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::Auto => "auto",
            Codec::Zstd => "zstd",
            Codec::Gzip => "gzip",
        }
    }

    /// Identify the codec from the first bytes of a stream
    ///
    /// Returns `Ok(None)` for an empty stream.
    pub fn sniff(head: &[u8]) -> Result<Option<Codec>> {
        if head.is_empty() {
            return Ok(None);
        }
        if head.starts_with(&GZIP_MAGIC) {
            return Ok(Some(Codec::Gzip));
        }
        if head.len() < ZSTD_MAGIC.len() {
            return Err(Error::DecompressionInit(format!(
                "truncated frame header ({} bytes)",
                head.len()
            )));
        }
        // Skippable zstd frames use magic 0x184D2A50..=0x184D2A5F (little endian)
        let skippable = head[0] & 0xF0 == 0x50 && head[1..4] == [0x2A, 0x4D, 0x18];
        if head.starts_with(&ZSTD_MAGIC) || skippable {
            return Ok(Some(Codec::Zstd));
        }
        Err(Error::DecompressionInit(format!(
            "unrecognised frame magic {:02x?}",
            &head[..ZSTD_MAGIC.len()]
        )))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Codec::Auto),
            "zstd" | "zst" => Ok(Codec::Zstd),
            "gzip" | "gz" => Ok(Codec::Gzip),
            other => Err(Error::Configuration(format!(
                "unsupported compression codec: {other}"
            ))),
        }
    }
}

/// Decompression settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressionConfig {
    /// Codec to use, or `Auto` to detect it
    pub codec: Codec,
    /// Largest zstd window (log2) the decoder accepts
    pub window_log_max: u32,
}

impl Default for DecompressionConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Auto,
            window_log_max: crate::config::defaults::ZSTD_WINDOW_LOG_MAX,
        }
    }
}

/// Counts bytes pulled from the raw file
struct CountingReader<R> {
    inner: R,
    count: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Sequential decompressed view of a compressed input file
///
/// Dropping the stream closes the underlying file.
pub struct DecompressedStream {
    inner: Box<dyn Read + Send>,
    codec: Option<Codec>,
    compressed_read: Arc<AtomicU64>,
}

impl fmt::Debug for DecompressedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecompressedStream")
            .field("codec", &self.codec)
            .field("compressed_read", &self.compressed_bytes_read())
            .finish()
    }
}

impl DecompressedStream {
    /// Codec in use, `None` if the input was empty
    pub fn codec(&self) -> Option<Codec> {
        self.codec
    }

    /// Compressed bytes consumed from the file so far
    pub fn compressed_bytes_read(&self) -> u64 {
        self.compressed_read.load(Ordering::Relaxed)
    }

    /// Shared handle to the compressed byte counter
    pub fn progress_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.compressed_read)
    }
}

impl Read for DecompressedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Open `path` and wrap it in the decoder for its codec
pub fn open_source(path: &Path, config: &DecompressionConfig) -> Result<DecompressedStream> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let compressed_read = Arc::new(AtomicU64::new(0));
    let counting = CountingReader {
        inner: file,
        count: Arc::clone(&compressed_read),
    };
    let mut source = BufReader::with_capacity(SOURCE_BUFFER_SIZE, counting);

    let head = source
        .fill_buf()
        .map_err(|e| Error::DecompressionInit(format!("failed to read frame header: {e}")))?;
    let detected = Codec::sniff(head)?;

    let codec = match (config.codec, detected) {
        (_, None) => None,
        (Codec::Auto, Some(found)) => Some(found),
        (wanted, Some(found)) if wanted == found => Some(found),
        (wanted, Some(found)) => {
            return Err(Error::DecompressionInit(format!(
                "expected a {wanted} stream but found {found}"
            )))
        }
    };

    let inner: Box<dyn Read + Send> = match codec {
        None => Box::new(io::empty()),
        Some(Codec::Zstd) => {
            let mut decoder = zstd::stream::read::Decoder::with_buffer(source)
                .map_err(|e| Error::DecompressionInit(format!("zstd: {e}")))?;
            decoder
                .window_log_max(config.window_log_max)
                .map_err(|e| Error::DecompressionInit(format!("zstd window: {e}")))?;
            Box::new(decoder)
        }
        Some(Codec::Gzip) => Box::new(flate2::bufread::MultiGzDecoder::new(source)),
        Some(Codec::Auto) => unreachable!("sniffing never yields Auto"),
    };

    log::debug!(
        "Opened {} ({})",
        path.display(),
        codec.map_or("empty", |c| c.as_str())
    );

    Ok(DecompressedStream {
        inner,
        codec,
        compressed_read,
    })
}
