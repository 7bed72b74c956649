//! Buffered record reader over the decompressed stream

use crate::error::{Error, Result};
use std::io::{self, BufRead, BufReader, Read};

/// Initial capacity of the record scratch buffer
const INITIAL_RECORD_CAPACITY: usize = 64 * 1024;

/// Splits a byte stream into newline-delimited records
///
/// Records are returned without their terminator; a trailing `\r` is
/// stripped as well, so `\r\n` input is normalized. A final line without a
/// terminator is still returned as a record.
pub struct RecordReader<R> {
    inner: BufReader<R>,
    record: Vec<u8>,
    max_record_size: usize,
    records_read: u64,
    bytes_read: u64,
}

impl<R: Read> RecordReader<R> {
    /// Create a reader with a read buffer of `buffer_size` bytes
    ///
    /// `max_record_size` bounds a single record independently of the buffer.
    pub fn new(inner: R, buffer_size: usize, max_record_size: usize) -> Self {
        Self {
            inner: BufReader::with_capacity(buffer_size, inner),
            record: Vec::with_capacity(INITIAL_RECORD_CAPACITY.min(max_record_size)),
            max_record_size,
            records_read: 0,
            bytes_read: 0,
        }
    }

    /// Read the next record
    ///
    /// Returns `Ok(None)` at end of input. A record longer than the
    /// configured maximum fails with [`Error::RecordTooLarge`] before any of
    /// it is handed out.
    pub fn next_record(&mut self) -> Result<Option<&[u8]>> {
        self.record.clear();
        let mut started = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Read(e)),
            };

            if available.is_empty() {
                if !started {
                    return Ok(None);
                }
                break;
            }
            started = true;

            let (take, consume, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(newline) => (newline, newline + 1, true),
                None => (available.len(), available.len(), false),
            };

            // A trailing '\r' may be the first half of a CRLF terminator and
            // does not count against the limit
            let mut size = self.record.len() + take;
            let trailing = match take {
                0 => self.record.last(),
                _ => available.get(take - 1),
            };
            if trailing == Some(&b'\r') {
                size -= 1;
            }
            if size > self.max_record_size {
                return Err(Error::RecordTooLarge {
                    size,
                    limit: self.max_record_size,
                });
            }

            self.record.extend_from_slice(&available[..take]);
            self.inner.consume(consume);
            self.bytes_read += consume as u64;

            if complete {
                break;
            }
        }

        if self.record.last() == Some(&b'\r') {
            self.record.pop();
        }

        self.records_read += 1;
        Ok(Some(&self.record))
    }

    /// Number of records returned so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Decompressed bytes consumed so far, terminators included
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Access the wrapped stream
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect<R: Read>(reader: &mut RecordReader<R>) -> Vec<Vec<u8>> {
        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record.to_vec());
        }
        records
    }

    /// Reader that hands out at most `chunk` bytes per call
    struct Trickle {
        data: Vec<u8>,
        position: usize,
        chunk: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let remaining = self.data.len() - self.position;
            let n = remaining.min(self.chunk).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.position..self.position + n]);
            self.position += n;
            Ok(n)
        }
    }

    /// Reader that fails after its data runs out
    struct Failing {
        data: Cursor<Vec<u8>>,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt block")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_basic_records() {
        let mut reader = RecordReader::new(Cursor::new(b"a\nbb\nccc\n".to_vec()), 1024, 1024);
        assert_eq!(collect(&mut reader), vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]);
        assert_eq!(reader.records_read(), 3);
        assert_eq!(reader.bytes_read(), 9);
    }

    #[test]
    fn test_final_record_without_newline() {
        let mut reader = RecordReader::new(Cursor::new(b"first\nlast".to_vec()), 1024, 1024);
        assert_eq!(collect(&mut reader), vec![b"first".to_vec(), b"last".to_vec()]);
    }

    #[test]
    fn test_crlf_and_empty_lines() {
        let mut reader = RecordReader::new(Cursor::new(b"a\r\n\nb\r\n".to_vec()), 1024, 1024);
        assert_eq!(collect(&mut reader), vec![b"a".to_vec(), Vec::new(), b"b".to_vec()]);
    }

    #[test]
    fn test_empty_input() {
        let mut reader = RecordReader::new(Cursor::new(Vec::new()), 1024, 1024);
        assert!(reader.next_record().unwrap().is_none());
        // Stays at end of input
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 0);
    }

    #[test]
    fn test_record_larger_than_buffer() {
        let long = vec![b'x'; 10_000];
        let mut data = long.clone();
        data.extend_from_slice(b"\nshort\n");

        // 16-byte buffer, record spans hundreds of refills
        let mut reader = RecordReader::new(Cursor::new(data), 16, 20_000);
        assert_eq!(collect(&mut reader), vec![long, b"short".to_vec()]);
    }

    #[test]
    fn test_trickling_source() {
        let data = b"{\"id\":1}\n{\"id\":2}\n{\"id\":3}".to_vec();
        let source = Trickle {
            data,
            position: 0,
            chunk: 3,
        };
        let mut reader = RecordReader::new(source, 4, 64);
        assert_eq!(
            collect(&mut reader),
            vec![
                b"{\"id\":1}".to_vec(),
                b"{\"id\":2}".to_vec(),
                b"{\"id\":3}".to_vec()
            ]
        );
    }

    #[test]
    fn test_record_at_limit_accepted() {
        let mut reader = RecordReader::new(Cursor::new(b"12345\n".to_vec()), 2, 5);
        assert_eq!(reader.next_record().unwrap(), Some(&b"12345"[..]));
    }

    #[test]
    fn test_crlf_record_at_limit_accepted() {
        let mut reader = RecordReader::new(Cursor::new(b"12345\r\nok\n".to_vec()), 1024, 5);
        assert_eq!(reader.next_record().unwrap(), Some(&b"12345"[..]));
        assert_eq!(reader.next_record().unwrap(), Some(&b"ok"[..]));
    }

    #[test]
    fn test_crlf_split_across_refills() {
        // Small refills deliver the CR and LF of a terminator separately
        for chunk in [1, 2, 3, 6] {
            let source = Trickle {
                data: b"12345\r\nabcde\r\n".to_vec(),
                position: 0,
                chunk,
            };
            let mut reader = RecordReader::new(source, chunk, 5);
            assert_eq!(
                collect(&mut reader),
                vec![b"12345".to_vec(), b"abcde".to_vec()],
                "chunk size {chunk}"
            );
        }
    }

    #[test]
    fn test_carriage_return_inside_record_counts() {
        // '\r' not followed by '\n' is record content
        let mut reader = RecordReader::new(Cursor::new(b"1234\r5\n".to_vec()), 3, 5);
        assert!(matches!(
            reader.next_record(),
            Err(Error::RecordTooLarge { size: 6, limit: 5 })
        ));
    }

    #[test]
    fn test_crlf_record_over_limit_rejected() {
        let mut reader = RecordReader::new(Cursor::new(b"123456\r\n".to_vec()), 1024, 5);
        assert!(matches!(
            reader.next_record(),
            Err(Error::RecordTooLarge { size: 6, limit: 5 })
        ));
    }

    #[test]
    fn test_record_too_large() {
        let mut reader = RecordReader::new(Cursor::new(b"ok\n123456\nnext\n".to_vec()), 4, 5);
        assert_eq!(reader.next_record().unwrap(), Some(&b"ok"[..]));

        match reader.next_record() {
            Err(Error::RecordTooLarge { size, limit }) => {
                assert!(size > 5);
                assert_eq!(limit, 5);
            }
            other => panic!("expected RecordTooLarge, got {:?}", other.map(|r| r.map(<[u8]>::to_vec))),
        }
    }

    #[test]
    fn test_read_error_propagates() {
        let source = Failing {
            data: Cursor::new(b"one\ntw".to_vec()),
        };
        let mut reader = RecordReader::new(source, 1024, 1024);
        assert_eq!(reader.next_record().unwrap(), Some(&b"one"[..]));
        assert!(matches!(reader.next_record(), Err(Error::Read(_))));
    }
}
