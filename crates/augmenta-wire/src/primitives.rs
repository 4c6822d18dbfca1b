//! OSC primitive reads and writes
//!
//! All reads take a cursor (`&mut &[u8]`) and advance it. Length checks
//! happen before every `bytes` getter, which would otherwise panic.

use augmenta_core::{AugmentaError, AugmentaResult};
use bytes::{Buf, BufMut, BytesMut};

/// Round up to the next multiple of 4
#[inline]
pub(crate) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

#[inline]
fn ensure(buf: &[u8], expected: usize) -> AugmentaResult<()> {
    if buf.len() < expected {
        return Err(AugmentaError::BufferTooShort {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

pub(crate) fn read_i32(buf: &mut &[u8]) -> AugmentaResult<i32> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

pub(crate) fn read_u32(buf: &mut &[u8]) -> AugmentaResult<u32> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

pub(crate) fn read_f32(buf: &mut &[u8]) -> AugmentaResult<f32> {
    ensure(buf, 4)?;
    Ok(buf.get_f32())
}

pub(crate) fn read_i64(buf: &mut &[u8]) -> AugmentaResult<i64> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

pub(crate) fn read_u64(buf: &mut &[u8]) -> AugmentaResult<u64> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

pub(crate) fn read_f64(buf: &mut &[u8]) -> AugmentaResult<f64> {
    ensure(buf, 8)?;
    Ok(buf.get_f64())
}

/// Null-terminated, 4-byte padded string
pub(crate) fn read_string(buf: &mut &[u8]) -> AugmentaResult<String> {
    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| AugmentaError::InvalidWireFormat("Unterminated string".into()))?;

    let value = std::str::from_utf8(&buf[..nul])
        .map_err(|_| AugmentaError::InvalidWireFormat("String is not UTF-8".into()))?
        .to_string();

    let total = padded_len(nul + 1);
    ensure(buf, total)?;
    buf.advance(total);

    Ok(value)
}

/// Size-prefixed, 4-byte padded blob
pub(crate) fn read_blob(buf: &mut &[u8]) -> AugmentaResult<Vec<u8>> {
    let len = read_i32(buf)?;
    if len < 0 {
        return Err(AugmentaError::InvalidWireFormat(format!(
            "Negative blob size: {}",
            len
        )));
    }

    let len = len as usize;
    let total = padded_len(len);
    ensure(buf, total)?;

    let blob = buf[..len].to_vec();
    buf.advance(total);
    Ok(blob)
}

pub(crate) fn write_string(out: &mut BytesMut, value: &str) -> AugmentaResult<()> {
    if value.as_bytes().contains(&0) {
        return Err(AugmentaError::InvalidWireFormat(
            "String contains a NUL byte".into(),
        ));
    }

    out.put_slice(value.as_bytes());
    let total = padded_len(value.len() + 1);
    out.put_bytes(0, total - value.len());
    Ok(())
}

pub(crate) fn write_blob(out: &mut BytesMut, blob: &[u8]) -> AugmentaResult<()> {
    let len = i32::try_from(blob.len())
        .map_err(|_| AugmentaError::InvalidWireFormat("Blob too large".into()))?;

    out.put_i32(len);
    out.put_slice(blob);
    out.put_bytes(0, padded_len(blob.len()) - blob.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(5), 8);
    }

    #[test]
    fn test_string_padding() {
        let mut out = BytesMut::new();
        write_string(&mut out, "abc").unwrap();
        assert_eq!(&out[..], b"abc\0");

        out.clear();
        write_string(&mut out, "abcd").unwrap();
        assert_eq!(&out[..], b"abcd\0\0\0\0");

        let bytes = out.freeze();
        let mut cursor: &[u8] = &bytes;
        assert_eq!(read_string(&mut cursor).unwrap(), "abcd");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_truncated_reads() {
        let mut cursor: &[u8] = &[0, 0, 1];
        assert!(matches!(
            read_i32(&mut cursor),
            Err(AugmentaError::BufferTooShort { expected: 4, actual: 3 })
        ));

        // Terminator present but padding missing
        let mut cursor: &[u8] = b"abcd\0";
        assert!(read_string(&mut cursor).is_err());

        let mut cursor: &[u8] = b"abc";
        assert!(read_string(&mut cursor).is_err());
    }

    #[test]
    fn test_blob_read() {
        let mut out = BytesMut::new();
        write_blob(&mut out, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(out.len(), 4 + 8);

        let bytes = out.freeze();
        let mut cursor: &[u8] = &bytes;
        assert_eq!(read_blob(&mut cursor).unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(cursor.is_empty());

        let mut negative: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];
        assert!(read_blob(&mut negative).is_err());
    }
}
