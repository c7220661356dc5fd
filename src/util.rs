use std::io;

/// Reads until the buffer is full or the source hits EOF.
/// Returns the number of bytes read.
pub(crate) fn fill_buffer<R: io::Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut offset = 0;
    loop {
        if offset == buf.len() {
            return Ok(offset);
        }
        match source.read(&mut buf[offset..]) {
            Ok(0) => return Ok(offset),
            Ok(n) => offset += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Prefixes the given bytes with zeros until they are `size` long.
/// Needed because MPIs strip leading zeros, while the RSA primitives
/// expect values of exactly the key size.
pub(crate) fn left_pad(bytes: &[u8], size: usize) -> Vec<u8> {
    debug_assert!(bytes.len() <= size);

    let mut padded = vec![0u8; size];
    padded[size - bytes.len()..].copy_from_slice(bytes);
    padded
}
