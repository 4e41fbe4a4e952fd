use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};

/// Borrowing stream adapter whose end of life leaves the wrapped stream open.
///
/// Decoders and encoders take ownership of their stream and finish or drop
/// it when they are done. Handing them a `NonClosing` instead lets a nested
/// rewrite complete its lifecycle while the caller keeps using the stream.
pub struct NonClosing<'a, T: ?Sized> {
    inner: &'a mut T,
}

impl<'a, T: ?Sized> NonClosing<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self { inner }
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<T: Read + ?Sized> Read for NonClosing<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<T: BufRead + ?Sized> BufRead for NonClosing<'_, T> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

impl<T: Write + ?Sized> Write for NonClosing<'_, T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<T: Seek + ?Sized> Seek for NonClosing<'_, T> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Largest buffer reserved up front from a size the source declares.
const RESERVE_LIMIT: u64 = 1 << 20;

/// Read a whole entry. `declared` is only a capacity hint, bounded by
/// [`RESERVE_LIMIT`]; the buffer grows with what is actually read.
pub(crate) fn read_entry<R: Read + ?Sized>(reader: &mut R, declared: u64) -> io::Result<Vec<u8>> {
    let mut content = Vec::with_capacity(declared.min(RESERVE_LIMIT) as usize);
    reader.read_to_end(&mut content)?;
    Ok(content)
}
