use std::io::{self, Read, Write};

use crate::{Accumulator, Algorithm};

/// A cascade of accumulators fed by the same byte stream.
///
/// Every byte reaches each accumulator exactly once, in the order the
/// algorithms were given.
#[derive(Debug)]
pub struct DigestChain {
    accumulators: Vec<Accumulator>,
}

impl DigestChain {
    pub fn new(algorithms: &[Algorithm]) -> Self {
        Self {
            accumulators: algorithms.iter().copied().map(Accumulator::new).collect(),
        }
    }

    /// MD5, then SHA-1, then SHA-256.
    pub fn standard() -> Self {
        Self::new(&Algorithm::ALL)
    }

    pub fn update(&mut self, data: &[u8]) {
        for acc in &mut self.accumulators {
            acc.update(data);
        }
    }

    pub fn algorithms(&self) -> impl Iterator<Item = Algorithm> + '_ {
        self.accumulators.iter().map(Accumulator::algorithm)
    }

    pub fn get(&mut self, algorithm: Algorithm) -> Option<&mut Accumulator> {
        self.accumulators
            .iter_mut()
            .find(|acc| acc.algorithm() == algorithm)
    }

    pub fn hex(&mut self, algorithm: Algorithm) -> Option<String> {
        self.get(algorithm).map(Accumulator::hex)
    }

    pub fn byte_count(&self) -> u64 {
        self.accumulators.first().map_or(0, Accumulator::byte_count)
    }
}

/// Reader adapter that feeds every byte it yields through a [`DigestChain`].
///
/// Digests are only complete once the inner reader is drained.
pub struct DigestReader<R> {
    inner: R,
    chain: DigestChain,
}

impl<R: Read> DigestReader<R> {
    pub fn new(inner: R, chain: DigestChain) -> Self {
        Self { inner, chain }
    }

    pub fn standard(inner: R) -> Self {
        Self::new(inner, DigestChain::standard())
    }

    /// Drain the rest of the stream without keeping it.
    pub fn drain(&mut self) -> io::Result<u64> {
        io::copy(self, &mut io::sink())
    }

    pub fn digests(&self) -> &DigestChain {
        &self.chain
    }

    pub fn digests_mut(&mut self) -> &mut DigestChain {
        &mut self.chain
    }

    pub fn into_parts(self) -> (R, DigestChain) {
        (self.inner, self.chain)
    }
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.chain.update(&buf[..n]);
        }
        Ok(n)
    }
}

/// Writer adapter that digests exactly the bytes accepted by the inner writer.
pub struct DigestWriter<W> {
    inner: W,
    chain: DigestChain,
}

impl<W: Write> DigestWriter<W> {
    pub fn new(inner: W, chain: DigestChain) -> Self {
        Self { inner, chain }
    }

    pub fn standard(inner: W) -> Self {
        Self::new(inner, DigestChain::standard())
    }

    pub fn digests(&self) -> &DigestChain {
        &self.chain
    }

    pub fn digests_mut(&mut self) -> &mut DigestChain {
        &mut self.chain
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_parts(self) -> (W, DigestChain) {
        (self.inner, self.chain)
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.chain.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
