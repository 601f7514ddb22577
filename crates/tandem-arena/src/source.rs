//! Loading announced-size byte sources into an arena.
//!
//! Asset loaders typically learn a file's size first and then read it into
//! a caller buffer. [`ByteSource`] captures that two-step contract so the
//! arena can reserve exactly the announced size up front.

use crate::arena::Arena;
use crate::error::ArenaError;

/// Anything that reports its length and then copies itself out.
pub trait ByteSource {
    /// Number of bytes [`read_into`](Self::read_into) will produce.
    fn byte_len(&self) -> usize;

    /// Fill `dst` from the start and return how many bytes were written.
    ///
    /// `dst` is exactly [`byte_len`](Self::byte_len) bytes long. A return
    /// value different from that length is reported as
    /// [`ArenaError::SourceLength`].
    fn read_into(&self, dst: &mut [u8]) -> usize;
}

impl ByteSource for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn read_into(&self, dst: &mut [u8]) -> usize {
        let n = self.len().min(dst.len());
        dst[..n].copy_from_slice(&self[..n]);
        n
    }
}

impl ByteSource for str {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn read_into(&self, dst: &mut [u8]) -> usize {
        self.as_bytes().read_into(dst)
    }
}

impl ByteSource for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn read_into(&self, dst: &mut [u8]) -> usize {
        self.as_slice().read_into(dst)
    }
}

impl ByteSource for String {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn read_into(&self, dst: &mut [u8]) -> usize {
        self.as_bytes().read_into(dst)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }

    fn read_into(&self, dst: &mut [u8]) -> usize {
        (**self).read_into(dst)
    }
}

impl<'buf> Arena<'buf> {
    /// Push `source.byte_len()` bytes on the bottom side and fill them.
    ///
    /// On [`ArenaError::SourceLength`] the region stays pushed; restore a
    /// checkpoint taken before the call to reclaim it.
    #[allow(clippy::mut_from_ref)]
    pub fn load<S: ByteSource + ?Sized>(&self, source: &S) -> Result<&mut [u8], ArenaError> {
        let expected = source.byte_len();
        let dst = self.push(expected)?;
        let actual = source.read_into(dst);
        if actual != expected {
            return Err(ArenaError::SourceLength { expected, actual });
        }
        Ok(dst)
    }

    /// Like [`Arena::load`], with one extra trailing `0` byte.
    ///
    /// The returned slice includes the terminator.
    #[allow(clippy::mut_from_ref)]
    pub fn load_nul_terminated<S: ByteSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<&mut [u8], ArenaError> {
        let expected = source.byte_len();
        let dst = self.push(expected.saturating_add(1))?;
        let (body, nul) = dst.split_at_mut(expected);
        let actual = source.read_into(body);
        if actual != expected {
            return Err(ArenaError::SourceLength { expected, actual });
        }
        nul[0] = 0;
        Ok(dst)
    }
}
