//! Bounds-checked cursor over wire bytes.

use sol_layout::{decode_length, LayoutError};

use crate::error::SerializeError;

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn bytes(&mut self, len: usize, what: &str) -> Result<&'a [u8], SerializeError> {
        if self.remaining() < len {
            return Err(LayoutError::Truncated {
                field: what.to_string(),
                needed: len,
                remaining: self.remaining(),
            }
            .into());
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub(crate) fn u8(&mut self, what: &str) -> Result<u8, SerializeError> {
        Ok(self.bytes(1, what)?[0])
    }

    pub(crate) fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], SerializeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, what)?);
        Ok(out)
    }

    /// Read a compact-length prefix.
    pub(crate) fn length(&mut self) -> Result<usize, SerializeError> {
        let (len, consumed) = decode_length(&self.data[self.pos..])?;
        self.pos += consumed;
        Ok(usize::from(len))
    }

    /// Fail unless every byte was consumed.
    pub(crate) fn finish(&self, what: &str) -> Result<(), SerializeError> {
        if self.remaining() != 0 {
            return Err(SerializeError::Malformed(format!(
                "{} trailing bytes after {what}",
                self.remaining()
            )));
        }
        Ok(())
    }
}
