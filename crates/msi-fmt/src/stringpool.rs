//! The deduplicated string pool backing every string-valued cell.
//!
//! The pool is split over two streams: `_StringPool` holds a header word
//! and per-entry (length, refcount) descriptors, `_StringData` holds the
//! concatenated raw bytes of all entries in descriptor order.

use std::io::{Cursor, Read, Seek, Write};
use std::sync::Arc;

use binrw::{BinRead, BinReaderExt, BinResult, BinWrite, Endian};

use crate::{CodePage, PoolError};

/// Top bit of the pool header word: descriptors are referenced with
/// 3-byte indices instead of 2-byte ones.
pub const LONG_STRING_REFS_BIT: u32 = 0x8000_0000;

#[derive(Debug)]
struct PoolEntry {
    text: Arc<str>,
    refcount: u16,
}

/// The decoded string pool, loaded once per package and immutable
/// thereafter. Index 0 is the empty-string sentinel; indices from 1
/// address real entries.
#[derive(Debug)]
pub struct StringPool {
    codepage: CodePage,
    long_string_refs: bool,
    entries: Vec<PoolEntry>,
    empty: Arc<str>,
}

impl StringPool {
    /// Decodes the `_StringPool`/`_StringData` stream pair.
    ///
    /// Validates that the descriptor lengths cover the data stream
    /// exactly; reference validation happens lazily in [`Self::get`].
    pub fn read(pool: &[u8], data: &[u8]) -> Result<StringPool, PoolError> {
        if pool.len() < 4 {
            return Err(PoolError::Truncated);
        }
        let mut reader = Cursor::new(pool);
        let header: u32 = reader.read_le()?;
        let long_string_refs = header & LONG_STRING_REFS_BIT != 0;
        let codepage = CodePage::from_id(header & !LONG_STRING_REFS_BIT)?;

        let descriptors = &pool[4..];
        if descriptors.len() % 4 != 0 {
            return Err(PoolError::Truncated);
        }
        let count = descriptors.len() / 4;

        let mut entries = Vec::with_capacity(count);
        let mut offset = 0usize;
        let mut read_so_far = 0usize;
        while read_so_far < count {
            let mut length = reader.read_le::<u16>()? as u32;
            let mut refcount: u16 = reader.read_le()?;
            read_so_far += 1;
            if length == 0 && refcount != 0 {
                // Long-string escape: this refcount holds the high half
                // of the length, the following descriptor the low half
                // and the real refcount.
                if read_so_far == count {
                    return Err(PoolError::Truncated);
                }
                length = (refcount as u32) << 16 | reader.read_le::<u16>()? as u32;
                refcount = reader.read_le()?;
                read_so_far += 1;
            }
            let length = length as usize;
            let end = offset.checked_add(length).filter(|end| *end <= data.len());
            let Some(end) = end else {
                return Err(PoolError::DataSizeMismatch {
                    expected: (offset as u64).saturating_add(length as u64),
                    actual: data.len() as u64,
                });
            };
            entries.push(PoolEntry {
                text: codepage.decode(&data[offset..end]).into(),
                refcount,
            });
            offset = end;
        }
        if offset != data.len() {
            return Err(PoolError::DataSizeMismatch {
                expected: offset as u64,
                actual: data.len() as u64,
            });
        }

        Ok(StringPool {
            codepage,
            long_string_refs,
            entries,
            empty: Arc::from(""),
        })
    }

    pub fn codepage(&self) -> CodePage {
        self.codepage
    }

    /// Whether cell references into this pool occupy 3 bytes.
    pub fn long_string_refs(&self) -> bool {
        self.long_string_refs
    }

    /// Number of slots, excluding the index-0 sentinel.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a pool reference. Index 0 yields the shared empty string.
    pub fn get(&self, index: u32) -> Result<Arc<str>, PoolError> {
        if index == 0 {
            return Ok(Arc::clone(&self.empty));
        }
        self.entries
            .get(index as usize - 1)
            .map(|entry| Arc::clone(&entry.text))
            .ok_or(PoolError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// The reference count recorded for a slot, if it exists.
    pub fn refcount(&self, index: u32) -> Option<u16> {
        if index == 0 {
            return None;
        }
        self.entries
            .get(index as usize - 1)
            .map(|entry| entry.refcount)
    }
}

/// A little-endian string-pool reference as it appears in a row block:
/// 2 bytes, or 3 when the pool header sets [`LONG_STRING_REFS_BIT`].
///
/// Parameterised over that flag via binrw args.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRef(pub u32);

impl StringRef {
    /// Storage width in bytes under the given pool flag.
    pub fn width(long_string_refs: bool) -> u64 {
        if long_string_refs { 3 } else { 2 }
    }
}

impl BinRead for StringRef {
    type Args<'a> = (bool,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _: Endian,
        (long_string_refs,): Self::Args<'_>,
    ) -> BinResult<Self> {
        let low = u16::read_options(reader, Endian::Little, ())? as u32;
        if long_string_refs {
            let high = u8::read_options(reader, Endian::Little, ())? as u32;
            Ok(StringRef(low | high << 16))
        } else {
            Ok(StringRef(low))
        }
    }
}

impl BinWrite for StringRef {
    type Args<'a> = (bool,);

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _: Endian,
        (long_string_refs,): Self::Args<'_>,
    ) -> BinResult<()> {
        debug_assert!(self.0 <= if long_string_refs { 0xFF_FFFF } else { 0xFFFF });
        ((self.0 & 0xFFFF) as u16).write_options(writer, Endian::Little, ())?;
        if long_string_refs {
            ((self.0 >> 16) as u8).write_options(writer, Endian::Little, ())?;
        }
        Ok(())
    }
}
