//! Ordered, fixed-width field layouts for instruction payloads and account
//! data.
//!
//! A [`Layout`] is a list of named fields. Each field has a [`FieldKind`]
//! with a fixed byte width:
//!
//! ```text
//! U8        1 byte
//! U32       4 bytes, little-endian
//! U64       8 bytes, little-endian
//! Blob(n)   n raw bytes
//! ```
//!
//! Encoding concatenates the fields in declaration order; decoding consumes
//! the same widths in the same order. There is no padding, no alignment and
//! no self-description on the wire.

use crate::error::LayoutError;

// ---------------------------------------------------------------------------
// Field kinds and values
// ---------------------------------------------------------------------------

/// The wire type of a single layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    U8,
    U32,
    U64,
    Blob(usize),
}

impl FieldKind {
    /// Number of bytes this field occupies on the wire.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U32 => 4,
            FieldKind::U64 => 8,
            FieldKind::Blob(len) => len,
        }
    }

    fn bits(self) -> u32 {
        (self.width() * 8) as u32
    }

    fn encode_into(self, field: &str, value: &Value, out: &mut Vec<u8>) -> Result<(), LayoutError> {
        match (self, value) {
            (FieldKind::Blob(len), Value::Bytes(bytes)) => {
                if bytes.len() != len {
                    return Err(LayoutError::BlobLength {
                        field: field.to_string(),
                        expected: len,
                        actual: bytes.len(),
                    });
                }
                out.extend_from_slice(bytes);
                Ok(())
            }
            (FieldKind::Blob(_), Value::Int(_)) => Err(LayoutError::KindMismatch {
                field: field.to_string(),
                expected: "a byte blob",
            }),
            (_, Value::Bytes(_)) => Err(LayoutError::KindMismatch {
                field: field.to_string(),
                expected: "an unsigned integer",
            }),
            (kind, Value::Int(int)) => {
                let int = *int;
                let max = (1i128 << kind.bits()) - 1;
                if int < 0 || int > max {
                    return Err(LayoutError::OutOfRange {
                        field: field.to_string(),
                        value: int,
                        bits: kind.bits(),
                    });
                }
                let le = (int as u64).to_le_bytes();
                out.extend_from_slice(&le[..kind.width()]);
                Ok(())
            }
        }
    }

    /// Decode exactly `self.width()` bytes. The caller guarantees the length.
    fn decode(self, bytes: &[u8]) -> Value {
        match self {
            FieldKind::Blob(_) => Value::Bytes(bytes.to_vec()),
            _ => {
                let mut le = [0u8; 8];
                le[..bytes.len()].copy_from_slice(bytes);
                Value::Int(i128::from(u64::from_le_bytes(le)))
            }
        }
    }
}

/// A field value: either an integer (range-checked against the field width
/// on encode) or raw bytes for blob fields.
///
/// Integers are carried as `i128` so that negative inputs can be reported
/// as out of range rather than silently wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i128),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(int) => u64::try_from(*int).ok(),
            Value::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            Value::Int(_) => None,
        }
    }
}

macro_rules! impl_int_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i128::from(value))
                }
            }
        )*
    };
}

impl_int_value!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An ordered set of named values, produced by [`Layout::decode`] and
/// consumed by [`Layout::encode`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace the value for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(Value::as_bytes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A named field within a [`Layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// An ordered field specification.
///
/// ```
/// use sol_layout::{Layout, Record};
///
/// let transfer = Layout::new().u32("instruction").u64("lamports");
/// let bytes = transfer
///     .encode(&Record::new().with("instruction", 2u32).with("lamports", 5_000u64))
///     .unwrap();
/// assert_eq!(bytes.len(), 12);
/// assert_eq!(transfer.decode(&bytes).unwrap().get_u64("lamports"), Some(5_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<Field>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn u8(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::U8)
    }

    pub fn u32(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::U32)
    }

    pub fn u64(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::U64)
    }

    pub fn blob(self, name: impl Into<String>, len: usize) -> Self {
        self.field(name, FieldKind::Blob(len))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Total encoded width in bytes.
    pub fn span(&self) -> usize {
        self.fields.iter().map(|f| f.kind.width()).sum()
    }

    /// Encode `record` in field order. Every field must be present; extra
    /// entries in the record are ignored.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, LayoutError> {
        let mut out = Vec::with_capacity(self.span());
        for field in &self.fields {
            let value = record
                .get(&field.name)
                .ok_or_else(|| LayoutError::MissingField(field.name.clone()))?;
            field.kind.encode_into(&field.name, value, &mut out)?;
        }
        Ok(out)
    }

    /// Decode `bytes`, requiring that every byte is consumed.
    pub fn decode(&self, bytes: &[u8]) -> Result<Record, LayoutError> {
        let (record, rest) = self.decode_prefix(bytes)?;
        if !rest.is_empty() {
            return Err(LayoutError::Oversized {
                leftover: rest.len(),
            });
        }
        Ok(record)
    }

    /// Decode the leading `self.span()` bytes and hand back whatever follows.
    pub fn decode_prefix<'a>(&self, bytes: &'a [u8]) -> Result<(Record, &'a [u8]), LayoutError> {
        let mut record = Record::new();
        let mut rest = bytes;
        for field in &self.fields {
            let width = field.kind.width();
            if rest.len() < width {
                return Err(LayoutError::Truncated {
                    field: field.name.clone(),
                    needed: width,
                    remaining: rest.len(),
                });
            }
            let (head, tail) = rest.split_at(width);
            record.set(field.name.clone(), field.kind.decode(head));
            rest = tail;
        }
        Ok((record, rest))
    }
}
