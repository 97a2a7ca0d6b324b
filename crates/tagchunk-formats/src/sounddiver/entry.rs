//! LENT library entries
//!
//! ```text
//! LENT payload:
//! ├── entry type, model type A, model type B, unknown    u8 × 4
//! ├── date/time                                          u32 (file byte order)
//! ├── unknown, unknown, device id, unknown               u8 × 4
//! └── fields until type 0 or end of chunk:
//!     ├── type    u8
//!     ├── length  var-len   (types 1, 2, 3, 6)
//!     └── bytes   [u8; length]
//! ```

use binrw::{BinRead, BinWrite, Endian};
use tagchunk_stream::TypedStream;
use tracing::warn;

use super::datetime::PackedDateTime;
use super::error::{SounddiverError, SounddiverResult};
use super::varlen::{read_var_len, write_var_len};

/// Size of the fixed LENT header
pub const LENT_HEADER_SIZE: usize = 12;

/// Type byte of a LENT field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    /// Terminator; the rest of the chunk is ignored
    End = 0,
    /// Entry name
    Name = 1,
    /// Storage location
    Location = 2,
    /// Device-specific sound data
    Data = 3,
    /// Free-form comment
    Comment = 6,
}

impl FieldType {
    /// Map a type byte to a known field type
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::End),
            1 => Some(Self::Name),
            2 => Some(Self::Location),
            3 => Some(Self::Data),
            6 => Some(Self::Comment),
            _ => None,
        }
    }
}

/// One entry of a Sounddiver library
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListEntry {
    /// Entry type
    pub entry_type: u8,
    /// Model type, first byte
    pub model_type_a: u8,
    /// Model type, second byte
    pub model_type_b: u8,
    /// Unknown header byte 3
    pub unknown3: u8,
    /// Creation or modification time
    pub date_time: PackedDateTime,
    /// Unknown header byte 8
    pub unknown8: u8,
    /// Unknown header byte 9
    pub unknown9: u8,
    /// Device id
    pub device_id: u8,
    /// Unknown header byte 11
    pub unknown11: u8,
    /// Entry name
    pub name: String,
    /// Storage location
    pub location: String,
    /// Free-form comment
    pub comment: String,
    /// Device-specific sound data
    pub data: Vec<u8>,
}

/// Decode bytes one char each (ISO 8859-1)
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Encode one byte per char, replacing chars outside ISO 8859-1 with `?`
fn string_to_latin1(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| u8::try_from(c).unwrap_or(b'?'))
        .collect()
}

fn read_field<'s>(stream: &'s mut TypedStream<'_>, field: FieldType) -> SounddiverResult<&'s [u8]> {
    let length = read_var_len(stream)?;
    let remaining = stream.remaining();
    if length > remaining {
        return Err(SounddiverError::FieldTooLarge {
            field,
            length,
            remaining,
        });
    }
    Ok(stream.read_slice(length)?)
}

impl ListEntry {
    /// Parse a LENT chunk payload of at least [`LENT_HEADER_SIZE`] bytes
    ///
    /// An unknown field type ends the entry; the fields read so far are
    /// kept.
    pub fn parse(data: &[u8], endian: Endian) -> SounddiverResult<Self> {
        let mut stream = TypedStream::borrowed(data);

        let mut entry = Self {
            entry_type: stream.read_u8()?,
            model_type_a: stream.read_u8()?,
            model_type_b: stream.read_u8()?,
            unknown3: stream.read_u8()?,
            date_time: PackedDateTime::from_packed(u32::read_options(
                &mut stream.reader(),
                endian,
                (),
            )?),
            unknown8: stream.read_u8()?,
            unknown9: stream.read_u8()?,
            device_id: stream.read_u8()?,
            unknown11: stream.read_u8()?,
            ..Self::default()
        };

        while !stream.at_end() {
            let raw = stream.read_u8()?;
            let Some(field) = FieldType::from_u8(raw) else {
                warn!(
                    "Unknown LENT field type {raw}, skipping remaining {} bytes",
                    stream.remaining()
                );
                break;
            };

            match field {
                FieldType::End => break,
                FieldType::Name => entry.name = latin1_to_string(read_field(&mut stream, field)?),
                FieldType::Location => {
                    entry.location = latin1_to_string(read_field(&mut stream, field)?);
                }
                FieldType::Comment => {
                    entry.comment = latin1_to_string(read_field(&mut stream, field)?);
                }
                FieldType::Data => entry.data = read_field(&mut stream, field)?.to_vec(),
            }
        }

        Ok(entry)
    }

    /// Encode as a LENT chunk payload
    ///
    /// Empty text and data fields are omitted; a terminator is always
    /// written.
    pub fn to_bytes(&self, endian: Endian) -> SounddiverResult<Vec<u8>> {
        let mut stream = TypedStream::with_capacity(LENT_HEADER_SIZE + self.data.len() + 16);
        stream.write_bytes(&[
            self.entry_type,
            self.model_type_a,
            self.model_type_b,
            self.unknown3,
        ])?;
        self.date_time
            .to_packed()
            .write_options(&mut stream.writer(), endian, ())?;
        stream.write_bytes(&[self.unknown8, self.unknown9, self.device_id, self.unknown11])?;

        let mut fields = Vec::new();
        for (field, bytes) in [
            (FieldType::Name, string_to_latin1(&self.name)),
            (FieldType::Location, string_to_latin1(&self.location)),
            (FieldType::Comment, string_to_latin1(&self.comment)),
            (FieldType::Data, self.data.clone()),
        ] {
            if bytes.is_empty() {
                continue;
            }
            fields.push(field as u8);
            write_var_len(bytes.len(), &mut fields);
            fields.extend_from_slice(&bytes);
        }
        fields.push(FieldType::End as u8);
        stream.write_bytes(&fields)?;

        Ok(stream.into_vec())
    }
}
