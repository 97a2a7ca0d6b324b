//! Variable-length integers of LENT entry fields
//!
//! Seven value bits per byte, most significant group first, high bit set on
//! every byte except the last (MIDI-style, not LEB128).

use tagchunk_stream::TypedStream;

use super::error::{SounddiverError, SounddiverResult};

/// Read a variable-length integer
pub fn read_var_len(stream: &mut TypedStream<'_>) -> SounddiverResult<usize> {
    let position = stream.tell_read();
    let mut value = 0usize;
    loop {
        let byte = stream.read_u8()?;
        if value > usize::MAX >> 7 {
            return Err(SounddiverError::VarLenOverflow { position });
        }
        value = (value << 7) | usize::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
}

/// Append the encoding of `value` to `out`
pub fn write_var_len(value: usize, out: &mut Vec<u8>) {
    let size = var_len_size(value);
    for group in (0..size).rev() {
        let mut byte = ((value >> (group * 7)) & 0x7f) as u8;
        if group != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

/// Number of bytes [`write_var_len`] produces for `value`
pub fn var_len_size(value: usize) -> usize {
    let bits = usize::BITS - value.leading_zeros();
    (bits as usize).div_ceil(7).max(1)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_boundaries() {
        for (value, size) in [
            (0usize, 1usize),
            (127, 1),
            (128, 2),
            (16383, 2),
            (16384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
        ] {
            assert_eq!(var_len_size(value), size, "size of {value}");

            let mut data = Vec::new();
            write_var_len(value, &mut data);
            assert_eq!(data.len(), size, "encoded length of {value}");

            let mut stream = TypedStream::borrowed(&data);
            assert_eq!(read_var_len(&mut stream).unwrap(), value);
            assert!(stream.at_end());
        }
    }

    #[test]
    fn test_most_significant_group_first() {
        let mut data = Vec::new();
        write_var_len(0x3FFF + 1, &mut data);
        assert_eq!(data, vec![0x81, 0x80, 0x00]);

        let mut stream = TypedStream::borrowed(&[0x82, 0x01]);
        assert_eq!(read_var_len(&mut stream).unwrap(), 0x101);
    }

    #[test]
    fn test_unterminated_is_end_of_stream() {
        let mut stream = TypedStream::borrowed(&[0x80, 0x80]);
        assert!(matches!(
            read_var_len(&mut stream),
            Err(SounddiverError::Stream(e)) if e.is_end_of_stream()
        ));
    }

    #[test]
    fn test_overflow() {
        let data = [0xFFu8; 16];
        let mut stream = TypedStream::borrowed(&data);
        assert!(matches!(
            read_var_len(&mut stream),
            Err(SounddiverError::VarLenOverflow { position: 0 })
        ));
    }

    #[test]
    fn test_max_value_round_trip() {
        let mut data = Vec::new();
        write_var_len(usize::MAX, &mut data);
        assert_eq!(data.len(), var_len_size(usize::MAX));
        let mut stream = TypedStream::borrowed(&data);
        assert_eq!(read_var_len(&mut stream).unwrap(), usize::MAX);
    }
}
