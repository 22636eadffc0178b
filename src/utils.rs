/// Calculates the 1-based line and column number for a given byte position in the source text.
/// Columns count characters, not bytes.
pub fn get_line_and_column(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= position {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Byte offset of a 1-based line and a 1-based *byte* column, as reported by
/// `serde_json`. Clamped to the line end and snapped back to a char boundary.
pub fn get_byte_offset(source: &str, line: usize, byte_column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let body = text.strip_suffix('\n').unwrap_or(text);
            let mut within = byte_column.saturating_sub(1).min(body.len());
            while !body.is_char_boundary(within) {
                within -= 1;
            }
            return offset + within;
        }
        offset += text.len();
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let source = "q.a;\nq.b.c;\n";
        assert_eq!(get_line_and_column(source, 0), (1, 1));
        assert_eq!(get_line_and_column(source, 2), (1, 3));
        assert_eq!(get_line_and_column(source, 5), (2, 1));
        assert_eq!(get_line_and_column(source, 9), (2, 5));
    }

    #[test]
    fn test_byte_offset_after_multibyte_text() {
        // "é" is two bytes, so byte column 13 is the `5`
        let source = "{\n\"Pokémon\": 5x\n}";
        let offset = get_byte_offset(source, 2, 13);
        assert_eq!(&source[offset..offset + 1], "5");
        assert_eq!(get_byte_offset(source, 2, 99), source.len() - 2);
        assert_eq!(get_byte_offset(source, 7, 1), source.len());
    }

    #[test]
    fn test_byte_offset_snaps_to_char_boundary() {
        let source = "é";
        assert_eq!(get_byte_offset(source, 1, 2), 0);
    }
}
