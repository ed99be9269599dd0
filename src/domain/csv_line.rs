//! Quote-aware splitting of one CSV line.
//!
//! Rows in the mosque export never span lines, so splitting is done per
//! line: commas inside double quotes are kept, and `""` inside a quoted
//! field is an escaped quote.

/// Splits `line` into trimmed fields.
#[must_use]
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Non-blank lines of `text` with their 1-based line numbers.
///
/// Handles both `\n` and `\r\n` endings.
pub fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx.saturating_add(1), line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(split_csv_line("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn keeps_commas_inside_quotes() {
        let fields = split_csv_line(r#"Masjid,"12 High St, Leeds",LS1 1AA"#);
        assert_eq!(fields, vec!["Masjid", "12 High St, Leeds", "LS1 1AA"]);
    }

    #[test]
    fn unescapes_doubled_quotes() {
        let fields = split_csv_line(r#""The ""Big"" Mosque",x"#);
        assert_eq!(fields, vec![r#"The "Big" Mosque"#, "x"]);
    }

    #[test]
    fn trailing_comma_yields_empty_field() {
        assert_eq!(split_csv_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn numbered_lines_skip_blanks_and_keep_numbers() {
        let lines: Vec<_> = numbered_lines("h\r\n\r\nrow1\r\n  \nrow2").collect();
        assert_eq!(lines, vec![(1, "h"), (3, "row1"), (5, "row2")]);
    }
}
