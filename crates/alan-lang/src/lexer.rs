//! Line and field splitting for machine descriptions.
//!
//! Source text is split into logical lines, then each line into fields with
//! three nested delimiters: `:` ends a configuration name, `|` separates the
//! branch fields and `,` separates operations.

/// Marks a comment line when it is the first non-blank character.
pub const COMMENT: char = '!';

/// Ends a configuration name.
pub const CONFIG_DELIMITER: char = ':';

/// Separates the specifier, operation list and next name of a branch.
pub const FIELD_DELIMITER: char = '|';

/// Separates operations in an operation list.
pub const OPERATION_DELIMITER: char = ',';

/// A logical line with its original location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Trimmed line text.
    pub text: &'a str,
    /// 1-indexed line number in the source text.
    pub line: usize,
}

/// Yields every non-empty, non-comment line of `source`, trimmed.
pub fn split_lines(source: &str) -> impl Iterator<Item = SourceLine<'_>> {
    source
        .lines()
        .enumerate()
        .map(|(index, text)| SourceLine {
            text: text.trim(),
            line: index + 1,
        })
        .filter(|line| !line.text.is_empty() && !line.text.starts_with(COMMENT))
}

/// Splits `text` at the first configuration delimiter.
///
/// Returns the trimmed name and the untrimmed remainder, or `None` for a
/// continuation line.
#[must_use]
pub fn split_config_name(text: &str) -> Option<(&str, &str)> {
    text.split_once(CONFIG_DELIMITER)
        .map(|(name, rest)| (name.trim(), rest))
}

/// Splits a branch into its trimmed fields.
pub fn split_fields(text: &str) -> impl Iterator<Item = &str> {
    text.split(FIELD_DELIMITER).map(str::trim)
}

/// Splits an operation list into trimmed tokens.
pub fn split_operations(text: &str) -> impl Iterator<Item = &str> {
    text.split(OPERATION_DELIMITER).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines_but_keeps_numbering() {
        let source = "! header\n\nbegin: 0|R|begin\n   \n  ! indented comment\n1|R|begin\n";
        let lines: Vec<_> = split_lines(source).collect();
        assert_eq!(
            lines,
            vec![
                SourceLine {
                    text: "begin: 0|R|begin",
                    line: 3
                },
                SourceLine {
                    text: "1|R|begin",
                    line: 6
                },
            ]
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        let lines: Vec<_> = split_lines("a: 0|R|a\r\n1|L|a\r\n").collect();
        assert_eq!(lines[0].text, "a: 0|R|a");
        assert_eq!(lines[1].line, 2);
    }

    #[test]
    fn config_name_splits_at_first_colon() {
        assert_eq!(
            split_config_name(" begin : none|R|x"),
            Some(("begin", " none|R|x"))
        );
        assert_eq!(split_config_name("a: :|R|a"), Some(("a", " :|R|a")));
        assert_eq!(split_config_name("0|R|begin"), None);
    }

    #[test]
    fn fields_and_operations_are_trimmed() {
        let fields: Vec<_> = split_fields(" none | P0 , R | done ").collect();
        assert_eq!(fields, ["none", "P0 , R", "done"]);

        let operations: Vec<_> = split_operations(fields[1]).collect();
        assert_eq!(operations, ["P0", "R"]);
    }

    #[test]
    fn empty_text_yields_one_empty_field() {
        assert_eq!(split_fields("").collect::<Vec<_>>(), [""]);
    }
}
