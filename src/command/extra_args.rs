// src/command/extra_args.rs

//! Tokenizer for the freeform "extra arguments" block.

/// Split a multi-line block of extra arguments into tokens.
///
/// Each line is split on whitespace. Blank lines and lines starting with `#`
/// yield nothing, and a token starting with `#` ends its line (trailing
/// comment). A `#` inside a token is kept, so values such as `--key=a#b`
/// survive.
pub fn tokenize_extra_args(block: &str) -> Vec<String> {
    block
        .lines()
        .flat_map(|line| {
            line.split_whitespace()
                .take_while(|token| !token.starts_with('#'))
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let block = "\n   \n# full line comment\n  # indented comment\n";
        assert!(tokenize_extra_args(block).is_empty());
    }

    #[test]
    fn trailing_comments_are_stripped() {
        let block = "--collect-all foo   # pulls in data files\n--noupx";
        assert_eq!(
            tokenize_extra_args(block),
            vec!["--collect-all", "foo", "--noupx"]
        );
    }

    #[test]
    fn hash_inside_token_is_kept() {
        assert_eq!(tokenize_extra_args("--key=a#b"), vec!["--key=a#b"]);
    }

    #[test]
    fn order_is_preserved_across_lines() {
        let block = "--a 1\r\n--b 2\n\t--c\t3";
        assert_eq!(
            tokenize_extra_args(block),
            vec!["--a", "1", "--b", "2", "--c", "3"]
        );
    }
}
