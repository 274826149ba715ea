use std::io::{BufRead, Write};

use fat_core::Result;
use time::OffsetDateTime;
use time::macros::format_description;

/// Next input line without its line ending; `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<Option<String>> {
    write!(output, "{question}")?;
    output.flush()?;
    read_line(input)
}

/// Yes/no question; anything but y/yes (any case) is a no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    let answer = ask(input, output, &format!("{question} (y/N) "))?;
    Ok(matches!(
        answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes")
    ))
}

pub fn timestamp(ts: &OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    ts.format(fmt).unwrap_or_else(|_| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use time::macros::datetime;

    #[test]
    fn confirm_accepts_only_yes() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false), ("", false)] {
            let mut out = Vec::new();
            let got = confirm(&mut Cursor::new(answer), &mut out, "Sure?").unwrap();
            assert_eq!(got, expected, "answer {answer:?}");
            assert_eq!(String::from_utf8(out).unwrap(), "Sure? (y/N) ");
        }
    }

    #[test]
    fn read_line_strips_crlf() {
        let mut input = Cursor::new("hello\r\nworld");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("hello"));
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("world"));
        assert_eq!(read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn timestamps_are_second_precision() {
        assert_eq!(timestamp(&datetime!(2024-03-05 07:08:09.123 UTC)), "2024-03-05 07:08:09");
    }
}
