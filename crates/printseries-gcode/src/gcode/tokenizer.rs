//! Line tokenizer
//!
//! Extracts the motion fields of every program line by independent pattern
//! searches. Nothing is converted to a number here; a field that does not
//! appear on a line stays unset.

use regex::Regex;
use std::sync::OnceLock;

use printseries_core::{FieldKind, TokenizedLine};

/// Compiled patterns for comment stripping and field extraction
struct Patterns {
    comment: Regex,
    auxiliary: Regex,
    feed: Regex,
    x: Regex,
    y: Regex,
    z: Regex,
    extrusion: Regex,
}

impl Patterns {
    fn get() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(|| Patterns {
            comment: Regex::new(r";.*").expect("invalid regex pattern"),
            // Fan, temperature and other M/S words carry no motion
            auxiliary: Regex::new(r"[MS]\d+").expect("invalid regex pattern"),
            feed: Regex::new(r"F\d+\.*\d*").expect("invalid regex pattern"),
            x: Regex::new(r"X-*\d*\.*\d*").expect("invalid regex pattern"),
            y: Regex::new(r"Y-*\d*\.*\d*").expect("invalid regex pattern"),
            z: Regex::new(r"Z-*\d*\.*\d*").expect("invalid regex pattern"),
            extrusion: Regex::new(r"E-*\d*\.*\d*").expect("invalid regex pattern"),
        })
    }

    fn field(&self, kind: FieldKind) -> &Regex {
        match kind {
            FieldKind::Feed => &self.feed,
            FieldKind::X => &self.x,
            FieldKind::Y => &self.y,
            FieldKind::Z => &self.z,
            FieldKind::Extrusion => &self.extrusion,
        }
    }
}

/// Splits a G-code program into tokenized lines
#[derive(Debug, Clone, Default)]
pub struct LineTokenizer;

impl LineTokenizer {
    /// Create a new tokenizer
    pub fn new() -> Self {
        Self
    }

    /// Tokenize every line of a program
    ///
    /// Produces exactly one [`TokenizedLine`] per input line, numbered from 1.
    pub fn tokenize(&self, program: &str) -> Vec<TokenizedLine> {
        program
            .lines()
            .enumerate()
            .map(|(index, line)| self.tokenize_line(index + 1, line))
            .collect()
    }

    /// Tokenize a single line
    ///
    /// A field that occurs more than once on a line yields the concatenation
    /// of all its occurrences.
    pub fn tokenize_line(&self, line_number: usize, raw: &str) -> TokenizedLine {
        let patterns = Patterns::get();
        let cleaned = Self::strip(raw);

        let mut line = TokenizedLine {
            line_number,
            raw: raw.to_string(),
            ..Default::default()
        };

        for kind in FieldKind::ALL {
            if let Some((text, occurrences)) = Self::extract(patterns.field(kind), &cleaned) {
                if occurrences > 1 {
                    tracing::debug!(
                        "Line {}: field {} appears {} times, using '{}'",
                        line_number,
                        kind,
                        occurrences,
                        text
                    );
                }
                *line.field_mut(kind) = Some(text);
            }
        }

        line
    }

    /// Remove the comment and auxiliary command words from a line
    fn strip(raw: &str) -> String {
        let patterns = Patterns::get();
        let without_comment = patterns.comment.replace(raw, "");
        patterns
            .auxiliary
            .replace_all(&without_comment, "")
            .into_owned()
    }

    /// Concatenated matches of a pattern and how many there were
    fn extract(regex: &Regex, text: &str) -> Option<(String, usize)> {
        let mut joined = String::new();
        let mut occurrences = 0;
        for m in regex.find_iter(text) {
            joined.push_str(m.as_str());
            occurrences += 1;
        }
        (occurrences > 0).then_some((joined, occurrences))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    fn tokenize(line: &str) -> TokenizedLine {
        LineTokenizer::new().tokenize_line(1, line)
    }

    #[test]
    fn test_extracts_all_fields() {
        let line = tokenize("G1 F1500 X10.5 Y-3.25 Z0.2 E1.0375");
        assert_eq!(line.feed.as_deref(), Some("F1500"));
        assert_eq!(line.x.as_deref(), Some("X10.5"));
        assert_eq!(line.y.as_deref(), Some("Y-3.25"));
        assert_eq!(line.z.as_deref(), Some("Z0.2"));
        assert_eq!(line.extrusion.as_deref(), Some("E1.0375"));
    }

    #[test]
    fn test_missing_fields_stay_unset() {
        let line = tokenize("G0 X5");
        assert_eq!(line.x.as_deref(), Some("X5"));
        assert!(line.feed.is_none());
        assert!(line.y.is_none());
        assert!(line.z.is_none());
        assert!(line.extrusion.is_none());
    }

    #[test]
    fn test_strips_comments() {
        let line = tokenize("G1 X1 ; move to X2 E5");
        assert_eq!(line.x.as_deref(), Some("X1"));
        assert!(line.extrusion.is_none());

        let line = tokenize(";LAYER:0");
        assert!(line.is_blank());
        assert_eq!(line.raw, ";LAYER:0");
    }

    #[test]
    fn test_strips_auxiliary_commands() {
        let line = tokenize("M104 S200");
        assert!(line.is_blank());

        let line = tokenize("M106 S255 ; fan on");
        assert!(line.is_blank());
    }

    #[test]
    fn test_command_word_alone_is_blank() {
        assert!(tokenize("G28").is_blank());
        assert!(tokenize("G90 ; absolute").is_blank());
        assert!(!tokenize("G92 E0").is_blank());
    }

    #[test]
    fn test_duplicate_fields_are_concatenated() {
        let line = tokenize("G1 X1 X2");
        assert_eq!(line.x.as_deref(), Some("X1X2"));
    }

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(level: Level, line: &str) -> String {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || tokenize(line));

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_duplicate_fields_are_not_warnings() {
        assert!(logged_at(Level::INFO, "G1 X1 X2").is_empty());
        assert!(logged_at(Level::DEBUG, "G1 X1 X2").contains("appears 2 times"));
    }

    #[test]
    fn test_bare_letter_is_still_a_match() {
        let line = tokenize("G28 X Y");
        assert_eq!(line.x.as_deref(), Some("X"));
        assert_eq!(line.y.as_deref(), Some("Y"));
        assert!(line.z.is_none());
    }

    #[test]
    fn test_tokenize_numbers_lines() {
        let lines = LineTokenizer::new().tokenize("G1 X1\n\nG1 X2\r\nG1 X3");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].line_number, 1);
        assert!(lines[1].is_blank());
        assert_eq!(lines[2].x.as_deref(), Some("X2"));
        assert_eq!(lines[3].line_number, 4);
    }
}
