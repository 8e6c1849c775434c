//! Startup trimmer
//!
//! Drops the slicer preamble (homing, heating, priming) that precedes the
//! first layer, anchors the first retained record at machine home, and turns
//! field text into numbers.

use printseries_core::{
    round_to, ConversionError, FieldKind, ParsedRecord, Position3, TokenizedLine,
    DEFAULT_DECIMAL_PLACES, LAYER_START_MARKER,
};

/// Records that survived the trim
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedProgram {
    /// Retained records; the first one is the marker line at home position
    pub records: Vec<ParsedRecord>,
    /// Last feed rate declared in the discarded preamble
    pub inherited_feed_rate: Option<f64>,
    /// Line number of the layer marker
    pub marker_line: usize,
    /// Number of preamble lines dropped
    pub discarded: usize,
}

/// Trims the program to the first layer and parses field values
#[derive(Debug, Clone)]
pub struct StartupTrimmer {
    marker: String,
    decimal_places: u32,
}

impl StartupTrimmer {
    /// Create a trimmer with the default marker and rounding
    pub fn new() -> Self {
        Self {
            marker: LAYER_START_MARKER.to_string(),
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }

    /// Use a different layer marker
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Round parsed values to `decimal_places`
    pub fn with_decimal_places(mut self, decimal_places: u32) -> Self {
        self.decimal_places = decimal_places;
        self
    }

    /// Trim tokenized lines and parse the retained ones
    ///
    /// # Errors
    /// [`ConversionError::MissingLayerMarker`] when no raw line contains the
    /// marker, [`ConversionError::MalformedNumericField`] when a retained field
    /// is not a number.
    pub fn trim(&self, lines: Vec<TokenizedLine>) -> Result<TrimmedProgram, ConversionError> {
        let start = lines
            .iter()
            .position(|line| line.raw.contains(self.marker.as_str()))
            .ok_or_else(|| ConversionError::MissingLayerMarker {
                marker: self.marker.clone(),
            })?;

        let inherited_feed_rate = self.preamble_feed_rate(&lines[..start]);
        let marker_line = lines[start].line_number;

        let mut records = Vec::with_capacity(lines.len() - start);
        for (offset, line) in lines[start..].iter().enumerate() {
            if offset == 0 {
                records.push(self.parse_home(line)?);
            } else if !line.is_blank() {
                records.push(self.parse(line)?);
            }
        }

        if records.is_empty() {
            return Err(ConversionError::empty("startup trim"));
        }

        tracing::debug!(
            "Trimmed {} preamble lines before line {}, retained {} records",
            start,
            marker_line,
            records.len()
        );

        Ok(TrimmedProgram {
            records,
            inherited_feed_rate,
            marker_line,
            discarded: start,
        })
    }

    /// The marker line, with its position forced to machine home
    fn parse_home(&self, line: &TokenizedLine) -> Result<ParsedRecord, ConversionError> {
        let mut record = self.parse(line)?;
        let home = Position3::ORIGIN;
        record.x = Some(home.x);
        record.y = Some(home.y);
        record.z = Some(home.z);
        Ok(record)
    }

    fn parse(&self, line: &TokenizedLine) -> Result<ParsedRecord, ConversionError> {
        let value = |kind| self.parse_field(line, kind);
        Ok(ParsedRecord {
            line_number: line.line_number,
            feed_rate: value(FieldKind::Feed)?,
            x: value(FieldKind::X)?,
            y: value(FieldKind::Y)?,
            z: value(FieldKind::Z)?,
            extrusion: value(FieldKind::Extrusion)?,
        })
    }

    /// Parse one field, stripping its address letter
    ///
    /// A bare address letter leaves nothing to parse and counts as unset.
    fn parse_field(
        &self,
        line: &TokenizedLine,
        kind: FieldKind,
    ) -> Result<Option<f64>, ConversionError> {
        let Some(text) = line.field(kind) else {
            return Ok(None);
        };

        let digits = text.replace(kind.letter(), "");
        let digits = digits.trim();
        if digits.is_empty() {
            return Ok(None);
        }

        digits
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| Some(round_to(value, self.decimal_places)))
            .ok_or_else(|| ConversionError::MalformedNumericField {
                line_number: line.line_number,
                field: kind.to_string(),
                text: text.to_string(),
            })
    }

    /// Modal feed rate in effect when the first layer starts
    fn preamble_feed_rate(&self, preamble: &[TokenizedLine]) -> Option<f64> {
        preamble.iter().rev().find_map(|line| {
            match self.parse_field(line, FieldKind::Feed) {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::debug!("Ignoring preamble feed rate: {}", e);
                    None
                }
            }
        })
    }
}

impl Default for StartupTrimmer {
    fn default() -> Self {
        Self::new()
    }
}
