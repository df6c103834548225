//! Delimited text line to [`FeatureVector`]
//!
//! A sensor line looks like `"<prefix>,...,<r1>,<r2>,<r3>,<r4>,<r5>,<r6>\r\n"`.
//! Only the trailing `dimension` fields are readings; anything in front of
//! them is ignored. Lines that are too short or carry a non-integer reading
//! are rejected with a [`ParseError`] and never abort the stream.

use serde::{Deserialize, Serialize};
use sensorknn_core::FeatureVector;
use thiserror::Error;

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_MIN_FIELDS: usize = 3;
pub const DEFAULT_DIMENSION: usize = 6;

/// Why a line produced no vector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("too few fields: found {found}, need at least {required}")]
    TooFewFields { found: usize, required: usize },

    #[error("field {index} is not an integer: {value:?}")]
    InvalidField { index: usize, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub delimiter: char,
    /// A line must have strictly more fields than this
    pub min_fields: usize,
    /// Number of trailing fields taken as the feature vector
    pub dimension: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            min_fields: DEFAULT_MIN_FIELDS,
            dimension: DEFAULT_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VectorParser {
    config: ParserConfig,
}

impl VectorParser {
    pub fn new(config: ParserConfig) -> crate::Result<Self> {
        if config.dimension == 0 {
            return Err(sensorknn_core::Error::InvalidConfig(
                "parser dimension must be at least 1".to_string(),
            )
            .into());
        }
        if config.delimiter == '\r' || config.delimiter == '\n' {
            return Err(sensorknn_core::Error::InvalidConfig(
                "delimiter cannot be a line terminator".to_string(),
            )
            .into());
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Smallest field count that can yield a vector
    pub fn required_fields(&self) -> usize {
        (self.config.min_fields + 1).max(self.config.dimension)
    }

    /// Parse one raw line, reporting why it was rejected
    pub fn parse(&self, line: &str) -> Result<FeatureVector, ParseError> {
        let fields: Vec<&str> = line.split(self.config.delimiter).map(clean_field).collect();

        let required = self.required_fields();
        if fields.len() < required {
            return Err(ParseError::TooFewFields {
                found: fields.len(),
                required,
            });
        }

        let start = fields.len() - self.config.dimension;
        let readings = fields[start..]
            .iter()
            .enumerate()
            .map(|(offset, field)| {
                field.parse::<i64>().map_err(|_| ParseError::InvalidField {
                    index: start + offset,
                    value: (*field).to_string(),
                })
            })
            .collect::<Result<Vec<i64>, ParseError>>()?;

        Ok(FeatureVector::from_readings(&readings))
    }

    /// Parse one raw line, `None` when it is malformed
    pub fn parse_line(&self, line: &str) -> Option<FeatureVector> {
        self.parse(line).ok()
    }
}

// Strips the trailing CR/LF the device appends plus any padding around the value
#[inline]
fn clean_field(field: &str) -> &str {
    field.trim_end_matches(['\r', '\n']).trim()
}
