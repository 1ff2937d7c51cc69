use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("cannot read input file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no {wanted} found in input")]
    MissingBlock { wanted: String },

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: bad {field} value '{value}'")]
    BadField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("input format '{format}' requires ROOT support, which this build does not include")]
    Unavailable { format: String },

    #[error("ROOT input error: {0}")]
    Root(String),
}

/// Parse one whitespace-separated field, reporting the line and field name
/// on failure.
pub(crate) fn parse_field<T: std::str::FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::BadField {
        line,
        field,
        value: value.to_string(),
    })
}

/// Integer field that some generators write as a float ("2." for 2).
pub(crate) fn parse_int_field(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<i64, ParseError> {
    if let Ok(int) = value.parse::<i64>() {
        return Ok(int);
    }
    parse_field::<f64>(line, field, value).map(|f| f as i64)
}
