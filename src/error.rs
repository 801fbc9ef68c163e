use std::fmt;

/// Input rejected by the simplifier before any work was done.
#[derive(Debug, Clone, PartialEq)]
pub enum SimplifyError {
    TooFewPoints(usize),
    NonFiniteCoordinate(usize),
    InvalidEpsilon(f64),
}

impl fmt::Display for SimplifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimplifyError::TooFewPoints(n) => {
                write!(f, "polyline needs at least 2 points, got {}", n)
            }
            SimplifyError::NonFiniteCoordinate(i) => {
                write!(f, "point {} has a non-finite coordinate", i)
            }
            SimplifyError::InvalidEpsilon(e) => {
                write!(f, "epsilon must be a non-negative finite number, got {}", e)
            }
        }
    }
}

impl std::error::Error for SimplifyError {}

#[derive(Debug)]
pub enum LoadError {
    Io,
    Json,
    UnknownFormat,
    MissingField(String),
    UnsupportedGeometry(String),
    InvalidPolyline,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io => f.write_str("could not read polyline file"),
            LoadError::Json => f.write_str("polyline file is not valid JSON"),
            LoadError::UnknownFormat => {
                f.write_str("document is neither Esri JSON nor GeoJSON")
            }
            LoadError::MissingField(field) => write!(f, "missing or mistyped field `{}`", field),
            LoadError::UnsupportedGeometry(kind) => {
                write!(f, "expected a LineString or MultiLineString, found {}", kind)
            }
            LoadError::InvalidPolyline => f.write_str("polyline failed validation"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug)]
pub struct ExportError;

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("could not write simplified polyline")
    }
}

impl std::error::Error for ExportError {}

#[derive(Debug)]
pub enum ConfigError {
    Io,
    Parse,
    Invalid,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io => f.write_str("could not read config file"),
            ConfigError::Parse => f.write_str("config file is not valid"),
            ConfigError::Invalid => f.write_str("invalid configuration"),
        }
    }
}

impl std::error::Error for ConfigError {}
