//! Purpose: Model every decode, projection, and CLI failure as one error type.
//! Exports: `Error`, `ErrorKind`, `Conversion`, `PathSegment`, `to_exit_code`.
//! Role: Builder-style error shared by the library API and the CLI.
//! Invariants: Wrapping with `within` only adds location; kind, message, and source are kept.
//! Invariants: Errors are returned to the caller; nothing in the library logs them.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    EmptyInput,
    UnsupportedInputType,
    Parse,
    InvalidDestination,
    UnknownField,
    TypeConversion,
    NotAStruct,
    Usage,
    Io,
}

/// Offending value and the types involved in a failed conversion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conversion {
    pub value: String,
    pub source_type: String,
    pub target_type: String,
}

/// One step of the location of a nested failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    MapKey(String),
    MapValue(String),
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    path: Vec<PathSegment>,
    conversion: Option<Box<Conversion>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            path: Vec::new(),
            conversion: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn conversion(&self) -> Option<&Conversion> {
        self.conversion.as_deref()
    }

    /// Location segments, outermost first.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Renders the location as `outer.inner[2]["key"]`, or `None` at the root.
    pub fn path_display(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(index) => out.push_str(&format!("[{index}]")),
                PathSegment::MapKey(key) => out.push_str(&format!("[key {key:?}]")),
                PathSegment::MapValue(key) => out.push_str(&format!("[{key:?}]")),
            }
        }
        Some(out)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = Some(Box::new(conversion));
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Records that this error happened inside `segment` of an enclosing value.
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = self.path_display() {
            write!(f, " (at: {path})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Usage => 2,
        ErrorKind::Io => 3,
        ErrorKind::EmptyInput => 4,
        ErrorKind::UnsupportedInputType => 5,
        ErrorKind::Parse => 6,
        ErrorKind::InvalidDestination => 7,
        ErrorKind::UnknownField => 8,
        ErrorKind::TypeConversion => 9,
        ErrorKind::NotAStruct => 10,
    }
}
