use std::fmt;
use std::num::{NonZeroU64, ParseIntError};
use std::str::FromStr;

/// The three positional inputs, once parsed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub number_of_files: i64,
    pub total_size_bytes: i64,
    pub block_size: NonZeroU64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// An argument was missing or empty
    Usage,
    Invalid {
        name: &'static str,
        value: String,
        source: ParseIntError,
    },
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgError::Usage => f.write_str("expected three non-empty arguments"),
            ArgError::Invalid {
                name,
                value,
                source,
            } => write!(f, "invalid {name} '{value}': {source}"),
        }
    }
}

impl std::error::Error for ArgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgError::Usage => None,
            ArgError::Invalid { source, .. } => Some(source),
        }
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ArgError>
where
    T: FromStr<Err = ParseIntError>,
{
    value.parse().map_err(|source| ArgError::Invalid {
        name,
        value: value.to_owned(),
        source,
    })
}

impl Inputs {
    /// Parses the positional arguments.
    ///
    /// Missing or empty arguments are a usage error, and are reported before
    /// any argument is parsed. Negative counts and sizes are accepted.
    pub fn parse(
        number_of_files: Option<&str>,
        total_size_bytes: Option<&str>,
        block_size: Option<&str>,
    ) -> Result<Self, ArgError> {
        fn non_empty(arg: Option<&str>) -> Option<&str> {
            arg.filter(|s| !s.is_empty())
        }

        let (Some(number_of_files), Some(total_size_bytes), Some(block_size)) = (
            non_empty(number_of_files),
            non_empty(total_size_bytes),
            non_empty(block_size),
        ) else {
            return Err(ArgError::Usage);
        };

        Ok(Self {
            number_of_files: parse("number of files", number_of_files)?,
            total_size_bytes: parse("total size", total_size_bytes)?,
            block_size: parse("block size", block_size)?,
        })
    }
}
