use std::path::PathBuf;

use thiserror::Error;

/// Construction-time failures of the path tokenizer and route resolver.
///
/// Every variant carries the raw path it was raised for, so a failing route
/// can be reported without losing the rest of a scan batch.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("unbalanced `{delimiter}` in route path `{path}`")]
    Unbalanced { path: String, delimiter: char },

    #[error("empty parameter name in route path `{path}`")]
    EmptyParamName { path: String },

    #[error("invalid parameter name `{name}` in route path `{path}`")]
    InvalidParamName { path: String, name: String },

    #[error("parameter `{name}` is declared more than once in route path `{path}`")]
    DuplicateParam { path: String, name: String },

    #[error("malformed splat group in route path `{path}`, expected `{{...name}}`")]
    MalformedSplat { path: String },

    #[error("route path `{path}` does not compile to a matcher")]
    Pattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    #[error("param `{name}` expects a number, got `{value}`")]
    NotNumeric { name: String, value: String },

    #[error("route file `{}` is not valid UTF-8", file.display())]
    NonUtf8Path { file: PathBuf },

    #[error(
        "route `{path}` from `{}` is already defined by `{}`",
        file.display(),
        existing.display()
    )]
    DuplicateRoute {
        path: String,
        file: PathBuf,
        existing: PathBuf,
    },
}

impl RouterError {
    /// The raw route path this error was raised for, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            RouterError::Unbalanced { path, .. }
            | RouterError::EmptyParamName { path }
            | RouterError::InvalidParamName { path, .. }
            | RouterError::DuplicateParam { path, .. }
            | RouterError::MalformedSplat { path }
            | RouterError::Pattern { path, .. }
            | RouterError::DuplicateRoute { path, .. } => Some(path),
            RouterError::NotNumeric { .. } | RouterError::NonUtf8Path { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
