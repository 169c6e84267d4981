use thiserror::Error;

/// Construction-time failures of route definitions.
///
/// Resolution and stack building never fail; malformed definitions are
/// rejected when the route is defined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
    #[error("definition item #{index} has no middleware")]
    EmptyMiddleware { index: usize },

    #[error("handler at definition item #{index} is not bound to any HTTP method")]
    NoMethods { index: usize },

    #[error("definition item #{index} restricts `on` to an empty method list")]
    EmptyMethodFilter { index: usize },

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),
}

pub type Result<T> = std::result::Result<T, StackError>;
