use crate::locator::LocatorSyntaxError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error(transparent)]
    Syntax(#[from] LocatorSyntaxError),

    #[error("no object matches locator '{locator}'")]
    ObjectNotFound { locator: String },

    #[error("locator '{locator}' matched {count} objects, expected exactly one")]
    AmbiguousLocator { count: usize, locator: String },

    #[error("anchor '{anchor}' not found")]
    AnchorNotFound { anchor: String },
}
