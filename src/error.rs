use thiserror::Error;

/// Errors surfaced by a walkshed computation.
///
/// Per-feature geometry failures never show up here; they are recorded as
/// skip outcomes on the result instead.
#[derive(Error, Debug)]
pub enum WalkshedError {
    /// The buffer radius must be strictly positive.
    #[error("buffer radius must be positive, got {0} ft")]
    InvalidRadius(u32),

    /// The radius is not one of the configured choices.
    #[error("buffer radius {radius} ft is not one of the allowed radii {allowed:?}")]
    RadiusNotAllowed { radius: u32, allowed: Vec<u32> },

    /// A selection referred to a category that was never registered.
    #[error("unknown transit category: {0}")]
    UnknownCategory(String),

    /// A category with the same code was registered twice.
    #[error("duplicate transit category code: {0}")]
    DuplicateCategory(char),

    /// The cache key is a 64-bit mask.
    #[error("at most {max} transit categories are supported")]
    TooManyCategories { max: usize },

    /// Building or applying a coordinate projection failed.
    #[error("projection error: {0:#}")]
    Projection(#[from] anyhow::Error),

    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A stage panicked outside of the per-item guards.
    #[error("walkshed computation failed: {0}")]
    Computation(String),
}

pub type Result<T> = std::result::Result<T, WalkshedError>;
