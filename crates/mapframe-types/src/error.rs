use thiserror::Error;

/// Errors fatal to a single widget's construction.
///
/// None of these escape the factory boundary: the factory logs the error and
/// reports the failure as an absent instance, so sibling widgets on the same
/// page keep initializing.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("map wrapper not supplied")]
    WrapperMissing,

    #[error("rendering surface not found")]
    SurfaceMissing,

    #[error("rendering surface not unique: {0} candidates")]
    SurfaceNotUnique(usize),

    #[error("no provider registered for type '{0}'")]
    UnknownProvider(String),

    #[error("provider '{0}' unavailable: {1}")]
    ProviderUnavailable(String, String),
}
