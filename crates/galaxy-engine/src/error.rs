/// Errors surfaced by setup paths (mount, factory construction, config and asset parsing).
/// Per-frame work never returns one of these.
#[derive(thiserror::Error, Debug)]
pub enum GalaxyError {
    /// A texture path the renderer cannot resolve.
    #[error("missing texture: {0}")]
    MissingTexture(String),

    /// The render surface could not be created or attached.
    #[error("render surface error: {0}")]
    Surface(String),

    /// A host capability (event listener, frame scheduling) failed.
    #[error("host error: {0}")]
    Host(String),

    /// Theme storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Config or manifest JSON failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
