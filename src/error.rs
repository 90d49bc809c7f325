// One error type for the crate.
// Every variant states *where* things went wrong. Rejected pointer input and
// empty skeletons are not errors: they come back as booleans, reasons or empty sets.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Decoding the silhouette image failed
    #[error("silhouette load error: {0}")]
    SilhouetteLoad(#[from] image::ImageError),

    /// Reading a config file failed
    #[error("config read error: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// A config file is not valid JSON for `TraceConfig`
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A tuning value is out of range
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The painted raster could not be created for this shape
    #[error("paint surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: usize, height: usize },

    /// Two rasters that must line up pixel-for-pixel do not
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A raw pixel buffer does not hold width * height entries
    #[error("buffer length {actual} does not match {width}x{height}")]
    BufferLength { width: usize, height: usize, actual: usize },

    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
