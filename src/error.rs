// One error type for the whole editor.
// Every variant states *where* things went wrong.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Opening/decoding the source image failed
    #[error("image load error: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// Encoding a layer to PNG failed
    #[error("image encode error: {0}")]
    ImageEncode(String),

    /// A data URL was malformed or its payload did not decode
    #[error("data URL error: {0}")]
    DataUrl(String),

    /// A CSS hex color could not be parsed
    #[error("invalid color {0:?}")]
    InvalidColor(String),

    /// A `WxH` size could not be parsed or was zero
    #[error("invalid size {0:?}")]
    InvalidSize(String),

    /// Writing the export to disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the edit request failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
