use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveletError {
    #[error("Invalid dimensions")]
    InvalidDimensions = 1,
    #[error("Dimensions overflow the addressable buffer size")]
    DimensionOverflow = 2,
    #[error("Invalid filter moments (expected 1, 2 or 4)")]
    InvalidMoments = 3,
    #[error("Invalid pixel format")]
    InvalidPixelFormat = 4,
    #[error("Invalid recoding")]
    InvalidRecoding = 5,
    #[error("Destination too small")]
    DestinationTooSmall = 6,

    // Buffer shape errors
    #[error("Pixel buffer size does not match the frame dimensions")]
    InvalidPixelBufferSize = 20,
    #[error("Plane count does not match the pixel format")]
    InvalidPlaneCount = 21,
    #[error("Plane size does not match the frame dimensions")]
    InvalidPlaneSize = 22,
    #[error("Frame index out of range")]
    InvalidFrameIndex = 23,

    // Session errors
    #[error("Unknown layer")]
    UnknownLayer = 40,
    #[error("Unknown component")]
    UnknownComponent = 41,
    #[error("Duplicate component packet")]
    DuplicateComponent = 42,
    #[error("No layers configured")]
    NoLayers = 43,
    #[error("Invalid bitstream length")]
    InvalidBitstreamLength = 44,

    // Logic errors
    #[error("Invalid operation")]
    InvalidOperation = 100,
    #[error("Invalid argument")]
    InvalidArgument = 101,
}
