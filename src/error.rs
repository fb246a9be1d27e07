// Crate error type. Every variant states *where* things went wrong.
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("camera config error: {0}")]
    CameraConfig(String), // Changing resolution on an open camera failed
    #[error("camera frame error: {0}")]
    CameraFrame(String), // Decoding a frame failed
    #[error("config error: {0}")]
    Config(String), // Startup flags are unusable
}
