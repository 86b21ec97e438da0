//! Error types for the orrery crate.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error returned by [`crate::OrreryApp::run`] and the setup helpers.
#[derive(Error, Debug)]
pub enum OrreryError {
    /// Configuration could not be read or parsed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required asset could not be loaded
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// GPU initialisation failed
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// The window could not be created
    #[error("window error: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop failed to start or exited abnormally
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Errors raised while bringing up wgpu.
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
}

/// Errors raised while decoding textures and models.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("failed to decode image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to import a glTF/GLB file.
    #[error("failed to load glTF file '{path}': {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    /// Failed to import an OBJ file.
    #[error("failed to load OBJ file '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// The model contains no drawable meshes.
    #[error("model '{0}' contains no meshes")]
    NoMeshes(PathBuf),

    /// A mesh primitive has no position data.
    #[error("mesh primitive in '{0}' has no position data")]
    NoPositionData(PathBuf),

    /// The file extension is not a supported model format.
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result type alias using [`OrreryError`].
pub type Result<T> = std::result::Result<T, OrreryError>;

/// Result type alias for asset operations.
pub type AssetResult<T> = std::result::Result<T, AssetError>;
