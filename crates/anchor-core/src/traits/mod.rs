//! Boundary traits between the engine and the host application.

pub mod pose_source;

pub use pose_source::PoseSource;
