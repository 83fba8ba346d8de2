//! Domain logic - version rules independent of files and release sources

pub mod prerelease;
pub mod release;
pub mod version;

pub use prerelease::PreReleaseMarker;
pub use release::Release;
pub use version::{compare, is_prerelease, normalize, Granularity, NormalizedVersion};
