//! Domain models for the isolated runner
//!
//! This module contains pure domain objects: artifact references, resolved
//! classpaths and the dependency declarations read from bundle manifests.

pub mod artifact;
pub mod declaration;

pub use artifact::{ArtifactRef, Classpath};
pub use declaration::{DependencyDeclaration, VersionedName};
