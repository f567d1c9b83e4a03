//! devwrap-lib: the logic behind the devwrap command-line tools.
//!
//! - [`project`]: resolve a qmake project file and build it out of source
//! - [`scan`] and [`browse`]: collect source files and hand them to a browser
//! - [`repo`]: sync, configure and build a project from its git work tree,
//!   retrying the build step
//!
//! All external programs run through [`process::ProcessRunner`].

pub mod browse;
pub mod env;
pub mod error;
pub mod platform;
pub mod process;
pub mod project;
pub mod prompt;
pub mod repo;
pub mod scan;
pub mod util;

pub use error::{Error, Result};
