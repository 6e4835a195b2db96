//! Lifecycle hooks for rendering OpenAPI pages during a site build.
//!
//! The host calls three hooks at fixed points of a build:
//! - [`on_pre_build`] installs (or restores) the redoc CLI
//! - [`on_post_build`] renders one page per `openapi_pages` entry
//! - [`on_success`] re-saves the tool cache if it is missing
//!
//! Hooks reach the outside world only through [`BuildUtils`].

pub mod context;
pub mod host;
pub mod postbuild;
pub mod prebuild;
pub mod render;
pub mod success;

#[cfg(test)]
mod testing;

pub use context::BuildContext;
pub use host::{BuildUtils, CommandRunner, ShellRunner, ToolCache};
pub use postbuild::{PostBuildSummary, ProgressReporter, SilentProgress, on_post_build};
pub use prebuild::{PreBuildOutcome, on_pre_build};
pub use render::{RenderRequest, build_render_command, page_command};
pub use success::on_success;
