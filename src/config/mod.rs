//! # Configuration Source
//!
//! Group templates are declared once, in YAML, and are read-only afterwards:
//!
//! ```yaml
//! groups:
//!   sample:
//!     model: app::SampleModel    # qualified name
//!     view: SampleView           # simple name
//!     controller: sample         # logical name
//!     args:                      # optional defaults, overridden by create() args
//!       title: "Hello"
//! ```
//!
//! Role keys must be one of the [`RoleType`](crate::framework::RoleType) tags. Class names
//! are resolved through the artifact registry when a group is created.

pub mod template;

pub use template::{AppConfig, ConfigError, GroupTemplate};
