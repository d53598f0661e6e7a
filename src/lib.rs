//! # plyr-rs: a grammar of data manipulation
//!
//! Pipelines of table verbs (`select`, `filter`, `mutate`, `summarise`, ...)
//! are written once against deferred expressions and executed by whichever
//! backend owns the data they are applied to.
//!
//! ## Architecture
//!
//! - **Expressions** ([`expr`]): immutable trees built from a dataset
//!   placeholder; nothing is evaluated until a context exists
//! - **Evaluation** ([`eval`]): resolves a tree against an
//!   [`EvaluationContext`], once per group for grouped data
//! - **Registry** ([`registry`]): maps data types to backend plugins, ordered
//!   by priority; plugins announce themselves through [`registry::PLUGINS`]
//! - **Dispatch** ([`dispatch`]): routes a verb call to the first plugin that
//!   claims the subject's type and implements the verb
//! - **Pipes** ([`pipe`]): left-to-right composition of verb calls
//!
//! Two reference backends live in [`backends`]: vectors and column frames.
//!
//! ## Configuration
//!
//! Dispatch limits and per-plugin overrides are read from `plyr.toml` in the
//! platform config directory (see [`config::config_path`]).
//!
//! ## Example
//!
//! ```ignore
//! use plyr_rs::{backends, col, verbs, Pipe};
//!
//! let dispatcher = backends::builtin_dispatcher()?;
//! let out = Pipe::new(people)
//!     .then(verbs::group_by([col("team")]))
//!     .then(verbs::summarise([("total", verbs::sum(col("score")))]))
//!     .run(&dispatcher)?;
//! ```

pub mod backends;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod expr;
pub mod logging;
pub mod pipe;
pub mod registry;
pub mod value;
pub mod verbs;

#[doc(hidden)]
pub use linkme;

// Re-export commonly used types
pub use config::{DispatchSettings, PlyrConfig, PluginOverride};
pub use dispatch::{Arg, Dispatcher, VerbArgs};
pub use error::{PlyrError, Result, ResultExt};
pub use eval::{evaluate, ContextKind, EvaluationContext};
pub use expr::{col, lit, BinaryOp, Expr, UnaryOp};
pub use pipe::{pipe, Pipe, PipeExpr};
pub use registry::{Backend, PluginDescriptor, Registry, VerbImpl};
pub use value::{DataObject, TypeKey, Value};
pub use verbs::Verb;
