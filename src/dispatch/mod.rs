//! Verb dispatch.
//!
//! A verb call is resolved by the runtime type of its subject (the first
//! positional argument):
//!
//! 1. look up the plugins claiming the subject's type or its ancestry,
//!    already ordered by priority
//! 2. take the first one that implements the verb
//! 3. evaluate deferred arguments against a context rooted at the subject,
//!    once per group when the subject is grouped
//! 4. call the implementation and hand back whatever it returns
//!
//! Implementations may call other verbs through [`VerbArgs`]; each of those
//! calls goes through the same steps one level deeper, bounded by
//! [`DispatchSettings::max_depth`].

mod args;

pub use args::{Arg, VerbArgs};

use crate::config::DispatchSettings;
use crate::error::{PlyrError, Result};
use crate::eval::{evaluate, evaluate_grouped, EvaluationContext};
use crate::expr::Expr;
use crate::registry::{self, PluginDescriptor, Registry, VerbImpl};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Entry point for verb calls against a registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    settings: DispatchSettings,
}

impl Dispatcher {
    /// Dispatcher using the registry's own settings.
    pub fn new(registry: Arc<Registry>) -> Self {
        let settings = registry.settings().clone();
        Self { registry, settings }
    }

    pub fn with_settings(registry: Arc<Registry>, settings: DispatchSettings) -> Self {
        Self { registry, settings }
    }

    /// Dispatcher over the process-wide registry.
    pub fn global() -> Self {
        Self::new(registry::global())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Call `verb` with `args[0]` as the subject.
    pub fn dispatch(
        &self,
        verb: &str,
        args: Vec<Arg>,
        kwargs: IndexMap<String, Arg>,
    ) -> Result<Value> {
        self.dispatch_at(0, verb, args, kwargs)
    }

    /// [`dispatch`](Self::dispatch) without keyword arguments.
    pub fn call(&self, verb: &str, args: Vec<Arg>) -> Result<Value> {
        self.dispatch_at(0, verb, args, IndexMap::new())
    }

    /// Evaluate a free-standing expression, typically a composed verb call.
    ///
    /// Verb calls in `expr` run at depth 0, the same as [`dispatch`](Self::dispatch).
    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        let ctx = EvaluationContext::empty().with_dispatch(self.handle_at(0, 0));
        evaluate(expr, &ctx)
    }

    /// The plugin and implementation that would serve `verb` for `subject`.
    pub fn resolve(&self, verb: &str, subject: &Value) -> Result<(Arc<PluginDescriptor>, VerbImpl)> {
        let info = subject.type_info();
        let candidates = self.registry.lookup(&info)?;
        candidates
            .into_iter()
            .find_map(|plugin| {
                let imp = plugin.get_verb(verb)?.clone();
                Some((plugin, imp))
            })
            .ok_or_else(|| PlyrError::VerbNotImplemented {
                verb: verb.to_string(),
                type_key: info.key.to_string(),
            })
    }

    /// Handle owned by a dispatch at `depth` whose calls run at `next`.
    fn handle_at(&self, depth: usize, next: usize) -> DispatchHandle {
        DispatchHandle {
            dispatcher: self.clone(),
            depth,
            next,
        }
    }

    pub(crate) fn dispatch_at(
        &self,
        depth: usize,
        verb: &str,
        args: Vec<Arg>,
        kwargs: IndexMap<String, Arg>,
    ) -> Result<Value> {
        if depth > self.settings.max_depth {
            return Err(PlyrError::RecursionLimit {
                verb: verb.to_string(),
                limit: self.settings.max_depth,
            });
        }

        let handle = self.handle_at(depth, depth + 1);
        let mut args = args.into_iter();
        let subject = match args.next() {
            Some(Arg::Value(value)) => value,
            // the subject is a sibling of this call, not nested inside it
            Some(Arg::Expr(expr)) => {
                let ctx = EvaluationContext::empty().with_dispatch(self.handle_at(depth, depth));
                evaluate(&expr, &ctx)?
            }
            None => return Err(PlyrError::MissingSubject(verb.to_string())),
        };

        let (plugin, imp) = self.resolve(verb, &subject)?;
        tracing::debug!(
            "Dispatching {}() on {} to plugin '{}' (depth {})",
            verb,
            subject.type_key(),
            plugin.name(),
            depth
        );

        let mut ctx = EvaluationContext::new(subject.clone()).with_dispatch(handle.clone());

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(match arg {
                Arg::Value(value) => value,
                Arg::Expr(expr) => {
                    ctx.set_kind(imp.context_for(None));
                    evaluate_grouped(&expr, &ctx)?
                }
            });
        }

        let mut named = IndexMap::with_capacity(kwargs.len());
        for (name, arg) in kwargs {
            let value = match arg {
                Arg::Value(value) => value,
                Arg::Expr(expr) => {
                    ctx.set_kind(imp.context_for(Some(&name)));
                    evaluate_grouped(&expr, &ctx)?
                }
            };
            named.insert(name, value);
        }
        drop(ctx);

        imp.call(VerbArgs::new(verb, subject, values, named, handle))
    }
}

/// Lets expression evaluation and verb implementations re-enter the
/// dispatcher one level deeper than the call that created it.
///
/// The handle behind [`Dispatcher::evaluate`] is the exception: it belongs
/// to no call, so its verb calls run at depth 0.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    dispatcher: Dispatcher,
    depth: usize,
    next: usize,
}

impl DispatchHandle {
    pub fn dispatch(
        &self,
        verb: &str,
        args: Vec<Arg>,
        kwargs: IndexMap<String, Arg>,
    ) -> Result<Value> {
        self.dispatcher.dispatch_at(self.next, verb, args, kwargs)
    }

    /// Depth of the dispatch that owns this handle; top-level calls are 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
