// core/src/core/context.rs

//! The boxed handler type stored by a pipeline for each step phase.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A future returned by a stored handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// A step handler after registration.
///
/// Each invocation receives its own clone of the shared `ContextData<TData>`.
/// Handlers must drop any lock guard they take before their next `.await`.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;
