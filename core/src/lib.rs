// core/src/lib.rs

//! orderflow: a small async step-pipeline engine.
//!
//! A pipeline is an ordered list of named steps. Each step owns three lists of
//! async handlers (`before`, `on`, `after`) that all operate on one shared
//! [`ContextData<T>`]. Handlers either let the run continue, stop it early, or
//! fail it with the pipeline's own error type.
//!
//! Pipelines are registered in a [`Registry`] keyed by their context type, so
//! callers only need to build the context and call `registry.run(ctx)`.
//!
//! ```ignore
//! let mut p = Pipeline::<OrderCtx, AppError>::new(&[
//!   ("validate", false, None),
//!   ("persist", false, None),
//! ]);
//! p.on("validate", |ctx: ContextData<OrderCtx>| async move { Ok::<_, AppError>(PipelineControl::Continue) });
//! registry.register_pipeline(p);
//! registry.run(ContextData::new(OrderCtx::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;
