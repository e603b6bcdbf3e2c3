// tests/error_handling_tests.rs
mod common;
use common::*;
use orderflow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn non_optional_step_without_handlers_fails_the_run() {
  setup_tracing();
  let pipeline = Pipeline::<DraftOrder, TestError>::new(&[("persist", false, None)]);
  let result = pipeline.run(ContextData::new(DraftOrder::default())).await;
  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("persist"));
    }
    other => panic!("Expected TestError::Flow(HandlerMissing), got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn pipeline_can_use_flow_error_directly() {
  setup_tracing();
  let mut pipeline = Pipeline::<DraftOrder, FlowError>::new(&[("price", false, None)]);
  pipeline.on("price", |ctx: ContextData<DraftOrder>| async move {
    ctx.update(|d| d.total_cents = 1999);
    Ok::<_, FlowError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(DraftOrder::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().total_cents, 1999);
}

#[tokio::test]
#[serial]
async fn anyhow_errors_become_handler_errors() {
  setup_tracing();
  let mut pipeline = Pipeline::<DraftOrder, FlowError>::new(&[("persist", false, None)]);
  pipeline.on("persist", |_ctx: ContextData<DraftOrder>| async move {
    Err::<PipelineControl, _>(anyhow::anyhow!("connection reset"))
  });

  let err = pipeline.run(ContextData::new(DraftOrder::default())).await.unwrap_err();
  match err {
    FlowError::Handler { source } => assert_eq!(source.to_string(), "connection reset"),
    other => panic!("Expected FlowError::Handler, got {:?}", other),
  }
}

#[test]
fn anyhow_wrapping_a_flow_error_is_unwrapped() {
  let wrapped = anyhow::Error::new(FlowError::StepNotFound {
    step_name: "reserve".to_string(),
  });
  match FlowError::from(wrapped) {
    FlowError::StepNotFound { step_name } => assert_eq!(step_name, "reserve"),
    other => panic!("Expected StepNotFound, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn failing_after_handler_still_reports_the_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<DraftOrder, TestError>::new(&[("persist", false, None)]);
  pipeline.on("persist", add_line_handler("persist", 10));
  pipeline.after("persist", failing_handler("audit", "audit log unavailable"));

  let ctx = ContextData::new(DraftOrder::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("audit log unavailable".to_string()));
  assert_eq!(ctx.read().total_cents, 10);
}
