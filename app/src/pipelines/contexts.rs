// app/src/pipelines/contexts.rs

//! Data each pipeline runs on. Handlers receive these wrapped in
//! `orderflow::ContextData`.

use crate::checkout::ledger::Requested;
use crate::checkout::{Cart, PricedLine, Snapshots};
use crate::models::{OrderId, User, UserId};
use crate::state::AppState;
use rust_decimal::Decimal;
use secrecy::SecretString;

pub struct SignupCtxData {
  pub app_state: AppState,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub password: SecretString,
  pub password_hash: Option<String>,
  pub created_user_id: Option<UserId>,
}

pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: SecretString,
  pub user: Option<User>,
  pub token: Option<String>,
}

pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user_id: UserId,
  pub cart: Cart,
  pub address: String,
  pub requested: Requested,
  pub snapshots: Snapshots,
  pub lines: Vec<PricedLine>,
  pub total: Decimal,
  pub order_id: Option<OrderId>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, user_id: UserId, cart: Cart, address: String) -> Self {
    Self {
      app_state,
      user_id,
      cart,
      address,
      requested: Requested::new(),
      snapshots: Snapshots::new(),
      lines: Vec::new(),
      total: Decimal::ZERO,
      order_id: None,
    }
  }
}
