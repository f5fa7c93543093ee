//! Business services
//!
//! Each multi-step mutation (checkout, order creation, stock adjustment,
//! payment reconciliation) runs inside one database transaction.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod ledger;
pub mod order;
pub mod order_status;
pub mod payment;
