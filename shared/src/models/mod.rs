//! Data models
//!
//! Shared between shop-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod cart;
pub mod category;
pub mod order;
pub mod payment;
pub mod product;
pub mod statistics;
pub mod stock;
pub mod user;
pub mod variant;

// Re-exports
pub use cart::*;
pub use category::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use statistics::*;
pub use stock::*;
pub use user::*;
pub use variant::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PaymentPending).unwrap(),
            "\"PAYMENT_PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&CartStatus::CheckedOut).unwrap(),
            "\"CHECKED_OUT\""
        );
        assert_eq!(
            serde_json::to_string(&MovementReason::ManualAdjust).unwrap(),
            "\"MANUAL_ADJUST\""
        );
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"MANAGER\"");
    }

    #[test]
    fn test_webhook_payload_parse() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"intentId":"pi_abc","status":"SUCCEEDED"}"#).unwrap();
        assert_eq!(payload.intent_id, "pi_abc");
        assert_eq!(payload.status, PaymentStatus::Succeeded);

        let bad = serde_json::from_str::<WebhookPayload>(r#"{"intentId":"pi_abc","status":"DONE"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_checkout_response_shape() {
        let resp = CheckoutResponse {
            order_id: 1,
            order_status: OrderStatus::PaymentPending,
            payment_intent_id: "pi_1".to_string(),
            payment_status: PaymentStatus::Pending,
            amount: AmountBreakdown {
                subtotal: 200.0,
                tax: 40.0,
                shipping: 17.5,
                total: 257.5,
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["orderId"], 1);
        assert_eq!(json["orderStatus"], "PAYMENT_PENDING");
        assert_eq!(json["paymentIntentId"], "pi_1");
        assert_eq!(json["amount"]["total"], 257.5);
    }

    #[test]
    fn test_product_sort_names() {
        let sort: ProductSort = serde_json::from_str("\"price-desc\"").unwrap();
        assert_eq!(sort, ProductSort::PriceDesc);
    }

    #[test]
    fn test_order_terminal_states() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::PaymentFailed.is_terminal());
        assert!(!OrderStatus::PaymentPending.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }
}
