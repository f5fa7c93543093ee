//! Unified error codes for the shop backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Inventory errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a plain `u16` so clients can switch on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid format
    InvalidFormat = 6,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Cart ====================
    /// No active cart for the user
    CartNotFound = 3001,
    /// Cart has no items
    CartEmpty = 3002,
    /// Cart item not found
    CartItemNotFound = 3003,
    /// Item quantity outside the allowed range
    CartQuantityOutOfRange = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4002,

    // ==================== 5xxx: Payment ====================
    /// Unknown payment intent
    PaymentIntentNotFound = 5001,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Variant not found
    VariantNotFound = 6002,
    /// Variant SKU already exists
    VariantSkuExists = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category slug already exists
    CategorySlugExists = 6102,

    // ==================== 7xxx: Inventory ====================
    /// Not enough stock to reserve
    InsufficientStock = 7001,
    /// No stock row for the variant
    StockNotFound = 7002,
    /// Stock quantity is invalid
    InvalidStockQuantity = 7003,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Email is already registered
    EmailAlreadyRegistered = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Cart
            ErrorCode::CartNotFound => "Active cart not found",
            ErrorCode::CartEmpty => "Cart must contain at least one item",
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::CartQuantityOutOfRange => "Quantity out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order must contain at least one item",

            // Payment
            ErrorCode::PaymentIntentNotFound => "Payment intent not found",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::VariantNotFound => "Variant not found",
            ErrorCode::VariantSkuExists => "Variant SKU already exists",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategorySlugExists => "Category slug already exists",

            // Inventory
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::StockNotFound => "Stock not found",
            ErrorCode::InvalidStockQuantity => "Invalid stock quantity",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            6 => Ok(ErrorCode::InvalidFormat),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Cart
            3001 => Ok(ErrorCode::CartNotFound),
            3002 => Ok(ErrorCode::CartEmpty),
            3003 => Ok(ErrorCode::CartItemNotFound),
            3004 => Ok(ErrorCode::CartQuantityOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),

            // Payment
            5001 => Ok(ErrorCode::PaymentIntentNotFound),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::VariantNotFound),
            6003 => Ok(ErrorCode::VariantSkuExists),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategorySlugExists),

            // Inventory
            7001 => Ok(ErrorCode::InsufficientStock),
            7002 => Ok(ErrorCode::StockNotFound),
            7003 => Ok(ErrorCode::InvalidStockQuantity),

            // User
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::EmailAlreadyRegistered),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
