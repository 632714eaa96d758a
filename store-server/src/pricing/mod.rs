//! Delivery Pricing
//!
//! Distance-tier price resolution and the commission split shared with the
//! earnings calculator.

pub mod commission;
pub mod resolver;

pub use commission::{commission_split, to_decimal, to_f64};
pub use resolver::{PriceQuote, PricingResolver, select_tier};
