//! Promotions domain module.
//!
//! Discount codes with a validity window, a usage limit and an optional
//! minimum order. Redemption is a versioned command on the `Promotion`
//! aggregate.

pub mod promotion;

pub use promotion::{
    Discount, DiscountQuote, NewPromotion, Promotion, PromotionCommand, PromotionEvent,
    PromotionId, PromotionRedeemed, RedeemPromotion,
};
