//! # Service Module
//!
//! Services coordinate repositories for operations that span entities:
//! pricing a line needs customer, article and the active promotion set;
//! selling a kit moves stock on every component.
//!
//! - [`pricing::PricingService`] - Quotes and sale commits
//! - [`stock::StockService`] - Stock movements and atomic kit reservation

pub mod pricing;
pub mod stock;
