//! # ricambi-store: Store Layer for Ricambi
//!
//! This crate owns the shared state of the Ricambi system: document
//! collections behind async locks, repositories over them, the operator
//! session store, and the services that coordinate pricing and stock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ricambi Data Flow                                │
//! │                                                                         │
//! │  Terminal / service caller                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   ricambi-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐ │   │
//! │  │   │ Collection<T>│   │ Repositories  │   │    Services      │ │   │
//! │  │   │  (store.rs)  │◄──│ article, kit, │◄──│ PricingService   │ │   │
//! │  │   │ RwLock'd map │   │ customer,     │   │ StockService     │ │   │
//! │  │   │              │   │ promotion     │   │                  │ │   │
//! │  │   └──────────────┘   └───────────────┘   └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────────────────────────────────────────────┐ │   │
//! │  │   │  SessionStore trait + MemorySessionStore (session.rs)    │ │   │
//! │  │   └──────────────────────────────────────────────────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ricambi-core: pure pricing, discount and kit logic                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `Collection<T>` primitive
//! - [`repository`] - Typed repositories (article, customer, promotion, kit, voucher)
//! - [`session`] - Operator session store behind a trait
//! - [`service`] - Pricing and stock services
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ricambi_store::{ArticleRepository, CustomerRepository, PromotionRepository, PricingService};
//!
//! let articles = ArticleRepository::new();
//! let customers = CustomerRepository::new();
//! let promotions = PromotionRepository::new();
//!
//! let pricing = PricingService::new(articles, customers, promotions);
//! let quote = pricing.quote(customer_id, article_id, 3).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod repository;
pub mod service;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use store::Collection;

// Repository re-exports for convenience
pub use repository::article::ArticleRepository;
pub use repository::customer::CustomerRepository;
pub use repository::kit::KitRepository;
pub use repository::promotion::PromotionRepository;
pub use repository::voucher::VoucherRepository;

// Session store
pub use session::{MemorySessionStore, Session, SessionStore};

// Services
pub use service::pricing::PricingService;
pub use service::stock::StockService;
