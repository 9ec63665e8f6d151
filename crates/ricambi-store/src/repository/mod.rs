//! # Repository Module
//!
//! Repository implementations over the in-memory document collections.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Repositories abstract collection access behind a typed API.           │
//! │                                                                         │
//! │  Service / terminal code                                               │
//! │       │                                                                 │
//! │       │  articles.get_by_code("FLT-OIL-01")                            │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ArticleRepository                                                     │
//! │  ├── insert(&self, article)                                            │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── get_by_ids(&self, ids)                                            │
//! │  └── update(&self, article)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Collection<Article>  (RwLock-guarded HashMap)                         │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Uniqueness and lookup failures in one place                         │
//! │  • Locking is isolated behind the API                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`article::ArticleRepository`] - Catalog and stock lookups
//! - [`customer::CustomerRepository`] - Accounts with discount grids
//! - [`promotion::PromotionRepository`] - Active-set queries and usage counters
//! - [`kit::KitRepository`] - Kit definitions
//! - [`voucher::VoucherRepository`] - Credit voucher balances and redemptions

pub mod article;
pub mod customer;
pub mod kit;
pub mod promotion;
pub mod voucher;
