//! # Sales Kits
//!
//! Composite sellable products assembled from component articles in fixed
//! ratios, with bottleneck availability math and all-or-nothing stock
//! reservation.
//!
//! ## Availability Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How many kits can we build right now?                      │
//! │                                                                         │
//! │  Component A: 2 per kit, 10 available  →  floor(10/2) = 5               │
//! │  Component B: 3 per kit,  9 available  →  floor( 9/3) = 3               │
//! │                                                                         │
//! │  Kit availability = min(5, 3) = 3      (multi-resource bottleneck)      │
//! │                                                                         │
//! │  Availability floors to WHOLE kits: a fractional kit cannot be sold,    │
//! │  and reservation math below assumes discrete kit counts.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reservation, release and decomposition are two-phase: every component is
//! validated against the snapshot before any component is mutated, so a
//! failing call leaves the snapshot untouched. Callers that share a snapshot
//! across tasks must hold a single write lock around the whole call.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::Article;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::DiscountRate;
use crate::validation::{validate_code, validate_name, validate_quantity, validate_rate_bps};

// =============================================================================
// Components and Shortages
// =============================================================================

/// One component line of a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitComponent {
    pub article_id: Uuid,
    pub article_code: String,
    pub quantity_per_kit: i64,
}

impl KitComponent {
    pub fn new(article: &Article, quantity_per_kit: i64) -> CoreResult<Self> {
        validate_quantity(quantity_per_kit)?;
        Ok(KitComponent {
            article_id: article.id,
            article_code: article.code.clone(),
            quantity_per_kit,
        })
    }
}

/// Why a component cannot cover a fulfillment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shortage {
    /// The component article is missing from the snapshot.
    NotFound { code: String },
    /// Available stock is below what the request needs.
    Insufficient { code: String, need: i64, have: i64 },
}

impl fmt::Display for Shortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortage::NotFound { code } => write!(f, "{} (not found)", code),
            Shortage::Insufficient { code, need, have } => {
                write!(f, "{} (need {}, have {})", code, need, have)
            }
        }
    }
}

// =============================================================================
// Pricing Strategy
// =============================================================================

/// How the kit's selling price is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy", content = "price")]
pub enum PricingStrategy {
    /// Sum of component list prices, optionally discounted.
    Calculated,
    /// A fixed price set by hand.
    Custom(Money),
}

// =============================================================================
// Kit
// =============================================================================

/// A composite product built from component articles.
///
/// `cached_price` and `cached_availability` are derived values recomputed
/// on demand; component edits invalidate them and they are never trusted
/// as ground truth across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kit {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<KitComponent>,
    pub pricing: PricingStrategy,
    /// Discount applied on top of a calculated price.
    pub discount: Option<DiscountRate>,
    pub cached_price: Option<Money>,
    pub cached_availability: Option<i64>,
    pub sales_count: i64,
    pub last_sold: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Kit {
    /// Creates a kit. At least two components are required.
    pub fn new(code: &str, name: &str, components: Vec<KitComponent>) -> CoreResult<Self> {
        validate_code(code)?;
        validate_name(name)?;
        if components.len() < 2 {
            return Err(CoreError::InvalidKitComponents {
                found: components.len(),
            });
        }

        let now = Utc::now();
        Ok(Kit {
            id: Uuid::new_v4(),
            code: code.trim().to_uppercase(),
            name: name.trim().to_string(),
            description: None,
            components,
            pricing: PricingStrategy::Calculated,
            discount: None,
            cached_price: None,
            cached_availability: None,
            sales_count: 0,
            last_sold: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Cross-field consistency check, run before persisting edits.
    pub fn validate(&self) -> CoreResult<()> {
        validate_code(&self.code)?;
        validate_name(&self.name)?;
        if self.components.len() < 2 {
            return Err(CoreError::InvalidKitComponents {
                found: self.components.len(),
            });
        }
        for component in &self.components {
            validate_quantity(component.quantity_per_kit)?;
        }
        if let Some(rate) = self.discount {
            validate_rate_bps(rate.bps())?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Component Edits
    // -------------------------------------------------------------------------

    /// Adds a component, or tops up the quantity if the article is already
    /// in the kit. Invalidates cached price and availability.
    pub fn add_component(&mut self, component: KitComponent) -> CoreResult<()> {
        validate_quantity(component.quantity_per_kit)?;

        if let Some(existing) = self
            .components
            .iter_mut()
            .find(|c| c.article_id == component.article_id)
        {
            existing.quantity_per_kit += component.quantity_per_kit;
        } else {
            self.components.push(component);
        }
        self.invalidate_caches();
        Ok(())
    }

    /// Replaces a component's per-kit quantity.
    pub fn update_component_quantity(
        &mut self,
        article_id: Uuid,
        quantity_per_kit: i64,
    ) -> CoreResult<()> {
        validate_quantity(quantity_per_kit)?;

        let component = self
            .components
            .iter_mut()
            .find(|c| c.article_id == article_id)
            .ok_or_else(|| CoreError::ComponentNotInKit {
                code: article_id.to_string(),
            })?;
        component.quantity_per_kit = quantity_per_kit;
        self.invalidate_caches();
        Ok(())
    }

    /// Removes a component. A kit may never drop below two components.
    pub fn remove_component(&mut self, article_id: Uuid) -> CoreResult<()> {
        let position = self
            .components
            .iter()
            .position(|c| c.article_id == article_id)
            .ok_or_else(|| CoreError::ComponentNotInKit {
                code: article_id.to_string(),
            })?;

        if self.components.len() - 1 < 2 {
            return Err(CoreError::InvalidKitComponents {
                found: self.components.len() - 1,
            });
        }

        self.components.remove(position);
        self.invalidate_caches();
        Ok(())
    }

    fn invalidate_caches(&mut self) {
        self.cached_price = None;
        self.cached_availability = None;
        self.updated_at = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    /// Sum of component list prices at per-kit quantities.
    pub fn components_value(&self, articles: &HashMap<Uuid, Article>) -> CoreResult<Money> {
        let mut total = Money::zero();
        for component in &self.components {
            let article = articles.get(&component.article_id).ok_or_else(|| {
                CoreError::ComponentNotFound {
                    code: component.article_code.clone(),
                }
            })?;
            total += article
                .pricing
                .list_price
                .multiply_quantity(component.quantity_per_kit);
        }
        Ok(total)
    }

    /// Computes the selling price and refreshes the cache.
    pub fn calculate_price(&mut self, articles: &HashMap<Uuid, Article>) -> CoreResult<Money> {
        let price = match self.pricing {
            PricingStrategy::Custom(price) => price,
            PricingStrategy::Calculated => {
                let value = self.components_value(articles)?;
                match self.discount {
                    Some(rate) => value.apply_discount(rate),
                    None => value,
                }
            }
        };
        self.cached_price = Some(price);
        Ok(price)
    }

    /// What the buyer saves versus buying the components separately.
    /// Negative when the kit is priced above its parts.
    pub fn savings(&self, articles: &HashMap<Uuid, Article>) -> CoreResult<Money> {
        let value = self.components_value(articles)?;
        let price = match self.pricing {
            PricingStrategy::Custom(price) => price,
            PricingStrategy::Calculated => match self.discount {
                Some(rate) => value.apply_discount(rate),
                None => value,
            },
        };
        Ok(value - price)
    }

    /// The savings as a percentage of the components' combined value, for
    /// display. Clamped at zero when the kit is priced above its parts.
    pub fn savings_percent(&self, articles: &HashMap<Uuid, Article>) -> CoreResult<f64> {
        let value = self.components_value(articles)?;
        if !value.is_positive() {
            return Ok(0.0);
        }
        let savings = self.savings(articles)?;
        if !savings.is_positive() {
            return Ok(0.0);
        }
        Ok(savings.cents() as f64 / value.cents() as f64 * 100.0)
    }

    // -------------------------------------------------------------------------
    // Availability and Fulfillment
    // -------------------------------------------------------------------------

    /// Maximum number of whole kits buildable from current stock, the
    /// minimum across component bottlenecks. Refreshes the cache.
    ///
    /// A missing or exhausted component short-circuits to zero.
    pub fn calculate_availability(&mut self, articles: &HashMap<Uuid, Article>) -> i64 {
        let mut buildable = i64::MAX;

        for component in &self.components {
            let available = match articles.get(&component.article_id) {
                Some(article) => article.stock.available(),
                None => 0,
            };
            if available <= 0 {
                buildable = 0;
                break;
            }
            buildable = buildable.min(available / component.quantity_per_kit);
        }

        if self.components.is_empty() {
            buildable = 0;
        }
        self.cached_availability = Some(buildable);
        buildable
    }

    /// Checks whether `quantity` kits can be assembled, reporting every
    /// shortage rather than stopping at the first.
    pub fn can_fulfill(
        &self,
        quantity: i64,
        articles: &HashMap<Uuid, Article>,
    ) -> Result<(), Vec<Shortage>> {
        let mut shortages = Vec::new();

        for component in &self.components {
            let required = component.quantity_per_kit * quantity;
            match articles.get(&component.article_id) {
                None => shortages.push(Shortage::NotFound {
                    code: component.article_code.clone(),
                }),
                Some(article) => {
                    let available = article.stock.available();
                    if available < required {
                        shortages.push(Shortage::Insufficient {
                            code: component.article_code.clone(),
                            need: required,
                            have: available,
                        });
                    }
                }
            }
        }

        if shortages.is_empty() {
            Ok(())
        } else {
            Err(shortages)
        }
    }

    /// Reserves component stock for `quantity` kits, all or nothing.
    ///
    /// Phase 1 validates every component against the snapshot; phase 2
    /// mutates. A failure leaves the snapshot untouched.
    pub fn reserve_components(
        &self,
        quantity: i64,
        articles: &mut HashMap<Uuid, Article>,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;
        self.can_fulfill(quantity, articles)
            .map_err(|shortages| CoreError::KitUnfulfillable {
                code: self.code.clone(),
                shortages,
            })?;

        for component in &self.components {
            let required = component.quantity_per_kit * quantity;
            if let Some(article) = articles.get_mut(&component.article_id) {
                article.reserve_stock(required)?;
            }
        }
        Ok(())
    }

    /// Releases previously reserved component stock, all or nothing.
    pub fn release_components(
        &self,
        quantity: i64,
        articles: &mut HashMap<Uuid, Article>,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;

        for component in &self.components {
            let required = component.quantity_per_kit * quantity;
            let article = articles.get(&component.article_id).ok_or_else(|| {
                CoreError::ComponentNotFound {
                    code: component.article_code.clone(),
                }
            })?;
            if article.stock.reserved < required {
                return Err(CoreError::ReleaseExceedsReserved {
                    code: component.article_code.clone(),
                    reserved: article.stock.reserved,
                    requested: required,
                });
            }
        }

        for component in &self.components {
            let required = component.quantity_per_kit * quantity;
            if let Some(article) = articles.get_mut(&component.article_id) {
                article.release_reserved(required)?;
            }
        }
        Ok(())
    }

    /// Consumes component stock for `quantity` sold kits, all or nothing,
    /// then bumps the sales counter and last-sold timestamp.
    pub fn decompose(
        &mut self,
        quantity: i64,
        articles: &mut HashMap<Uuid, Article>,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;
        self.can_fulfill(quantity, articles)
            .map_err(|shortages| CoreError::KitUnfulfillable {
                code: self.code.clone(),
                shortages,
            })?;

        for component in &self.components {
            let required = component.quantity_per_kit * quantity;
            if let Some(article) = articles.get_mut(&component.article_id) {
                article.remove_stock(required)?;
            }
        }

        self.sales_count += quantity;
        let now = Utc::now();
        self.last_sold = Some(now);
        self.updated_at = now;
        self.cached_availability = None;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
