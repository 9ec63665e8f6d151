//! # Seed Data Generator
//!
//! Populates the in-memory store with demo data and walks one pricing and
//! one kit flow end to end. Useful for eyeballing log output and quote
//! breakdowns during development.
//!
//! ## Usage
//! ```bash
//! # Seed and run the demo flows
//! cargo run -p ricambi-store --bin seed
//!
//! # Generate extra filler articles
//! cargo run -p ricambi-store --bin seed -- --count 500
//!
//! # Verbose logging
//! RUST_LOG=debug cargo run -p ricambi-store --bin seed
//! ```

use std::env;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ricambi_core::customer::{DiscountRule, RuleDiscount, RuleScope};
use ricambi_core::promotion::PromotionKind;
use ricambi_core::types::DiscountRate;
use ricambi_core::{Article, CreditVoucher, Customer, Kit, KitComponent, Money, Promotion};
use ricambi_store::{
    ArticleRepository, CustomerRepository, KitRepository, PricingService, PromotionRepository,
    StockService, VoucherRepository,
};

/// Base catalog: (code, description, family, list price cents, on hand)
const CATALOG: &[(&str, &str, &str, i64, i64)] = &[
    ("FLT-OIL-01", "Filtro olio motore", "FILTRI", 1_250, 40),
    ("FLT-AIR-02", "Filtro aria abitacolo", "FILTRI", 1_890, 24),
    ("FLT-FUE-03", "Filtro carburante", "FILTRI", 2_150, 18),
    ("BRK-PAD-01", "Pastiglie freno anteriori", "FRENI", 4_590, 30),
    ("BRK-DSC-02", "Disco freno ventilato", "FRENI", 7_900, 12),
    ("OIL-5W30-4L", "Olio motore 5W30 4L", "LUBRIFICANTI", 3_490, 60),
    ("SPK-PLG-01", "Candela accensione iridium", "ACCENSIONE", 1_190, 80),
    ("BAT-60AH-01", "Batteria 60Ah", "ELETTRICO", 9_900, 8),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut filler_count: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    filler_count = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ricambi Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Extra filler articles to generate (default: 0)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let articles = ArticleRepository::new();
    let customers = CustomerRepository::new();
    let promotions = PromotionRepository::new();
    let kits = KitRepository::new();

    // ------------------------------------------------------------------
    // Articles
    // ------------------------------------------------------------------
    for &(code, description, family, price, on_hand) in CATALOG {
        let mut article = Article::new(code, description)?;
        article.family = Some(family.to_string());
        article.precode = Some(code.split('-').next().unwrap_or(code).to_string());
        article.pricing.list_price = Money::from_cents(price);
        article.stock.on_hand = on_hand;
        article.stock.reorder_point = 5;
        articles.insert(article).await?;
    }
    for n in 0..filler_count {
        let mut article = Article::new(
            &format!("GEN-{:05}", n),
            &format!("Ricambio generico {}", n),
        )?;
        article.family = Some("GENERICI".to_string());
        article.pricing.list_price = Money::from_cents(500 + (n as i64 % 90) * 100);
        article.stock.on_hand = (n as i64 % 50) + 1;
        articles.insert(article).await?;
    }
    info!(count = CATALOG.len() + filler_count, "articles seeded");

    // ------------------------------------------------------------------
    // Customers: a workshop with a discount grid and a fido limit
    // ------------------------------------------------------------------
    let mut workshop = Customer::new("C001", "Officina Rossi")?;
    workshop.credit.fido_limit = Money::from_cents(500_000);
    workshop.add_discount_rule(DiscountRule::new(
        RuleScope::Family("FILTRI".to_string()),
        RuleDiscount::Cascade(vec![DiscountRate::from_bps(1000), DiscountRate::from_bps(500)]),
        1,
    ))?;
    workshop.add_discount_rule(DiscountRule::new(
        RuleScope::ArticleCode("BRK-PAD-01".to_string()),
        RuleDiscount::Single(DiscountRate::from_bps(1500)),
        5,
    ))?;
    let workshop_id = workshop.id;
    customers.insert(workshop).await?;

    let retail = Customer::new("C002", "Bianchi Mario")?;
    let retail_id = retail.id;
    customers.insert(retail).await?;
    info!(count = 2, "customers seeded");

    // ------------------------------------------------------------------
    // Promotions
    // ------------------------------------------------------------------
    let mut brakes_promo = Promotion::new(
        "PROMO-FRENI",
        "Sconto 20% linea freni",
        PromotionKind::PercentDiscount {
            rate: DiscountRate::from_bps(2000),
        },
    )?;
    brakes_promo.article_filter.families = vec!["FRENI".to_string()];
    promotions.insert(brakes_promo).await?;

    let spark_promo = Promotion::new(
        "PROMO-4X3",
        "Candele: prendi 4 paghi 3",
        PromotionKind::BuyNGetM {
            buy_quantity: 4,
            get_quantity: 1,
        },
    )?;
    promotions.insert(spark_promo).await?;
    info!(count = 2, "promotions seeded");

    // ------------------------------------------------------------------
    // Kit: oil service bundle
    // ------------------------------------------------------------------
    let oil_filter = articles.get_by_code("FLT-OIL-01").await?;
    let engine_oil = articles.get_by_code("OIL-5W30-4L").await?;
    let kit = Kit::new(
        "KIT-TAGLIANDO",
        "Kit tagliando completo",
        vec![
            KitComponent::new(&oil_filter, 1)?,
            KitComponent::new(&engine_oil, 1)?,
        ],
    )?;
    let kit_id = kit.id;
    kits.insert(kit).await?;

    // ------------------------------------------------------------------
    // Demo flows
    // ------------------------------------------------------------------
    let pricing = PricingService::new(articles.clone(), customers.clone(), promotions.clone());
    let stock = StockService::new(articles.clone(), kits.clone());

    // Workshop buys brake pads: 15% grid rule vs 20% promotion.
    let pads = articles.get_by_code("BRK-PAD-01").await?;
    let quote = pricing.quote(workshop_id, pads.id, 4).await?;
    println!("--- quote: workshop, 4x brake pads ---");
    println!("{}", serde_json::to_string_pretty(&quote)?);

    // Retail customer buys 9 spark plugs: 2 free via the 4x3 promotion.
    let plugs = articles.get_by_code("SPK-PLG-01").await?;
    let quote = pricing.quote(retail_id, plugs.id, 9).await?;
    println!("--- quote: retail, 9x spark plugs ---");
    println!("{}", serde_json::to_string_pretty(&quote)?);
    pricing.commit(&quote).await?;

    // Kit flow: availability, then a reservation.
    let available = stock.kit_availability(kit_id).await?;
    info!(available, "oil service kits buildable");
    stock.reserve_kit(kit_id, 2).await?;
    info!("reserved components for 2 kits");

    // Voucher flow: credit from a return, partially spent on today's sale.
    let vouchers = VoucherRepository::new();
    let voucher = CreditVoucher::new(
        "VC-2026-001",
        workshop_id,
        Money::from_cents(7_500),
        "Reso pastiglie difettose",
        Some(365),
    )?;
    let voucher_id = voucher.id;
    vouchers.insert(voucher).await?;
    match vouchers
        .redeem(voucher_id, Money::from_cents(2_000), "DOC-0001", "mrossi", Utc::now())
        .await?
    {
        Ok(voucher) => info!(remaining = %voucher.remaining_amount, "voucher redeemed"),
        Err(denial) => info!(%denial, "voucher redemption denied"),
    }

    Ok(())
}
