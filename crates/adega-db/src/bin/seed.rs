//! # Seed Data Generator
//!
//! Creates a demo store with an owner account and a stocked catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p adega-db --bin seed
//!
//! # Specify database path and owner credentials
//! cargo run -p adega-db --bin seed -- --db ./data/adega.db --email dono@adega.test
//! ```
//!
//! The owner's password is `adega1234` unless `--password` is given.
//! Re-running against a database that already has the owner is a no-op.

use std::env;

use anyhow::{anyhow, Context};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adega_core::{CustomerInput, NewProduct, NewStore, ProductCategory, StoreContext};
use adega_db::{Database, DbConfig};

/// (name, category, cost, price, promo, stock, min_stock), money in cents.
const CATALOG: &[(&str, ProductCategory, i64, i64, Option<i64>, i64, i64)] = &[
    ("Catena Malbec 750ml", ProductCategory::RedWine, 6200, 11990, None, 24, 6),
    ("Casillero del Diablo Cabernet 750ml", ProductCategory::RedWine, 3900, 6990, Some(5990), 36, 12),
    ("Miolo Seleção Tinto 750ml", ProductCategory::RedWine, 2800, 4990, None, 30, 10),
    ("Santa Helena Reservado Merlot 750ml", ProductCategory::RedWine, 1900, 3490, None, 48, 12),
    ("Periquita Original 750ml", ProductCategory::RedWine, 4100, 7490, None, 18, 6),
    ("Casal Garcia Vinho Verde 750ml", ProductCategory::WhiteWine, 3800, 6990, None, 20, 6),
    ("Chandon Brut 750ml", ProductCategory::Sparkling, 6900, 11990, Some(9990), 15, 5),
    ("Salton Moscatel 750ml", ProductCategory::Sparkling, 2900, 5490, None, 24, 6),
    ("Mateus Rosé 750ml", ProductCategory::RoseWine, 3600, 6490, None, 12, 4),
    ("Heineken Long Neck 330ml", ProductCategory::Beer, 420, 790, None, 240, 48),
    ("Original 600ml", ProductCategory::Beer, 650, 1190, None, 120, 24),
    ("Johnnie Walker Red Label 1L", ProductCategory::Whisky, 7900, 12990, None, 10, 3),
    ("Absolut Vodka 1L", ProductCategory::Vodka, 6100, 9990, None, 8, 3),
    ("Tanqueray London Dry 750ml", ProductCategory::Gin, 8600, 14990, None, 6, 2),
    ("Cachaça 51 965ml", ProductCategory::Cachaca, 750, 1590, None, 40, 10),
    ("Coca-Cola 2L", ProductCategory::SoftDrink, 690, 1190, None, 60, 12),
    ("Água Mineral 500ml", ProductCategory::Water, 110, 350, None, 100, 24),
    ("Red Bull 250ml", ProductCategory::EnergyDrink, 590, 1090, None, 48, 12),
    ("Amendoim Japonês 150g", ProductCategory::Snack, 380, 890, None, 30, 10),
    ("Saca-rolhas Garçom", ProductCategory::Accessory, 1500, 3990, None, 5, 2),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./adega_dev.db");
    let mut email = String::from("dono@adega.test");
    let mut password = String::from("adega1234");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 1;
            }
            "--email" if i + 1 < args.len() => {
                email = args[i + 1].clone();
                i += 1;
            }
            "--password" if i + 1 < args.len() => {
                password = args[i + 1].clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Adega Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./adega_dev.db)");
                println!("      --email <EMAIL>    Owner login (default: dono@adega.test)");
                println!("      --password <PASS>  Owner password (default: adega1234)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    if db.profiles().find_by_email(&email).await?.is_some() {
        warn!(email = %email, "Owner already exists, skipping seed");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hashing password: {e}"))?
        .to_string();

    let owner = db.profiles().create("Dono da Adega", &email, &password_hash).await?;
    let store = db
        .stores()
        .create(
            &owner.id,
            &NewStore {
                name: "Adega Demo".to_string(),
                document: Some("12.345.678/0001-90".to_string()),
                phone: Some("(11) 3333-4444".to_string()),
                address: Some("Rua dos Vinhedos, 100 - São Paulo".to_string()),
            },
        )
        .await?;
    let ctx = StoreContext::new(owner.id.clone(), store.id.clone());

    for &(name, category, cost, price, promo, stock, min_stock) in CATALOG {
        let input = NewProduct {
            name: name.to_string(),
            description: None,
            category,
            cost_price_cents: cost,
            sale_price_cents: price,
            promo_price_cents: promo,
            stock_quantity: stock,
            min_stock,
        };
        db.products().create(&ctx, &input).await?;
    }

    for (name, phone, birth) in [
        ("Maria Oliveira", "(11) 98765-4321", (1988, 3, 14)),
        ("João Pereira", "(11) 91234-5678", (1975, 11, 2)),
    ] {
        db.customers()
            .create(
                &ctx,
                &CustomerInput {
                    name: name.to_string(),
                    phone: Some(phone.to_string()),
                    email: None,
                    birth_date: chrono::NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2),
                    notes: None,
                },
            )
            .await?;
    }

    info!(
        db = %db_path,
        store_id = %store.id,
        owner = %email,
        products = CATALOG.len(),
        "Seed complete"
    );

    Ok(())
}
