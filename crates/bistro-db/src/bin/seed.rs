//! # Seed Data Generator
//!
//! Populates a database with a small demo restaurant for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p bistro-db --bin seed
//!
//! # Specify database path and admin credentials
//! cargo run -p bistro-db --bin seed -- --db ./data/bistro.db \
//!     --admin-email owner@example.com --admin-password changeme123
//! ```
//!
//! ## Generated Data
//! - Four categories with a handful of dishes each
//! - Addons (extra cheese, bacon, ...) attached to mains
//! - A 10% VAT charge on every dish and a fixed packaging fee on pizzas
//! - A "Size" variant on pizzas and drinks
//! - An admin account and a `WELCOME10` coupon

use bistro_core::AdjustmentKind;
use bistro_db::{
    hash_password, AddonInput, CategoryInput, ChargeInput, CouponInput, Database, DbConfig,
    MenuItemInput, NewUser, PageRequest, Relation, VariantInput, VariantOptionInput,
};
use bistro_core::UserRole;
use std::env;

/// (category, [(dish, price in cents)])
const MENU: &[(&str, &[(&str, i64)])] = &[
    (
        "Starters",
        &[
            ("Garlic Bread", 450),
            ("Bruschetta", 650),
            ("Calamari", 895),
            ("Soup of the Day", 550),
        ],
    ),
    (
        "Pizza",
        &[
            ("Margherita", 1050),
            ("Pepperoni", 1250),
            ("Quattro Formaggi", 1350),
            ("Diavola", 1300),
            ("Vegetariana", 1200),
        ],
    ),
    (
        "Burgers",
        &[
            ("Classic Burger", 1150),
            ("Cheeseburger", 1250),
            ("Chicken Burger", 1195),
            ("Veggie Burger", 1095),
        ],
    ),
    (
        "Drinks",
        &[
            ("Lemonade", 350),
            ("Iced Tea", 350),
            ("Espresso", 250),
            ("Sparkling Water", 300),
        ],
    ),
];

const ADDONS: &[(&str, i64)] = &[
    ("Extra Cheese", 150),
    ("Bacon", 200),
    ("Jalapeños", 100),
    ("Avocado", 250),
];

const PIZZA_SIZES: &[(&str, i64)] = &[("Regular", 0), ("Large", 300), ("Family", 650)];
const DRINK_SIZES: &[(&str, i64)] = &[("Small", 0), ("Large", 120)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bistro_dev.db");
    let mut admin_email = String::from("admin@bistro.local");
    let mut admin_password = String::from("bistro-admin");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-email" => {
                if i + 1 < args.len() {
                    admin_email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bistro Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>            Database file path (default: ./bistro_dev.db)");
                println!("      --admin-email <EMAIL>  Admin login (default: admin@bistro.local)");
                println!("      --admin-password <PW>  Admin password (default: bistro-admin)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bistro Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.categories().list(false, PageRequest::default()).await?.total;
    if existing > 0 {
        println!("⚠ Database already has {} categories", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Shared catalog pieces
    let mut addon_ids = Vec::new();
    for (name, price_cents) in ADDONS {
        let addon = db
            .addons()
            .insert(&AddonInput {
                name: name.to_string(),
                price_cents: *price_cents,
                is_active: true,
            })
            .await?;
        addon_ids.push(addon.id);
    }
    println!("✓ {} addons", addon_ids.len());

    let vat = db
        .charges()
        .insert(&ChargeInput {
            name: "VAT".into(),
            charge_type: AdjustmentKind::Percentage,
            value: 1000,
            is_active: true,
        })
        .await?;
    let packaging = db
        .charges()
        .insert(&ChargeInput {
            name: "Packaging".into(),
            charge_type: AdjustmentKind::Fixed,
            value: 50,
            is_active: true,
        })
        .await?;
    println!("✓ 2 charges");

    let pizza_size = db.variants().insert(&size_variant(PIZZA_SIZES)).await?;
    let drink_size = db.variants().insert(&size_variant(DRINK_SIZES)).await?;
    println!("✓ 2 variants");

    let mut items = 0;
    for (position, (category_name, dishes)) in MENU.iter().enumerate() {
        let category = db
            .categories()
            .insert(&CategoryInput {
                name: category_name.to_string(),
                description: None,
                is_active: true,
                sort_order: position as i64,
            })
            .await?;

        for (sort_order, (dish, price_cents)) in dishes.iter().enumerate() {
            let item = db
                .menu_items()
                .insert(&MenuItemInput {
                    category_id: Some(category.id.clone()),
                    name: dish.to_string(),
                    description: None,
                    price_cents: *price_cents,
                    discount_type: None,
                    discount_value: 0,
                    is_available: true,
                    is_featured: sort_order == 0,
                    sort_order: sort_order as i64,
                })
                .await?;

            let mut charge_ids = vec![vat.id.clone()];
            match *category_name {
                "Pizza" => {
                    charge_ids.push(packaging.id.clone());
                    db.menu_items()
                        .set_relation(&item.id, Relation::Variants, &[pizza_size.variant.id.clone()])
                        .await?;
                    db.menu_items()
                        .set_relation(&item.id, Relation::Addons, &addon_ids)
                        .await?;
                }
                "Burgers" => {
                    db.menu_items()
                        .set_relation(&item.id, Relation::Addons, &addon_ids)
                        .await?;
                }
                "Drinks" => {
                    db.menu_items()
                        .set_relation(&item.id, Relation::Variants, &[drink_size.variant.id.clone()])
                        .await?;
                }
                _ => {}
            }
            db.menu_items()
                .set_relation(&item.id, Relation::Charges, &charge_ids)
                .await?;

            items += 1;
        }
    }
    println!("✓ {} categories, {} menu items", MENU.len(), items);

    db.coupons()
        .insert(&CouponInput {
            code: "WELCOME10".into(),
            discount_type: AdjustmentKind::Percentage,
            discount_value: 1000,
            min_order_cents: 1500,
            max_discount_cents: Some(1000),
            usage_limit: Some(100),
            starts_at: None,
            expires_at: None,
            is_active: true,
        })
        .await?;
    println!("✓ Coupon WELCOME10");

    db.users()
        .insert(&NewUser {
            name: "Administrator".into(),
            email: admin_email.clone(),
            password_hash: hash_password(&admin_password)?,
            role: UserRole::Admin,
        })
        .await?;
    println!("✓ Admin account {}", admin_email);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

fn size_variant(sizes: &[(&str, i64)]) -> VariantInput {
    VariantInput {
        name: "Size".into(),
        options: sizes
            .iter()
            .map(|(name, price_cents)| VariantOptionInput {
                name: name.to_string(),
                price_cents: *price_cents,
            })
            .collect(),
    }
}
