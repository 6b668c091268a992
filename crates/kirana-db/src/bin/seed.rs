//! # Seed Data Generator
//!
//! Populates the database with a small development catalog: the standard
//! GST slabs and a shelf of typical kirana items.
//!
//! ## Usage
//! ```bash
//! # Default path ./kirana.db
//! cargo run -p kirana-db --bin seed
//!
//! # Specify database path
//! cargo run -p kirana-db --bin seed -- --db ./data/kirana.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;

use kirana_core::{Item, TaxRate};
use kirana_db::{Database, DbConfig};

/// (name, rate_bps, cess_bps) - the standard GST slabs.
const GST_SLABS: &[(&str, u32, u32)] = &[
    ("GST 0%", 0, 0),
    ("GST 5%", 500, 0),
    ("GST 12%", 1200, 0),
    ("GST 18%", 1800, 0),
    ("GST 28%", 2800, 0),
    ("GST 28% + cess 12%", 2800, 1200),
];

/// (name, barcode, mrp_paise, slab index into GST_SLABS)
const SHELF: &[(&str, &str, i64, usize)] = &[
    ("Parle-G Gold 1kg", "8901719104046", 12000, 1),
    ("Tata Salt 1kg", "8904043907016", 2800, 0),
    ("Aashirvaad Atta 5kg", "8901725133016", 28500, 1),
    ("Toor Dal loose (per kg)", "2000000000017", 15500, 0),
    ("Amul Butter 500g", "8901262010320", 27500, 2),
    ("Maggi Noodles 70g", "8901058000290", 1400, 2),
    ("Surf Excel 1kg", "8901030682827", 14000, 3),
    ("Colgate MaxFresh 150g", "8901314010322", 9500, 3),
    ("Thums Up 750ml", "8901764011104", 4500, 5),
    ("Basmati Rice loose (per kg)", "2000000000024", 9800, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path();
    println!("Seeding catalog into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();
    let now = Utc::now();

    let mut slab_ids = Vec::with_capacity(GST_SLABS.len());
    for (name, rate_bps, cess_bps) in GST_SLABS {
        let rate = TaxRate {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            rate_bps: *rate_bps,
            cess_bps: *cess_bps,
        };
        catalog.insert_tax_rate(&rate).await?;
        slab_ids.push(rate.id);
    }

    for (name, barcode, mrp_paise, slab) in SHELF {
        let tax_rate_id = if GST_SLABS[*slab].1 == 0 && GST_SLABS[*slab].2 == 0 {
            None
        } else {
            Some(slab_ids[*slab].clone())
        };
        let item = Item {
            id: Uuid::new_v4().to_string(),
            barcode: Some(barcode.to_string()),
            name: name.to_string(),
            mrp_paise: *mrp_paise,
            tax_rate_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        catalog.insert_item(&item).await?;
    }

    println!(
        "Seeded {} tax rates and {} items",
        GST_SLABS.len(),
        SHELF.len()
    );

    db.close().await;
    Ok(())
}

fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--db" {
            if let Some(path) = args.get(i + 1) {
                return path.clone();
            }
        }
    }
    "./kirana.db".to_string()
}
