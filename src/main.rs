use std::sync::Arc;

use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use snackbar_orders::{
    Actor, CartLine, InMemoryCatalog, InMemoryDirectory, InMemoryOrderStore, OrderService,
    OrderStatus, OrderStore, PgOrderStore, Product,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,snackbar_orders=debug")),
        )
        .init();

    tracing::info!("🍔 Starting snackbar order lifecycle demo");

    // === 1. Pick the order store ===
    // DATABASE_URL selects Postgres; without it the demo runs in memory.
    let store: Arc<dyn OrderStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            tracing::info!("Connecting to Postgres...");
            let store = PgOrderStore::connect(&url).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set, using the in-memory store");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 2. Seed demo collaborators ===
    let catalog = Arc::new(InMemoryCatalog::new());
    let burger = Product {
        id: Uuid::new_v4(),
        name: "Cheeseburger".to_string(),
        price: Decimal::new(950, 2),
        available: true,
        image: Some("cheeseburger.png".to_string()),
        category: Some("sandwiches".to_string()),
    };
    let fries = Product {
        id: Uuid::new_v4(),
        name: "Fries".to_string(),
        price: Decimal::new(425, 2),
        available: true,
        image: None,
        category: Some("sides".to_string()),
    };
    catalog.insert(burger.clone());
    catalog.insert(fries.clone());

    let directory = Arc::new(InMemoryDirectory::new());
    let customer_id = Uuid::new_v4();
    directory.register(customer_id);

    let service = OrderService::new(store, catalog.clone(), directory.clone());

    // === 3. Walk an order through the full lifecycle ===
    let created = service
        .create_order(
            customer_id,
            vec![
                CartLine {
                    product_id: burger.id,
                    quantity: 2,
                },
                CartLine {
                    product_id: fries.id,
                    quantity: 1,
                },
            ],
            Some("no onions".to_string()),
        )
        .await?;
    tracing::info!("✅ Order created: {} (total {})", created.order.id, created.order.total);

    let attendant = Actor::attendant(Uuid::new_v4());
    for status in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ] {
        let updated = service
            .update_status(created.order.id, status, &attendant)
            .await?;
        tracing::info!("✅ Order {} moved to {}", updated.order.id, updated.order.status);
    }

    // === 4. A second order, cancelled by its customer ===
    let second = service
        .create_order(
            customer_id,
            vec![CartLine {
                product_id: fries.id,
                quantity: 3,
            }],
            None,
        )
        .await?;
    let cancelled = service.cancel_order(second.order.id, customer_id).await?;
    tracing::info!("✅ Order {} cancelled by its customer", cancelled.order.id);

    // === 5. Statistics ===
    let manager = Actor::manager(Uuid::new_v4());
    let stats = service.statistics(&manager).await?;
    tracing::info!(
        "📊 Statistics: {}",
        serde_json::to_string_pretty(&stats)?
    );

    tracing::info!("🎉 Demo complete!");

    Ok(())
}
