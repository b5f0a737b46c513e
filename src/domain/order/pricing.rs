use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::OrderError;
use super::model::{CartLine, PricedLine, PricedOrder, MAX_NOTES_LEN};
use crate::domain::catalog::CatalogLookup;
use crate::domain::customer::CustomerDirectory;

// ============================================================================
// Pricing & Cart Validator
// ============================================================================
//
// Turns a raw cart into priced, validated order lines. The unit price is the
// catalog's price at validation time, frozen into the result; the total is a
// decimal sum so no binary floating-point error accumulates across lines.
// Pure computation over collaborator reads; the caller persists the result.
//
// ============================================================================

pub async fn validate_and_price(
    directory: &dyn CustomerDirectory,
    catalog: &dyn CatalogLookup,
    customer_id: Uuid,
    cart: &[CartLine],
    notes: Option<String>,
) -> Result<PricedOrder, OrderError> {
    if !directory.exists(customer_id).await? {
        return Err(OrderError::CustomerNotFound(customer_id));
    }

    if cart.is_empty() {
        return Err(OrderError::Validation(
            "cart must contain at least one line".to_string(),
        ));
    }

    if let Some(notes) = &notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(OrderError::Validation(format!(
                "notes too long (maximum {MAX_NOTES_LEN} characters)"
            )));
        }
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut total = Decimal::ZERO;

    for cart_line in cart {
        if cart_line.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "quantity must be at least 1 for product {}",
                cart_line.product_id
            )));
        }

        let product = catalog
            .find_product(cart_line.product_id)
            .await?
            .ok_or(OrderError::ProductNotFound(cart_line.product_id))?;

        if !product.available {
            return Err(OrderError::ProductUnavailable(product.name));
        }

        let line = PricedLine {
            product_id: cart_line.product_id,
            quantity: cart_line.quantity,
            unit_price: product.price,
        };
        total += line.subtotal();
        lines.push(line);
    }

    Ok(PricedOrder {
        customer_id,
        lines,
        total,
        notes,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{InMemoryCatalog, Product};
    use crate::domain::customer::InMemoryDirectory;

    fn product(price: Decimal, available: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Burger".to_string(),
            price,
            available,
            image: None,
            category: Some("sandwiches".to_string()),
        }
    }

    fn fixtures() -> (InMemoryDirectory, InMemoryCatalog, Uuid) {
        let directory = InMemoryDirectory::new();
        let customer_id = Uuid::new_v4();
        directory.register(customer_id);
        (directory, InMemoryCatalog::new(), customer_id)
    }

    #[tokio::test]
    async fn test_prices_concrete_cart() {
        let (directory, catalog, customer_id) = fixtures();
        let p1 = product(Decimal::new(950, 2), true);
        let p1_id = p1.id;
        catalog.insert(p1);

        let cart = vec![CartLine {
            product_id: p1_id,
            quantity: 2,
        }];
        let priced = validate_and_price(&directory, &catalog, customer_id, &cart, None)
            .await
            .unwrap();

        assert_eq!(priced.total, Decimal::new(1900, 2));
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].unit_price, Decimal::new(950, 2));
        assert_eq!(priced.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_total_equals_sum_of_subtotals_for_large_carts() {
        let (directory, catalog, customer_id) = fixtures();

        // Carts of 1..=50 lines with awkward decimal prices.
        for line_count in [1usize, 7, 23, 50] {
            let mut cart = Vec::new();
            for i in 0..line_count {
                let item = product(Decimal::new(199 + i as i64 * 7, 2), true);
                cart.push(CartLine {
                    product_id: item.id,
                    quantity: (i % 5 + 1) as i32,
                });
                catalog.insert(item);
            }

            let priced = validate_and_price(&directory, &catalog, customer_id, &cart, None)
                .await
                .unwrap();
            let expected: Decimal = priced.lines.iter().map(PricedLine::subtotal).sum();
            assert_eq!(priced.total, expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_customer_is_rejected() {
        let (directory, catalog, _) = fixtures();
        let stranger = Uuid::new_v4();

        let err = validate_and_price(&directory, &catalog, stranger, &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::CustomerNotFound(id) if id == stranger));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (directory, catalog, customer_id) = fixtures();

        let err = validate_and_price(&directory, &catalog, customer_id, &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let (directory, catalog, customer_id) = fixtures();
        let missing = Uuid::new_v4();

        let cart = vec![CartLine {
            product_id: missing,
            quantity: 1,
        }];
        let err = validate_and_price(&directory, &catalog, customer_id, &cart, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_unavailable_product_is_rejected() {
        let (directory, catalog, customer_id) = fixtures();
        let item = product(Decimal::new(500, 2), false);
        let item_id = item.id;
        catalog.insert(item);

        let cart = vec![CartLine {
            product_id: item_id,
            quantity: 1,
        }];
        let err = validate_and_price(&directory, &catalog, customer_id, &cart, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductUnavailable(name) if name == "Burger"));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_rejected() {
        let (directory, catalog, customer_id) = fixtures();
        let item = product(Decimal::new(500, 2), true);
        let item_id = item.id;
        catalog.insert(item);

        for quantity in [0, -3] {
            let cart = vec![CartLine {
                product_id: item_id,
                quantity,
            }];
            let err = validate_and_price(&directory, &catalog, customer_id, &cart, None)
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_overlong_notes_are_rejected() {
        let (directory, catalog, customer_id) = fixtures();
        let item = product(Decimal::new(500, 2), true);
        let cart = vec![CartLine {
            product_id: item.id,
            quantity: 1,
        }];
        catalog.insert(item);

        let notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        let err = validate_and_price(&directory, &catalog, customer_id, &cart, notes)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }
}
