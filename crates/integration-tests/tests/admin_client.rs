//! Integration tests for the admin client and the shared catalog cache.

#![allow(clippy::unwrap_used)]

use shopline_core::{OrderStatus, Price};
use shopline_integration_tests::FakeBackend;
use shopline_storefront::api::{
    AdminOrderQuery, AdminProductQuery, ApiError, ProductInput, ProductQuery,
};
use shopline_storefront::cart::CartStore;
use shopline_storefront::checkout::{Checkout, CheckoutForm};
use shopline_storefront::notify::RecordingNotifier;

fn form(phone: &str) -> CheckoutForm {
    CheckoutForm {
        customer_name: "Chen Hao".to_string(),
        customer_phone: phone.to_string(),
        customer_address: "22 Harbor Rd".to_string(),
        ..CheckoutForm::default()
    }
}

// =============================================================================
// Catalog Cache
// =============================================================================

#[tokio::test]
async fn test_listing_is_cached_until_admin_mutation() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);
    let mug = backend.add_product("Glazed Mug", "Kitchen", 1_250, 5);

    let first = client.list_products(&ProductQuery::all()).await.unwrap();
    let second = client.list_products(&ProductQuery::all()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.product_list_requests(), 1);

    admin.update_stock(mug, 0).await.unwrap();
    let third = client.list_products(&ProductQuery::all()).await.unwrap();
    assert_eq!(backend.product_list_requests(), 2);
    assert_eq!(third.products.first().unwrap().stock_quantity, 0);
}

#[tokio::test]
async fn test_product_detail_is_never_cached() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let mug = backend.add_product("Glazed Mug", "Kitchen", 1_250, 5);

    assert_eq!(client.get_product(mug).await.unwrap().stock_quantity, 5);
    backend.set_stock(mug, 2);
    assert_eq!(client.get_product(mug).await.unwrap().stock_quantity, 2);
}

#[tokio::test]
async fn test_listing_filters_and_categories() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    backend.add_product("Glazed Mug", "Kitchen", 1_250, 5);
    backend.add_product("Travel Mug", "Outdoor", 1_900, 5);
    let scarf = backend.add_product("Wool Scarf", "Apparel", 2_200, 5);
    backend.set_active(scarf, false);

    let mugs = client
        .list_products(&ProductQuery::search("MUG"))
        .await
        .unwrap();
    assert_eq!(mugs.total, 2);

    let kitchen = client
        .list_products(&ProductQuery::search("mug").in_category("Kitchen"))
        .await
        .unwrap();
    assert_eq!(kitchen.products.len(), 1);

    let categories = client.categories().await.unwrap();
    assert_eq!(categories, vec!["Kitchen".to_string(), "Outdoor".to_string()]);
}

// =============================================================================
// Product Administration
// =============================================================================

#[tokio::test]
async fn test_toggle_delists_and_relists() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);
    let scarf = backend.add_product("Wool Scarf", "Apparel", 2_200, 5);

    let delisted = admin.toggle_product_status(scarf).await.unwrap();
    assert!(!delisted.is_active);
    assert!(matches!(
        client.get_product(scarf).await,
        Err(ApiError::NotFound(_))
    ));

    let hidden = admin
        .list_products(&AdminProductQuery {
            is_active: Some(false),
            ..AdminProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(hidden.products.len(), 1);

    assert!(admin.toggle_product_status(scarf).await.unwrap().is_active);
    assert!(client.get_product(scarf).await.is_ok());
}

#[tokio::test]
async fn test_create_update_and_delete_product() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);

    let input = ProductInput {
        name: "Linen Apron".to_string(),
        category: "Kitchen".to_string(),
        price: Price::from_cents(3_150),
        description: Some("Stonewashed".to_string()),
        is_active: true,
        stock_quantity: 7,
    };
    let created = admin.create_product(&input).await.unwrap();
    assert_eq!(created.name, "Linen Apron");
    assert_eq!(created.price, Price::from_cents(3_150));

    let mut changed = ProductInput::from(&created);
    changed.stock_quantity = 3;
    let updated = admin.update_product(created.id, &changed).await.unwrap();
    assert_eq!(updated.stock_quantity, 3);
    assert_eq!(updated.description.as_deref(), Some("Stonewashed"));

    admin.delete_product(created.id).await.unwrap();
    assert!(backend.product(created.id).is_none());
    assert!(matches!(
        admin.delete_product(created.id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_dashboard_counts() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);
    backend.add_product("Glazed Mug", "Kitchen", 1_250, 20);
    let scarf = backend.add_product("Wool Scarf", "Apparel", 2_200, 2);
    let apron = backend.add_product("Linen Apron", "Kitchen", 3_150, 9);
    backend.set_active(apron, false);

    let stats = admin.dashboard().await.unwrap();
    assert_eq!(stats.active_products, 2);
    assert_eq!(stats.inactive_products, 1);
    assert_eq!(stats.low_stock_products.len(), 1);
    assert_eq!(stats.low_stock_products.first().unwrap().id, scarf);
    assert!(stats.status_stats.is_empty());
}

// =============================================================================
// Order Administration
// =============================================================================

#[tokio::test]
async fn test_status_transitions_and_filtering() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);
    let mug = backend.add_product("Glazed Mug", "Kitchen", 1_250, 10);
    let notifier = RecordingNotifier::new();

    let mut placed = Vec::new();
    for phone in ["0911000111", "0922000222"] {
        let store = CartStore::in_memory();
        store.add(mug, 1).unwrap();
        let order = Checkout::new(&store, &client, &notifier)
            .submit(&form(phone))
            .await
            .unwrap();
        placed.push(order.id);
    }

    let first = *placed.first().unwrap();
    let shipped = admin
        .update_order_status(first, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let pending = admin
        .list_orders(&AdminOrderQuery {
            status: Some(OrderStatus::Pending),
            ..AdminOrderQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending.first().unwrap().customer_phone, "0922000222");

    let by_name = admin
        .list_orders(&AdminOrderQuery {
            customer_name: Some("chen".to_string()),
            ..AdminOrderQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 2);
}

#[tokio::test]
async fn test_cancel_restores_stock_once() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);
    let mug = backend.add_product("Glazed Mug", "Kitchen", 1_250, 6);

    let store = CartStore::in_memory();
    store.add(mug, 4).unwrap();
    let notifier = RecordingNotifier::new();
    let order = Checkout::new(&store, &client, &notifier)
        .submit(&form("0911000111"))
        .await
        .unwrap();
    assert_eq!(backend.product(mug).unwrap().stock_quantity, 2);

    let cancelled = admin.cancel_order(order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(backend.product(mug).unwrap().stock_quantity, 6);

    let again = admin.cancel_order(order.id).await;
    assert!(matches!(again, Err(ApiError::Rejected { status: 400, .. })));
    assert_eq!(backend.product(mug).unwrap().stock_quantity, 6);
}

#[tokio::test]
async fn test_delivered_order_cannot_be_cancelled() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let admin = FakeBackend::admin(&client);
    let mug = backend.add_product("Glazed Mug", "Kitchen", 1_250, 6);

    let store = CartStore::in_memory();
    store.add(mug, 1).unwrap();
    let notifier = RecordingNotifier::new();
    let order = Checkout::new(&store, &client, &notifier)
        .submit(&form("0911000111"))
        .await
        .unwrap();

    admin
        .update_order_status(order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    let err = admin.cancel_order(order.id).await.unwrap_err();

    let ApiError::Rejected { message, .. } = err else {
        panic!("expected Rejected, got {err:?}");
    };
    assert_eq!(message, "Delivered orders cannot be cancelled");
}
