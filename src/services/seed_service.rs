use std::sync::Arc;

use serde_json::{Map, Number, Value, json};

use crate::{
    error::{AppError, AppResult},
    models::{Item, Order, OrderStatus, User},
    state::AppState,
    store::{Context, PutOutcome, Record, batch_put},
};

/// Password clients send for the seeded `admin` user (a precomputed hash).
pub const ADMIN_SECRET: &str = "cac28395315913e6dbdd102679ab5876a1355fca8f34b74510de274ceaa225d8";
pub const CLERK_SECRET: &str = "932bc4806fd7a7a4957b33096e97d00f9994f30d81d3b8f6e3753045dde3f9c2";

fn profile(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn demo_users(state: &AppState) -> AppResult<Vec<User>> {
    Ok(vec![
        User {
            id: "admin".into(),
            password: state.credentials.prepare(ADMIN_SECRET)?,
            info: profile(json!({ "userId": "admin", "name": "Store Admin", "role": "admin" })),
        },
        User {
            id: "clerk".into(),
            password: state.credentials.prepare(CLERK_SECRET)?,
            info: profile(json!({ "userId": "clerk", "name": "Front Desk", "role": "staff" })),
        },
    ])
}

fn demo_items() -> Vec<Item> {
    let item = |id: &str, title: &str, price: u64, image: &str, description: &str| Item {
        id: id.into(),
        title: title.into(),
        price: price.into(),
        image: Some(image.into()),
        description: Some(description.into()),
    };
    vec![
        item("item-0001", "T-Shirt", 10, "images/t-shirt.png", "Cotton tee with the shop logo"),
        item("item-0002", "Hoodie", 35, "images/hoodie.png", "Warm zip hoodie"),
        item("item-0003", "Mug", 8, "images/mug.png", "Ceramic mug, 350 ml"),
    ]
}

fn demo_orders() -> Vec<Order> {
    vec![
        Order {
            id: "order-0001".into(),
            title: "T-Shirt".into(),
            price: Number::from(10u64),
            buyer_name: "Ada Lovelace".into(),
            buyer_address: "12 Analytical Row, London".into(),
            order_status: OrderStatus::Open,
        },
        Order {
            id: "order-0002".into(),
            title: "Mug".into(),
            price: Number::from(8u64),
            buyer_name: "Alan Turing".into(),
            buyer_address: "7 Bletchley Lane, Milton Keynes".into(),
            order_status: OrderStatus::Closed,
        },
    ]
}

/// The fixed demo data set. Ids are stable so reseeding overwrites in place.
pub fn seed_records(state: &AppState) -> AppResult<Vec<Record>> {
    let mut records = Vec::new();
    for user in demo_users(state)? {
        records.push(Record::from_model(Context::User, &user)?);
    }
    for item in demo_items() {
        records.push(Record::from_model(Context::Item, &item)?);
    }
    for order in demo_orders() {
        records.push(Record::from_model(Context::Order, &order)?);
    }
    Ok(records)
}

/// Writes the whole seed set concurrently and reports every write.
pub async fn seed_all(state: &AppState) -> AppResult<Vec<PutOutcome>> {
    let records = seed_records(state)?;
    Ok(batch_put(Arc::clone(&state.store), records).await)
}

pub async fn init(state: &AppState) -> AppResult<()> {
    let outcomes = seed_all(state).await?;
    let total = outcomes.len();
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    for outcome in outcomes.iter().filter(|o| !o.is_ok()) {
        if let Err(err) = &outcome.result {
            tracing::warn!(context = %outcome.context, id = %outcome.id, error = %err, "seed write failed");
        }
    }

    if failed > 0 {
        return Err(AppError::Seed { failed, total });
    }
    tracing::info!(total, "seed data written");
    Ok(())
}
