//! Simulated purchasing data for the signoff reference runtime.
//!
//! All data in this module is hardcoded and fictional. It stands in for the
//! ERP records a real deployment would load.

use serde_json::{json, Value};

use signoff_contracts::ids::SubjectRef;
use signoff_core::JsonSubject;

pub const PURCHASE_ORDER: &str = "purchase_order";
pub const TRAVEL_REQUEST: &str = "travel_request";

// ── Principals ────────────────────────────────────────────────────────────────

pub const MANAGER: &str = "u-manager";
pub const DEPUTY: &str = "u-deputy";
pub const IT_LEAD: &str = "u-it-lead";
pub const SECURITY: &str = "u-security";
pub const FINANCE_ANA: &str = "u-fin-ana";
pub const FINANCE_BEN: &str = "u-fin-ben";
pub const OUTSIDER: &str = "u-intern";

// ── Purchase orders ───────────────────────────────────────────────────────────

/// Look up a purchase order by id.
///
/// Known orders:
/// - po-1001: office supplies, ops, 840.00
/// - po-1002: server rack, it / hardware, 7 450.00
/// - po-1003: consulting retainer, legal, 24 000.00
/// - po-1004: monitors, it / peripherals, 12 900.00
///
/// Any other id yields an empty order with amount 0.
pub fn purchase_order_record(id: &str) -> Value {
    match id {
        "po-1001" => json!({
            "id": id,
            "title": "Office supplies restock",
            "department": "ops",
            "category": "supplies",
            "amount": 840.00,
            "currency": "EUR",
        }),
        "po-1002" => json!({
            "id": id,
            "title": "Server rack for the build farm",
            "department": "it",
            "category": "hardware",
            "amount": 7450.00,
            "currency": "EUR",
        }),
        "po-1003" => json!({
            "id": id,
            "title": "Consulting retainer Q3",
            "department": "legal",
            "category": "services",
            "amount": 24000.00,
            "currency": "EUR",
        }),
        "po-1004" => json!({
            "id": id,
            "title": "Monitors for the support floor",
            "department": "it",
            "category": "peripherals",
            "amount": 12900.00,
            "currency": "EUR",
        }),
        _ => json!({ "id": id, "amount": 0 }),
    }
}

/// A purchase order as an approval subject, with its vendor loaded as a
/// relation.
pub fn purchase_order(id: &str) -> JsonSubject {
    JsonSubject::new(SubjectRef::new(PURCHASE_ORDER, id), purchase_order_record(id))
        .with_relation("vendor", json!({ "name": "Nordlicht Supplies GmbH", "rating": "A" }))
}

pub fn purchase_order_ref(id: &str) -> SubjectRef {
    SubjectRef::new(PURCHASE_ORDER, id)
}

// ── Travel requests ───────────────────────────────────────────────────────────

pub fn travel_request(id: &str) -> JsonSubject {
    JsonSubject::new(
        SubjectRef::new(TRAVEL_REQUEST, id),
        json!({
            "id": id,
            "traveller": "u-it-lead",
            "destination": "Lisbon",
            "nights": 3,
        }),
    )
}

pub fn travel_request_ref(id: &str) -> SubjectRef {
    SubjectRef::new(TRAVEL_REQUEST, id)
}

// ── Webhook payloads ──────────────────────────────────────────────────────────

/// A supplier webhook notifying a price change on an order line.
pub fn price_change_payload() -> Value {
    json!({
        "event": "price-change",
        "order": {
            "id": "po-1002",
            "lines": [
                { "sku": "RACK-42U", "old_price": 6900.00, "new_price": 7450.00 }
            ],
            "delta_percent": 7.97
        }
    })
}
