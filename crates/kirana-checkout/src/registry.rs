//! # Cart Registry
//!
//! In-memory store of live carts. Each cart lives behind its own async
//! mutex so mutations and settlement on one cart serialize, while
//! different carts proceed in parallel.
//!
//! ## Locking
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  CartRegistry                                                    │
//! │    std::sync::Mutex<HashMap<cart_id, Arc<tokio::Mutex<...>>>>   │
//! │         │ held only for map lookup/insert/remove (sync, short)  │
//! │         ▼                                                        │
//! │  Arc<tokio::sync::Mutex<CheckoutCart>>                          │
//! │         held across the whole operation, including the async    │
//! │         settlement transaction, so a concurrent settle() on the │
//! │         same cart waits and then observes Settled / gone.       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kirana_core::{Cart, TenderLedger};

// =============================================================================
// Checkout Cart
// =============================================================================

/// A cart together with the payments accumulated against it.
///
/// Tenders live beside the cart, not inside it: line pricing never
/// depends on how the customer intends to pay.
#[derive(Debug)]
pub struct CheckoutCart {
    pub cart: Cart,
    pub tenders: TenderLedger,
}

impl CheckoutCart {
    pub fn new(cart_id: impl Into<String>) -> Self {
        CheckoutCart {
            cart: Cart::new(cart_id),
            tenders: TenderLedger::new(),
        }
    }
}

// =============================================================================
// Cart Registry
// =============================================================================

/// Registry of all live carts, keyed by cart id.
#[derive(Debug, Default)]
pub struct CartRegistry {
    carts: Mutex<HashMap<String, Arc<tokio::sync::Mutex<CheckoutCart>>>>,
}

impl CartRegistry {
    pub fn new() -> Self {
        CartRegistry {
            carts: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a fresh cart under `cart_id`.
    pub fn create(&self, cart_id: &str) -> Arc<tokio::sync::Mutex<CheckoutCart>> {
        let cart = Arc::new(tokio::sync::Mutex::new(CheckoutCart::new(cart_id)));
        self.carts
            .lock()
            .expect("cart registry mutex poisoned")
            .insert(cart_id.to_string(), Arc::clone(&cart));
        cart
    }

    /// Looks up a live cart. `None` once it has been disposed.
    pub fn get(&self, cart_id: &str) -> Option<Arc<tokio::sync::Mutex<CheckoutCart>>> {
        self.carts
            .lock()
            .expect("cart registry mutex poisoned")
            .get(cart_id)
            .cloned()
    }

    /// Removes a cart from the registry.
    ///
    /// Callers still holding the `Arc` keep a usable handle; the cart is
    /// simply no longer reachable by id. Returns whether it was present.
    pub fn dispose(&self, cart_id: &str) -> bool {
        self.carts
            .lock()
            .expect("cart registry mutex poisoned")
            .remove(cart_id)
            .is_some()
    }

    /// Number of live carts.
    pub fn len(&self) -> usize {
        self.carts.lock().expect("cart registry mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
