//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::ProductDirectory;
use crate::config::StorefrontConfig;
use crate::db::Stores;
use crate::payments::PaymentGateway;
use crate::services::cart::{CartCodec, InvalidCartKey};
use crate::services::orders::{OrderService, PendingOrders};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cart codec: {0}")]
    CartKey(#[from] InvalidCartKey),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, the catalog, the payment gateway and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn ProductDirectory>,
    stores: Stores,
    pending: PendingOrders,
    gateway: Arc<dyn PaymentGateway>,
    cart_codec: CartCodec,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Product directory
    /// * `stores` - Opened document stores
    /// * `gateway` - Payment gateway adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the cart signing key is rejected.
    pub fn new(
        config: StorefrontConfig,
        catalog: Arc<dyn ProductDirectory>,
        stores: Stores,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, StateError> {
        let cart_codec = CartCodec::new(&config.session_secret)?;
        let pending = PendingOrders::new(config.pending_order_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                stores,
                pending,
                gateway,
                cart_codec,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product directory.
    #[must_use]
    pub fn catalog(&self) -> &dyn ProductDirectory {
        self.inner.catalog.as_ref()
    }

    /// Get a reference to the document stores.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the pending order stage.
    #[must_use]
    pub fn pending(&self) -> &PendingOrders {
        &self.inner.pending
    }

    /// Get a reference to the payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the cart cookie codec.
    #[must_use]
    pub fn cart_codec(&self) -> &CartCodec {
        &self.inner.cart_codec
    }

    /// Order service bound to this state.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(
            self.stores(),
            self.catalog(),
            self.pending(),
            self.gateway(),
            &self.inner.config.razorpay.currency,
        )
    }
}
