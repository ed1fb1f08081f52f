//! Orders and the remote order store.
//!
//! The order store is authoritative for order status. The core only reads
//! orders from its live feed and requests status transitions through
//! [`OrderStatusUpdater`].

mod http;
mod store;
mod types;

pub use http::HttpOrderStore;
pub use store::{OrderFeed, OrderSnapshot, OrderStatusUpdater, OrderStoreError};
pub use types::{
    status, ColorMode, Order, Orientation, PageSelection, PaperSize, PrintConfiguration,
    PrintSettings, Quality, UnknownValue,
};
