// storefront/src/models/mod.rs

//! Domain data: catalog entries, orders and their lifecycle, the shopper cart.

pub mod cart;
pub mod notification;
pub mod order;
pub mod principal;
pub mod product;
pub mod status;

pub use cart::{Cart, CartError, CartItem};
pub use notification::PaymentNotification;
pub use order::{NewOrder, Order, OrderLine, ShippingInfo};
pub use principal::Principal;
pub use product::{Product, ProductOption};
pub use status::{GatewayStatus, InvalidTransition, OrderStatus, Transition, Trigger};
