pub mod lifecycle;
pub mod models;
pub mod placement;
pub mod repository;

pub use lifecycle::LifecycleEngine;
pub use models::{CartLine, Order, OrderItem, OrderStatus, PaymentStatus};
pub use placement::PlacementEngine;
pub use repository::{NewOrder, NewOrderLine, OrderStore};
