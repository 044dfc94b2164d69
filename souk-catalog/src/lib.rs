pub mod catalog;
pub mod product;
pub mod repository;
pub mod stock;

pub use catalog::CatalogService;
pub use product::{
    NewProduct, Product, ProductPatch, ProductStatus, ReviewVerdict, DEFAULT_LOW_STOCK_THRESHOLD,
};
pub use repository::{CatalogStore, ProductFilter};
pub use stock::{StockChange, StockService};
