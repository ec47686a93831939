pub mod app_router;
pub mod eval;
pub mod feed;

pub use app_router::AppRouter;
