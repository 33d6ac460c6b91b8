mod app;

pub use app::AppConfig;
