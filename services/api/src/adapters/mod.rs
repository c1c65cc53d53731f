pub mod db;
pub mod gateway_llm;
pub mod http_backend;
pub mod weather;

pub use db::DbAdapter;
pub use gateway_llm::GatewayAiAdapter;
pub use http_backend::HttpBackend;
pub use weather::BaselineWeatherAdapter;
