pub mod chart;
pub mod instrument;
pub mod metrics;
pub mod request;
pub mod series;
pub mod state;
