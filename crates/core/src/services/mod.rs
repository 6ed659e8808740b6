pub mod chart_service;
pub mod metrics_service;
pub mod request_controller;
pub mod reveal_scheduler;
pub mod selection_store;
