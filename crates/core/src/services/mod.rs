pub mod dedup_service;
pub mod holdings_service;
