pub mod accounts;
pub mod trade_service;
