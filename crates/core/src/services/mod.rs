pub mod advisory_service;
pub mod ledger_service;
pub mod valuation;
