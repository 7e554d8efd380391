pub mod poller;
pub mod pricing;
pub mod session;
