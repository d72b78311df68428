pub mod document;
pub mod ln_payment;
pub mod resume;
pub mod user;
