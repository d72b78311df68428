// Payment gate: entitlement decision, credit accounting, and the advisory
// pre-check endpoint. Every paid operation goes through `credits::charge`.

pub mod checker;
pub mod credits;
pub mod handlers;
