//! Route definitions for the DocuFind API

mod claims;
mod contact;
mod payments;
mod premium;
mod removal;
mod reports;

pub use claims::claim_routes;
pub use contact::contact_routes;
pub use payments::payment_routes;
pub use premium::premium_routes;
pub use removal::removal_routes;
pub use reports::report_routes;
