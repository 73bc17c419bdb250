//! API handlers for the DocuFind backend

pub mod claims;
pub mod contact;
pub mod payments;
pub mod premium;
pub mod removal;
pub mod reports;

pub use claims::{start_claim, verify_claim};
pub use contact::submit_contact;
pub use payments::{payment_status, request_payment};
pub use premium::{premium_status, upgrade_premium};
pub use removal::{confirm_removal, request_removal};
pub use reports::{
    create_found_report, create_lost_report, get_report, get_stats, list_document_types,
    protected_image, search_found, search_lost, verify_ownership,
};
