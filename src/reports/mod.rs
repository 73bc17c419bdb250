//! Document report domain: lost/found listings, masking, search

pub mod masking;
pub mod model;
pub mod service;

pub use model::{
    ContactInfo, ContactView, CreateReportRequest, DocumentReport, DocumentType, ReportKind,
    ReportView, SearchQuery, StatsResponse,
};
pub use service::ReportService;
