//! Masking of personally-identifying report fields
//!
//! Default listing and search responses never carry real names or document
//! numbers; the view adapters here build the masked and full public shapes
//! from the canonical stored record.

use super::model::{ContactView, DocumentReport, DocumentType, ReportKind, ReportView};

/// Mask a document number, keeping the first and last two characters.
/// Short values are masked entirely.
pub fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let mut out = String::new();
    out.extend(&chars[..2]);
    out.extend(std::iter::repeat('*').take(chars.len() - 4));
    out.extend(&chars[chars.len() - 2..]);
    out
}

/// Mask a personal name, keeping first/last initials.
///
/// "Jean Bosco" becomes "J**n B.", a single word keeps its first and last
/// letters with the middle starred out.
pub fn mask_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => String::new(),
        [only] => mask_word(only),
        [first, .., last] => {
            let last_initial = last.chars().next().map(String::from).unwrap_or_default();
            format!("{} {}.", mask_word(first), last_initial)
        }
    }
}

fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::new();
    if let Some(first) = chars.first() {
        out.push(*first);
    }
    out.extend(std::iter::repeat('*').take(chars.len().saturating_sub(2)));
    if chars.len() > 1 {
        out.push(chars[chars.len() - 1]);
    }
    out
}

fn base_view(report: &DocumentReport, document_type: DocumentType) -> ReportView {
    let mut view = ReportView {
        id: report.id,
        document_type,
        owner_name: None,
        finder_name: None,
        document_number: None,
        where_lost: None,
        where_found: None,
        when_lost: None,
        when_found: None,
        description: report.description.clone(),
        image: None,
        image_original: None,
        created_at: report.created_at,
        is_premium: None,
        premium_expires_at: None,
        contact: None,
    };
    match report.kind {
        ReportKind::Lost => {
            view.where_lost = report.location.clone();
            view.when_lost = report.reported_on;
        }
        ReportKind::Found => {
            view.where_found = report.location.clone();
            view.when_found = report.reported_on;
        }
    }
    view
}

/// Masked public shape, as served by list/search endpoints.
pub fn masked_view(
    report: &DocumentReport,
    document_type: DocumentType,
    now: chrono::DateTime<chrono::Utc>,
) -> ReportView {
    let mut view = base_view(report, document_type);

    let masked_name = report
        .reported_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(mask_name);
    match report.kind {
        ReportKind::Lost => view.owner_name = masked_name,
        ReportKind::Found => view.finder_name = masked_name,
    }
    view.document_number = report.document_number.as_deref().map(mask_string);

    // Blurred reference when one exists; clients blur client-side otherwise
    view.image = report.image_blurred.clone().or_else(|| report.image.clone());

    if report.kind == ReportKind::Lost {
        let active = report.premium_active(now);
        view.is_premium = Some(active);
        view.premium_expires_at = if active { report.premium_expires_at } else { None };
    }

    view
}

/// Full unmasked shape, for verified viewers. The contact block is only
/// attached when the caller has established the viewer's right to it.
pub fn full_view(
    report: &DocumentReport,
    document_type: DocumentType,
    contact: Option<ContactView>,
) -> ReportView {
    let mut view = base_view(report, document_type);

    let name = report.reported_name.clone();
    match report.kind {
        ReportKind::Lost => view.owner_name = name,
        ReportKind::Found => view.finder_name = name,
    }
    view.document_number = report.document_number.clone();
    view.image = report.image.clone();
    view.image_original = report.image.clone();

    if report.kind == ReportKind::Lost {
        view.is_premium = Some(report.is_premium);
        view.premium_expires_at = report.premium_expires_at;
    }

    view.contact = contact;
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn found_report() -> DocumentReport {
        DocumentReport {
            id: 42,
            kind: ReportKind::Found,
            document_type_id: 1,
            reported_name: Some("Jean Bosco".to_string()),
            document_number: Some("A1234567".to_string()),
            location: Some("Kigali".to_string()),
            reported_on: None,
            description: Some("Found near the bus park".to_string()),
            image: Some("found_docs/42.jpg".to_string()),
            image_blurred: Some("found_docs/blurred/42.jpg".to_string()),
            contact_id: 7,
            is_premium: false,
            premium_expires_at: None,
            premium_payment_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn dtype() -> DocumentType {
        DocumentType {
            id: 1,
            name: "National ID".to_string(),
        }
    }

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("A1234567"), "A1****67");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("x"), "****");
    }

    #[test]
    fn test_mask_name() {
        assert_eq!(mask_name("Jean Bosco"), "J**n B.");
        assert_eq!(mask_name("Alice"), "A***e");
        assert_eq!(mask_name("Al"), "Al");
        assert_eq!(mask_name("A"), "A");
        assert_eq!(mask_name(""), "");
    }

    #[test]
    fn test_masked_view_hides_identifying_fields() {
        let report = found_report();
        let view = masked_view(&report, dtype(), Utc::now());

        assert_eq!(view.finder_name.as_deref(), Some("J**n B."));
        assert_eq!(view.document_number.as_deref(), Some("A1****67"));
        assert!(view.owner_name.is_none(), "found views carry no owner_name");
        assert_eq!(view.image.as_deref(), Some("found_docs/blurred/42.jpg"));
        assert!(view.image_original.is_none());
        assert!(view.contact.is_none());
    }

    #[test]
    fn test_masked_view_falls_back_to_original_image() {
        let mut report = found_report();
        report.image_blurred = None;
        let view = masked_view(&report, dtype(), Utc::now());
        assert_eq!(view.image.as_deref(), Some("found_docs/42.jpg"));
    }

    #[test]
    fn test_masked_view_absent_fields_stay_null() {
        let mut report = found_report();
        report.reported_name = None;
        report.document_number = None;
        let view = masked_view(&report, dtype(), Utc::now());
        assert!(view.finder_name.is_none());
        assert!(view.document_number.is_none());

        // Renders as JSON null, never the string "undefined"
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["document_number"].is_null());
    }

    #[test]
    fn test_full_view_exposes_real_fields() {
        let report = found_report();
        let view = full_view(&report, dtype(), None);
        assert_eq!(view.finder_name.as_deref(), Some("Jean Bosco"));
        assert_eq!(view.document_number.as_deref(), Some("A1234567"));
        assert_eq!(view.image_original.as_deref(), Some("found_docs/42.jpg"));
        assert!(view.contact.is_none());
    }

    #[test]
    fn test_full_view_attaches_contact_only_when_given() {
        let report = found_report();
        let contact = ContactView {
            full_name: "Finder Person".to_string(),
            phone: "250788000111".to_string(),
            email: None,
        };
        let view = full_view(&report, dtype(), Some(contact));
        assert_eq!(view.contact.unwrap().full_name, "Finder Person");
    }

    #[test]
    fn test_lost_masked_view_reports_premium_state() {
        let now = Utc::now();
        let mut report = found_report();
        report.kind = ReportKind::Lost;
        report.is_premium = true;
        report.premium_expires_at = Some(now + chrono::Duration::days(5));
        report.premium_payment_id = Some(Uuid::new_v4());

        let view = masked_view(&report, dtype(), now);
        assert_eq!(view.is_premium, Some(true));
        assert!(view.premium_expires_at.is_some());
        assert_eq!(view.owner_name.as_deref(), Some("J**n B."));

        // Expired premium is reported as inactive
        report.premium_expires_at = Some(now - chrono::Duration::days(1));
        let view = masked_view(&report, dtype(), now);
        assert_eq!(view.is_premium, Some(false));
        assert!(view.premium_expires_at.is_none());
    }
}
