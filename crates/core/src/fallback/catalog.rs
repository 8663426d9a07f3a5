//! Fixed placeholder catalogs per resource family
//!
//! Status fields use persistence-layer codes so they pass through the same
//! translation as live data.

use backoffice_domain::constants::{
    FAMILY_INVOICES, FAMILY_PRODUCTS, FAMILY_PURCHASE_ORDERS, FAMILY_STOCK_MOVEMENTS,
    SYNTHETIC_MARKER_FIELD, SYNTHETIC_PDF_MARKER,
};
use backoffice_domain::ResourceFamily;
use serde_json::{json, Value};

/// Records for a family, every one carrying the synthetic marker
pub fn records_for(family: &ResourceFamily) -> Vec<Value> {
    let mut records = match family.as_str() {
        FAMILY_INVOICES => invoices(),
        FAMILY_PRODUCTS => products(),
        FAMILY_PURCHASE_ORDERS => purchase_orders(),
        FAMILY_STOCK_MOVEMENTS => stock_movements(),
        other => vec![json!({ "id": "synthetic-1", "family": other })],
    };
    for record in &mut records {
        if let Some(map) = record.as_object_mut() {
            map.insert(SYNTHETIC_MARKER_FIELD.to_string(), Value::Bool(true));
        }
    }
    records
}

fn invoices() -> Vec<Value> {
    vec![
        json!({
            "id": "SYN-INV-1",
            "number": "INV-0000-0001",
            "customer": "Offline Customer A",
            "issued_on": "2024-01-01",
            "total": 0.0,
            "currency": "EUR",
            "status": "ISSUED"
        }),
        json!({
            "id": "SYN-INV-2",
            "number": "INV-0000-0002",
            "customer": "Offline Customer B",
            "issued_on": "2024-01-02",
            "total": 0.0,
            "currency": "EUR",
            "status": "PAID"
        }),
        json!({
            "id": "SYN-INV-3",
            "number": "INV-0000-0003",
            "customer": "Offline Customer C",
            "issued_on": "2024-01-03",
            "total": 0.0,
            "currency": "EUR",
            "status": "DRAFT"
        }),
    ]
}

fn products() -> Vec<Value> {
    vec![
        json!({ "id": "SYN-PRD-1", "sku": "SYN-0001", "name": "Placeholder product 1", "price": 0.0, "stock": 0 }),
        json!({ "id": "SYN-PRD-2", "sku": "SYN-0002", "name": "Placeholder product 2", "price": 0.0, "stock": 0 }),
        json!({ "id": "SYN-PRD-3", "sku": "SYN-0003", "name": "Placeholder product 3", "price": 0.0, "stock": 0 }),
    ]
}

fn purchase_orders() -> Vec<Value> {
    vec![
        json!({
            "id": "SYN-PO-1",
            "number": "PO-0000-0001",
            "supplier": "Offline Supplier A",
            "total": 0.0,
            "status": "CREATED"
        }),
        json!({
            "id": "SYN-PO-2",
            "number": "PO-0000-0002",
            "supplier": "Offline Supplier B",
            "total": 0.0,
            "status": "APPROVED"
        }),
    ]
}

fn stock_movements() -> Vec<Value> {
    vec![
        json!({ "id": "SYN-MOV-1", "product_id": "SYN-PRD-1", "quantity": 0, "kind": "in" }),
        json!({ "id": "SYN-MOV-2", "product_id": "SYN-PRD-2", "quantity": 0, "kind": "out" }),
    ]
}

/// Minimal single-page PDF whose info dictionary carries the synthetic marker
pub fn placeholder_pdf() -> Vec<u8> {
    let stream = "BT /F1 24 Tf 72 720 Td (Placeholder - backend unavailable) Tj ET";
    let mut pdf = b"%PDF-1.4\n".to_vec();
    pdf.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    pdf.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    pdf.extend_from_slice(
        b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >> endobj\n",
    );
    pdf.extend_from_slice(
        format!("4 0 obj << /Length {} >> stream\n{stream}\nendstream endobj\n", stream.len())
            .as_bytes(),
    );
    pdf.extend_from_slice(b"5 0 obj << /Title (Placeholder document) ");
    pdf.extend_from_slice(SYNTHETIC_PDF_MARKER);
    pdf.extend_from_slice(b" >> endobj\n");
    pdf.extend_from_slice(b"trailer << /Root 1 0 R /Info 5 0 R >>\n%%EOF\n");
    pdf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_record_is_marked() {
        for family in [
            ResourceFamily::invoices(),
            ResourceFamily::products(),
            ResourceFamily::purchase_orders(),
            ResourceFamily::stock_movements(),
            ResourceFamily::new("suppliers"),
        ] {
            let records = records_for(&family);
            assert!(!records.is_empty());
            assert!(records.iter().all(|r| r[SYNTHETIC_MARKER_FIELD] == true), "{family}");
        }
    }

    #[test]
    fn test_unknown_family_gets_single_generic_record() {
        let records = records_for(&ResourceFamily::new("suppliers"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["family"], "suppliers");
    }

    #[test]
    fn test_placeholder_pdf_is_marked() {
        let pdf = placeholder_pdf();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(pdf.windows(SYNTHETIC_PDF_MARKER.len()).any(|w| w == SYNTHETIC_PDF_MARKER));
    }
}
