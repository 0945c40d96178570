//! Print job fixtures shared by the integration tests

#![allow(dead_code)]

use label_print_agent::models::job::{JobId, Label, PrintJob};
use serde_json::{json, Value};

/// "%PDF-1.4" base64-encoded.
pub const PDF_BASE64: &str = "JVBERi0xLjQ=";

/// A job with one label per payload; `None` leaves the label without a document.
pub fn job(id: i64, payloads: &[Option<&str>]) -> PrintJob {
    PrintJob {
        id: JobId::Number(id),
        label_count: Some(payloads.len() as u32),
        created_at: None,
        labels: payloads
            .iter()
            .enumerate()
            .map(|(i, pdf)| Label {
                id: JobId::Number(id * 100 + i as i64),
                order_name: format!("#{}-{}", id, i + 1),
                pdf: pdf.map(str::to_string),
                tracking_number: Some(format!("GLS{:08}", id * 100 + i as i64)),
            })
            .collect(),
    }
}

/// The same job as the queue would serve it over the wire.
pub fn job_json(id: i64, payloads: &[Option<&str>]) -> Value {
    let labels: Vec<Value> = payloads
        .iter()
        .enumerate()
        .map(|(i, pdf)| {
            json!({
                "id": id * 100 + i as i64,
                "orderName": format!("#{}-{}", id, i + 1),
                "pdf": pdf,
                "trackingNumber": format!("GLS{:08}", id * 100 + i as i64),
            })
        })
        .collect();

    json!({
        "id": id,
        "labelCount": payloads.len(),
        "createdAt": "2026-10-19T08:30:00Z",
        "labels": labels,
    })
}
