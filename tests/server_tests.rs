#![cfg(feature = "server")]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use nfe_bridge::bridge::*;
use nfe_bridge::core::*;
use nfe_bridge::frappe::{FrappeError, InvoiceWriteBack};
use nfe_bridge::nfeio::{IssuanceResponse, NfeIoError};
use nfe_bridge::server::{router, WebhookAuth};
use rust_decimal_macros::dec;
use tower::ServiceExt;

const SECRET: &str = "s3cret";
const HEADER: &str = "X-Webhook-Signature";

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

struct Source(HashMap<String, SourceRecord>);

impl SourceRecords for Source {
    async fn fetch_invoice(&self, id: &str) -> Result<SourceRecord, FrappeError> {
        self.0.get(id).cloned().ok_or_else(|| FrappeError::Api {
            status: 404,
            body: "not found".into(),
        })
    }

    async fn fetch_tax_template(&self, _name: &str) -> Result<TaxTemplate, FrappeError> {
        Ok(TaxTemplate::default())
    }

    async fn fetch_carrier(&self, _name: &str) -> Result<Carrier, FrappeError> {
        Ok(Carrier::default())
    }

    async fn write_back(&self, _id: &str, _result: &InvoiceWriteBack) -> Result<(), FrappeError> {
        Ok(())
    }
}

struct Dispatch;

impl FiscalDispatch for Dispatch {
    async fn dispatch(&self, _request: &InvoiceRequest) -> Result<IssuanceResponse, NfeIoError> {
        Ok(IssuanceResponse {
            id: "nfe-42".into(),
            status: "Issued".into(),
            ..Default::default()
        })
    }
}

fn app() -> axum::Router {
    let good = SourceRecord {
        name: "INV-1".into(),
        client_name: some("Maria"),
        client_id_number: some("12345678900"),
        city: some("São Paulo"),
        delivery_ibge: some("3550308"),
        delivery_state: some("SP"),
        operation_nature: some("Venda"),
        invoices_table: vec![SourceItem {
            item_name: some("Cadeira"),
            rate: Some(dec!(10)),
            quantity: Some(dec!(1)),
            ..Default::default()
        }],
        ..Default::default()
    };
    let mut bad = good.clone();
    bad.name = "INV-BAD".into();
    bad.client_id_number = some("123");

    let records = [good, bad]
        .into_iter()
        .map(|r| (r.name.clone(), r))
        .collect();
    let issuer = Arc::new(Issuer::new(Source(records), Dispatch, "SP"));
    router(issuer, WebhookAuth::new(SECRET, HEADER))
}

fn signed(body: &str) -> Request<Body> {
    Request::post("/api/v1/webhook/invoices/issue")
        .header("content-type", "application/json")
        .header(HEADER, sign(SECRET.as_bytes(), body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health() {
    let resp = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn signed_issue_succeeds() {
    let resp = app().oneshot(signed(r#"{"name":"INV-1"}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Invoice Issued");
    assert_eq!(body["nfe_id"], "nfe-42");
    assert_eq!(body["status"], "Issued");
}

#[tokio::test]
async fn missing_signature_is_unauthorized() {
    let req = Request::post("/api/v1/webhook/invoices/issue")
        .body(Body::from(r#"{"name":"INV-1"}"#))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signature_for_other_body_is_unauthorized() {
    let mut req = signed(r#"{"name":"INV-1"}"#);
    *req.body_mut() = Body::from(r#"{"name":"INV-2"}"#);
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_json_is_bad_request() {
    let resp = app().oneshot(signed("{not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assembly_error_is_unprocessable() {
    let resp = app().oneshot(signed(r#"{"name":"INV-BAD"}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "assembly_error");
}

#[tokio::test]
async fn unknown_invoice_is_bad_gateway() {
    let resp = app().oneshot(signed(r#"{"name":"INV-404"}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn nfeio_callback_needs_no_signature() {
    let req = Request::post("/api/v1/webhook/nfeio/response")
        .body(Body::from(r#"{"id":"nfe-42","status":"Issued","flowStatus":"Issued"}"#))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_secret_rejects_everything() {
    let issuer = Arc::new(Issuer::new(Source(HashMap::new()), Dispatch, "SP"));
    let app = router(issuer, WebhookAuth::new("", HEADER));
    let body = r#"{"name":"INV-1"}"#;
    let req = Request::post("/api/v1/webhook/invoices/issue")
        .header(HEADER, sign(b"", body.as_bytes()))
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
