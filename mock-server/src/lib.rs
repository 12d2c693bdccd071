//! In-memory emulation of the invoicing service.
//!
//! Mirrors the wire habits of the real API closely enough for client tests:
//! every request needs an `SFAPI` authorization header, payloads arrive as a
//! form field `data` holding JSON, scalars in responses are strings, filters
//! are `/key:value` path segments, and application errors come back as
//! HTTP 200 with `error: 1`.

#![recursion_limit = "256"]

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

const DEFAULT_DATE: &str = "2024-01-01";

const COUNTRIES: &[(i64, &str, &str, bool)] = &[
    (57, "Česká republika", "cz", true),
    (80, "Nemecko", "de", true),
    (191, "Slovensko", "sk", true),
    (230, "Ukrajina", "ua", false),
];

#[derive(Debug, Default)]
pub struct Store {
    next_client_id: i64,
    next_invoice_id: i64,
    next_item_id: i64,
    clients: BTreeMap<i64, Value>,
    invoices: BTreeMap<i64, StoredInvoice>,
    /// E-mails accepted by `/invoices/send`, in arrival order.
    pub sent_emails: Vec<Value>,
}

#[derive(Debug, Clone)]
struct StoredInvoice {
    client_id: i64,
    invoice: Value,
    items: Vec<Value>,
}

pub type Db = Arc<RwLock<Store>>;

/// Wire form of a failed call: `{error: 1, error_message}`.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Application-level rejection, reported with HTTP 200.
    fn rejected(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({"error": 1, "error_message": self.message})),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
pub struct DataForm {
    pub data: String,
}

pub fn app() -> Router {
    app_with_store(Arc::new(RwLock::new(Store::default())))
}

/// Router over a caller-owned store, so tests can inspect side effects.
pub fn app_with_store(db: Db) -> Router {
    Router::new()
        .route("/invoices/create", post(create_invoice))
        .route("/invoices/view/{file}", get(get_invoice))
        .route("/invoices/index.json", get(list_invoices))
        .route("/invoices/index.json/{*filters}", get(list_invoices_filtered))
        .route("/invoices/send", post(send_invoice_email))
        .route("/{lang}/invoices/pdf/{id}/{token}", get(invoice_pdf))
        .route("/clients/create", post(create_client))
        .route("/clients/view/{id}", get(get_client))
        .route("/countries", get(list_countries))
        .route("/countries/index", get(list_countries_detailed))
        .route("/countries/index/{filter}", get(list_countries_detailed))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Accept `SFAPI email=..&apikey=..&module=..[&company=..]`.
fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let unauthorized = || Failure::new(StatusCode::UNAUTHORIZED, "Unauthorized");
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;
    let credentials = value.strip_prefix("SFAPI ").ok_or_else(unauthorized)?;

    let pairs: BTreeMap<&str, &str> = credentials
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();
    let present = |key: &str| pairs.get(key).is_some_and(|v| !v.is_empty());
    if present("email") && present("apikey") && present("module") {
        Ok(())
    } else {
        tracing::debug!("rejecting malformed credentials");
        Err(unauthorized())
    }
}

fn decode(form: &DataForm) -> Result<Value, Failure> {
    serde_json::from_str(&form.data)
        .map_err(|e| Failure::new(StatusCode::BAD_REQUEST, format!("Invalid data: {e}")))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Copy the scalar fields of a request record as strings, the way the
/// service stores them.
fn stringly(record: &Value, skip: &[&str]) -> Map<String, Value> {
    record
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter(|(key, _)| !skip.contains(&key.as_str()))
                .filter_map(|(key, value)| text(value).map(|v| (key.clone(), Value::String(v))))
                .collect()
        })
        .unwrap_or_default()
}

impl Store {
    fn insert_client(&mut self, input: &Value) -> Value {
        self.next_client_id += 1;
        let id = self.next_client_id;
        let mut record = stringly(input, &["match_address", "update_addressbook"]);
        record.insert("id".into(), json!(id.to_string()));
        record.insert("created".into(), json!(format!("{DEFAULT_DATE} 00:00:00")));
        record.insert("modified".into(), Value::Null);
        let record = Value::Object(record);
        self.clients.insert(id, record.clone());
        record
    }

    fn build_item(&mut self, invoice_id: i64, input: &Value) -> Value {
        self.next_item_id += 1;
        let quantity = input.get("quantity").and_then(number).unwrap_or(1.0);
        let unit_price = input.get("unit_price").and_then(number).unwrap_or(0.0);
        let tax = input.get("tax").and_then(number).unwrap_or(0.0);
        let discount = input.get("discount").and_then(number).unwrap_or(0.0);

        let unit_price_discount = unit_price * (1.0 - discount / 100.0);
        let unit_price_vat = unit_price_discount * (1.0 + tax / 100.0);
        let unit_price_vat_no_discount = unit_price * (1.0 + tax / 100.0);
        let item_price = unit_price_discount * quantity;
        let item_price_vat = unit_price_vat * quantity;
        let discount_no_vat = unit_price - unit_price_discount;
        let discount_with_vat = unit_price_vat_no_discount - unit_price_vat;

        let mut record = stringly(input, &["load_data_from_stock", "use_document_currency"]);
        let computed = json!({
            "id": self.next_item_id.to_string(),
            "invoice_id": invoice_id.to_string(),
            "quantity": quantity.to_string(),
            "unit_price": money(unit_price),
            "tax": tax.to_string(),
            "discount": discount.to_string(),
            "discount_no_vat": money(discount_no_vat),
            "discount_no_vat_total": money(discount_no_vat * quantity),
            "discount_with_vat": money(discount_with_vat),
            "discount_with_vat_total": money(discount_with_vat * quantity),
            "item_price": money(item_price),
            "item_price_no_discount": money(unit_price * quantity),
            "item_price_vat": money(item_price_vat),
            "item_price_vat_check": money(item_price_vat),
            "item_price_vat_no_discount": money(unit_price_vat_no_discount * quantity),
            "unit_price_discount": money(unit_price_discount),
            "unit_price_vat": money(unit_price_vat),
            "unit_price_vat_no_discount": money(unit_price_vat_no_discount),
            "stock_item_id": input.get("stock_item_id").and_then(text),
            "tax_deposit": null,
            "user_id": "1",
            "user_profile_id": "1",
        });
        if let Value::Object(computed) = computed {
            record.extend(computed);
        }
        Value::Object(record)
    }

    fn insert_invoice(&mut self, client_id: i64, client: &Value, header: &Value, items: &[Value]) -> i64 {
        self.next_invoice_id += 1;
        let id = self.next_invoice_id;
        let items: Vec<Value> = items.iter().map(|item| self.build_item(id, item)).collect();

        let sum = |field: &str| -> f64 { items.iter().filter_map(|i| i.get(field).and_then(number)).sum() };
        let amount = sum("item_price_vat");
        let base = sum("item_price");

        let field = |name: &str| header.get(name).and_then(text);
        let created = field("created").unwrap_or_else(|| DEFAULT_DATE.to_string());
        let already_paid = header.get("already_paid").and_then(text).as_deref() == Some("1");
        let paid = if already_paid { amount } else { 0.0 };
        let paydate = already_paid.then(|| created.clone());
        let status = if already_paid { "3" } else { "1" };

        let mut invoice = match json!({
            "id": id.to_string(),
            "accounting_date": created,
            "amount": money(amount),
            "amount_paid": money(paid),
            "client_data": client.to_string(),
            "client_id": client_id.to_string(),
            "comment": field("comment").unwrap_or_default(),
            "constant": field("constant").unwrap_or_default(),
            "country_exchange_rate": "1",
            "created": format!("{created} 00:00:00"),
            "delivery": field("delivery").unwrap_or_else(|| created.clone()),
            "delivery_type": field("delivery_type"),
            "demo": "0",
            "deposit": money(0.0),
            "discount": field("discount").unwrap_or_else(|| "0".to_string()),
            "due": field("due").unwrap_or_else(|| created.clone()),
            "estimate_id": field("estimate_id"),
            "exchange_rate": "1.0000",
            "flag": "issued",
            "header_comment": field("header_comment"),
            "home_currency": "EUR",
            "import_id": null,
            "import_parent_id": null,
            "import_type": null,
            "internal_comment": field("internal_comment"),
            "invoice_currency": field("invoice_currency").unwrap_or_else(|| "EUR".to_string()),
            "invoice_no": format!("2024{id:04}"),
            "invoice_no_formatted": format!("2024{id:04}"),
            "invoice_no_formatted_length": "8",
            "invoice_no_formatted_raw": format!("2024{id:04}"),
        }) {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        let reference = json!({
            "issued_by": field("issued_by"),
            "items_name": field("name"),
            "lang": "slo",
            "mask": "YYYYNNNN",
            "modified": format!("{created} 00:00:00"),
            "my_data": r#"{"company_name":"Mock Company s.r.o."}"#,
            "name": field("name"),
            "order_no": field("order_no"),
            "paid": money(paid),
            "parent_id": field("parent_id"),
            "paydate": paydate,
            "payment_type": field("payment_type"),
            "proforma_id": null,
            "rounding": field("rounding").unwrap_or_else(|| "item_ext".to_string()),
            "sequence_id": field("sequence_id").unwrap_or_else(|| "1".to_string()),
            "show_items_with_dph": "1",
            "show_special_vat": "0",
            "special_vat_scheme": null,
            "specific": field("specific"),
            "status": status,
            "summary_invoice": null,
            "tags": null,
            "tax_document": field("tax_document").unwrap_or_else(|| "0".to_string()),
            "taxdate": created,
            "token": format!("tok{id:06}"),
            "type": field("type").unwrap_or_else(|| "regular".to_string()),
            "user_id": "1",
            "user_profile_id": "1",
            "variable": format!("2024{id:04}"),
            "variable_raw": format!("2024{id:04}"),
            "vat": money(amount - base),
            "vat_transfer": field("vat_transfer"),
        });
        if let Value::Object(reference) = reference {
            invoice.extend(reference);
        }

        self.invoices.insert(
            id,
            StoredInvoice {
                client_id,
                invoice: Value::Object(invoice),
                items,
            },
        );
        id
    }

    fn document(&self, id: i64) -> Option<Value> {
        let stored = self.invoices.get(&id)?;
        Some(json!({
            "Client": self.clients.get(&stored.client_id),
            "Invoice": stored.invoice,
            "InvoiceItem": stored.items,
        }))
    }
}

async fn create_invoice(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<DataForm>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let data = decode(&form)?;

    let client = &data["Client"];
    if client.get("name").and_then(text).filter(|n| !n.is_empty()).is_none() {
        return Err(Failure::rejected("Client name is required"));
    }
    let items = data["InvoiceItem"].as_array().cloned().unwrap_or_default();

    let mut store = db.write().await;
    let client_record = store.insert_client(client);
    let client_id = store.next_client_id;
    let id = store.insert_invoice(client_id, &client_record, &data["Invoice"], &items);
    tracing::info!(invoice_id = id, items = items.len(), "invoice created");

    Ok(Json(json!({
        "error": 0,
        "message": "Invoice created",
        "data": store.document(id),
    })))
}

async fn get_invoice(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(file): Path<String>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let not_found = || Failure::new(StatusCode::NOT_FOUND, "Invoice not found");
    let id: i64 = file
        .strip_suffix(".json")
        .unwrap_or(&file)
        .parse()
        .map_err(|_| not_found())?;
    db.read().await.document(id).map(Json).ok_or_else(not_found)
}

async fn list_invoices(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    Ok(Json(list(&db, "").await))
}

async fn list_invoices_filtered(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(filters): Path<String>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    Ok(Json(list(&db, &filters).await))
}

/// Parse `key:value/key:value` segments.
fn parse_filters(raw: &str) -> BTreeMap<String, String> {
    raw.split('/')
        .filter_map(|segment| segment.split_once(':'))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn list(db: &Db, raw_filters: &str) -> Value {
    let filters = parse_filters(raw_filters);
    let store = db.read().await;

    let matches = |stored: &StoredInvoice| {
        let field = |name: &str| stored.invoice.get(name).and_then(text);
        filters.get("client_id").is_none_or(|v| *v == stored.client_id.to_string())
            && filters.get("status").is_none_or(|v| Some(v.clone()) == field("status"))
            && filters.get("type").is_none_or(|v| Some(v.clone()) == field("type"))
    };
    let documents: Vec<Value> = store
        .invoices
        .iter()
        .filter(|(_, stored)| matches(*stored))
        .filter_map(|(id, _)| store.document(*id))
        .collect();

    let per_page: usize = filters
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(100);
    let page: usize = filters
        .get("page")
        .and_then(|v| v.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);
    let item_count = documents.len();
    let page_items: Vec<Value> = documents
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    if filters.get("listinfo").map(String::as_str) == Some("1") {
        json!({
            "itemCount": item_count,
            "pageCount": item_count.div_ceil(per_page),
            "perPage": per_page.to_string(),
            "page": page,
            "items": page_items,
        })
    } else {
        Value::Array(page_items)
    }
}

async fn send_invoice_email(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<DataForm>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let data = decode(&form)?;
    let email = &data["Email"];

    let id = email
        .get("invoice_id")
        .and_then(number)
        .ok_or_else(|| Failure::rejected("invoice_id is required"))? as i64;
    if email.get("to").and_then(text).filter(|to| !to.is_empty()).is_none() {
        return Err(Failure::rejected("Recipient is required"));
    }

    let mut store = db.write().await;
    let stored = store
        .invoices
        .get_mut(&id)
        .ok_or_else(|| Failure::rejected("Invoice not found"))?;
    stored.invoice["flag"] = json!("sent");
    store.sent_emails.push(email.clone());
    tracing::info!(invoice_id = id, "invoice e-mailed");

    Ok(Json(json!({
        "error": 0,
        "message": "Email was sent",
        "data": store.document(id),
    })))
}

async fn invoice_pdf(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((lang, id, token)): Path<(String, i64, String)>,
) -> Result<Response, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    let stored = store
        .invoices
        .get(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Invoice not found"))?;

    let expected = stored.invoice.get("token").and_then(text);
    if token.strip_prefix("token:").map(str::to_string) != expected {
        return Err(Failure::new(StatusCode::FORBIDDEN, "Invalid token"));
    }

    let body = format!("%PDF-1.4\n% invoice {id} ({lang})\n%%EOF\n").into_bytes();
    Ok(([(header::CONTENT_TYPE, "application/pdf")], body).into_response())
}

async fn create_client(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<DataForm>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let data = decode(&form)?;
    let client = &data["Client"];
    if client.get("name").and_then(text).filter(|n| !n.is_empty()).is_none() {
        return Err(Failure::rejected("Client name is required"));
    }

    let record = db.write().await.insert_client(client);
    Ok(Json(json!({"error": 0, "data": {"Client": record}})))
}

async fn get_client(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    let record = store
        .clients
        .get(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Client not found"))?;
    Ok(Json(json!({"Client": record})))
}

async fn list_countries(headers: HeaderMap) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let names: Map<String, Value> = COUNTRIES
        .iter()
        .map(|(id, name, _, _)| (id.to_string(), json!(name)))
        .collect();
    Ok(Json(Value::Object(names)))
}

async fn list_countries_detailed(headers: HeaderMap) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    let countries: Vec<Value> = COUNTRIES
        .iter()
        .map(|(id, name, iso, eu)| {
            let eu = if *eu { "1" } else { "0" };
            json!({"Country": {"id": id.to_string(), "name": name, "iso": iso, "eu": eu}})
        })
        .collect();
    Ok(Json(Value::Array(countries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn authorize_accepts_full_credentials() {
        assert!(authorize(&headers("SFAPI email=a@b.c&apikey=k&module=m")).is_ok());
        assert!(authorize(&headers("SFAPI email=a@b.c&apikey=k&module=m&company=1")).is_ok());
    }

    #[test]
    fn authorize_rejects_incomplete_credentials() {
        assert!(authorize(&HeaderMap::new()).is_err());
        assert!(authorize(&headers("Bearer abc")).is_err());
        assert!(authorize(&headers("SFAPI email=a@b.c&module=m")).is_err());
        assert!(authorize(&headers("SFAPI email=&apikey=k&module=m")).is_err());
    }

    #[test]
    fn parse_filters_splits_segments() {
        let filters = parse_filters("listinfo:1/page:2/bogus");
        assert_eq!(filters.get("listinfo").map(String::as_str), Some("1"));
        assert_eq!(filters.get("page").map(String::as_str), Some("2"));
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn items_are_priced_with_tax() {
        let mut store = Store::default();
        let item = store.build_item(1, &json!({"name": "Hours", "quantity": "2", "unit_price": 10.0, "tax": "20"}));
        assert_eq!(item["item_price"], "20.00");
        assert_eq!(item["item_price_vat"], "24.00");
        assert_eq!(item["unit_price_vat"], "12.00");
        assert_eq!(item["name"], "Hours");
    }

    #[test]
    fn stored_invoice_carries_the_full_record() {
        let mut store = Store::default();
        let header = json!({"name": "Consulting", "created": "2024-03-01", "already_paid": "1"});
        let items = [json!({"name": "Hours", "quantity": "1", "unit_price": "100", "tax": "20"})];
        let id = store.insert_invoice(7, &json!({"name": "Acme"}), &header, &items);

        let invoice = &store.invoices[&id].invoice;
        assert_eq!(invoice.as_object().unwrap().len(), 62);
        assert_eq!(invoice["id"], "1");
        assert_eq!(invoice["amount"], "120.00");
        assert_eq!(invoice["invoice_no_formatted_raw"], "20240001");
        assert_eq!(invoice["paydate"], "2024-03-01");
        assert_eq!(invoice["status"], "3");
        assert_eq!(invoice["show_items_with_dph"], "1");
        assert_eq!(invoice["show_special_vat"], "0");
        assert_eq!(invoice["token"], "tok000001");
        assert_eq!(invoice["vat"], "20.00");
    }

    #[test]
    fn stringly_drops_flags_and_stringifies_numbers() {
        let record = stringly(&json!({"name": "Acme", "country_id": 191, "match_address": "1"}), &["match_address"]);
        assert_eq!(record.get("country_id"), Some(&json!("191")));
        assert!(record.get("match_address").is_none());
    }
}
