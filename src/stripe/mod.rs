//! Blocking client for the parts of the Stripe REST API the report reads

#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use crate::config::Config;
use serde::de::DeserializeOwned;
use std::time::Duration;
use types::{
    BalanceTransaction, Charge, Customer, ErrorBody, HasId, Invoice, InvoicePayment, List, Refund,
    TaxRate,
};

/// Largest page size the list endpoints accept
pub const PAGE_SIZE: u32 = 100;

/// Version the response types are written against, sent with every request
pub const STRIPE_API_VERSION: &str = "2025-03-31.basil";

const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{path}: HTTP {status}: {message}")]
    Status {
        path: String,
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("{path}: transport error: {message}")]
    Transport { path: String, message: String },
    #[error("{path}: invalid response: {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    /// The referenced object does not exist. A 404 for an unknown route is
    /// not a missing object.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Status { code: Some(code), .. } => code == "resource_missing",
            ApiError::Status {
                status: 404,
                message,
                ..
            } => !message.starts_with("Unrecognized request URL"),
            _ => false,
        }
    }
}

/// Inclusive `created` filter in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Created {
    pub gte: i64,
    pub lte: i64,
}

impl Created {
    fn params(&self) -> [(&'static str, String); 2] {
        [
            ("created[gte]", self.gte.to_string()),
            ("created[lte]", self.lte.to_string()),
        ]
    }
}

/// Lookups the report needs from the processor
pub trait StripeApi {
    /// Balance transactions with their `source` expanded
    fn list_balance_transactions(
        &self,
        created: Created,
    ) -> Result<Vec<BalanceTransaction>, ApiError>;
    /// Charges with their `balance_transaction` expanded
    fn list_charges(&self, created: Created) -> Result<Vec<Charge>, ApiError>;
    fn list_refunds(&self, created: Created) -> Result<Vec<Refund>, ApiError>;
    fn retrieve_balance_transaction(&self, id: &str) -> Result<BalanceTransaction, ApiError>;
    fn retrieve_customer(&self, id: &str) -> Result<Customer, ApiError>;
    fn retrieve_invoice(&self, id: &str) -> Result<Invoice, ApiError>;
    fn retrieve_tax_rate(&self, id: &str) -> Result<TaxRate, ApiError>;
    /// First invoice payment made through the given payment intent
    fn find_invoice_payment(
        &self,
        payment_intent: &str,
    ) -> Result<Option<InvoicePayment>, ApiError>;
}

pub struct Client {
    agent: ureq::Agent,
    api_base: String,
    authorization: String,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Client {
            agent,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            authorization: format!("Bearer {}", config.api_key),
        }
    }

    fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &self.authorization)
            .set("Stripe-Version", STRIPE_API_VERSION);
        for (key, value) in query {
            request = request.query(key, value);
        }
        log::trace!("GET {} {:?}", path, query);

        match request.call() {
            Ok(response) => response.into_json().map_err(|err| ApiError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            }),
            Err(ureq::Error::Status(status, response)) => {
                let detail = response.into_json::<ErrorBody>().ok().map(|body| body.error);
                Err(ApiError::Status {
                    path: path.to_string(),
                    status,
                    code: detail.as_ref().and_then(|d| d.code.clone()),
                    message: detail
                        .and_then(|d| d.message)
                        .unwrap_or_else(|| "no error message".to_string()),
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(ApiError::Transport {
                path: path.to_string(),
                message: transport.to_string(),
            }),
        }
    }

    fn list_all<T>(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned + HasId,
    {
        paginate(|cursor| {
            let mut query = params.to_vec();
            query.push(("limit", PAGE_SIZE.to_string()));
            if let Some(cursor) = cursor {
                query.push(("starting_after", cursor.to_string()));
            }
            self.get(path, &query)
        })
    }
}

impl StripeApi for Client {
    fn list_balance_transactions(
        &self,
        created: Created,
    ) -> Result<Vec<BalanceTransaction>, ApiError> {
        let mut params = created.params().to_vec();
        params.push(("expand[]", "data.source".to_string()));
        self.list_all("/v1/balance_transactions", &params)
    }

    fn list_charges(&self, created: Created) -> Result<Vec<Charge>, ApiError> {
        let mut params = created.params().to_vec();
        params.push(("expand[]", "data.balance_transaction".to_string()));
        self.list_all("/v1/charges", &params)
    }

    fn list_refunds(&self, created: Created) -> Result<Vec<Refund>, ApiError> {
        self.list_all("/v1/refunds", &created.params())
    }

    fn retrieve_balance_transaction(&self, id: &str) -> Result<BalanceTransaction, ApiError> {
        self.get(&format!("/v1/balance_transactions/{}", id), &[])
    }

    fn retrieve_customer(&self, id: &str) -> Result<Customer, ApiError> {
        self.get(&format!("/v1/customers/{}", id), &[])
    }

    fn retrieve_invoice(&self, id: &str) -> Result<Invoice, ApiError> {
        self.get(&format!("/v1/invoices/{}", id), &[])
    }

    fn retrieve_tax_rate(&self, id: &str) -> Result<TaxRate, ApiError> {
        self.get(&format!("/v1/tax_rates/{}", id), &[])
    }

    fn find_invoice_payment(
        &self,
        payment_intent: &str,
    ) -> Result<Option<InvoicePayment>, ApiError> {
        let query = [
            ("payment[payment_intent]", payment_intent.to_string()),
            ("payment[type]", "payment_intent".to_string()),
            ("limit", "1".to_string()),
        ];
        let page: List<InvoicePayment> = self.get("/v1/invoice_payments", &query)?;
        Ok(page.data.into_iter().next())
    }
}

/// Drain a cursor-paginated list. `fetch_page` receives the id of the last
/// item seen, `None` for the first page.
pub fn paginate<T, F>(mut fetch_page: F) -> Result<Vec<T>, ApiError>
where
    T: HasId,
    F: FnMut(Option<&str>) -> Result<List<T>, ApiError>,
{
    let mut items: Vec<T> = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = fetch_page(cursor.as_deref())?;
        let has_more = page.has_more;
        items.extend(page.data);
        log::debug!("fetched page, {} items so far", items.len());
        match items.last() {
            Some(last) if has_more => cursor = Some(last.id().to_string()),
            _ => break,
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn refund(id: &str) -> Refund {
        Refund {
            id: id.to_string(),
            amount: 100,
            currency: "eur".to_string(),
            created: 0,
        }
    }

    #[test]
    fn paginate_follows_cursor_until_exhausted() {
        let mut cursors = Vec::new();
        let items = paginate(|cursor| {
            cursors.push(cursor.map(str::to_string));
            Ok(match cursor {
                None => List {
                    data: vec![refund("re_1"), refund("re_2")],
                    has_more: true,
                },
                Some("re_2") => List {
                    data: vec![refund("re_3")],
                    has_more: true,
                },
                _ => List {
                    data: vec![],
                    has_more: false,
                },
            })
        })
        .unwrap();

        let ids: Vec<_> = items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["re_1", "re_2", "re_3"]);
        assert_eq!(
            cursors,
            vec![None, Some("re_2".to_string()), Some("re_3".to_string())]
        );
    }

    #[test]
    fn paginate_stops_on_empty_page_even_if_has_more() {
        let mut calls = 0;
        let items: Vec<Refund> = paginate(|_| {
            calls += 1;
            Ok(List {
                data: vec![],
                has_more: true,
            })
        })
        .unwrap();
        assert!(items.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn paginate_propagates_errors() {
        let result: Result<Vec<Refund>, _> = paginate(|_| {
            Err(ApiError::Transport {
                path: "/v1/refunds".to_string(),
                message: "connection reset".to_string(),
            })
        });
        assert!(result.is_err());
    }

    fn status(status: u16, code: Option<&str>, message: &str) -> ApiError {
        ApiError::Status {
            path: "/v1/invoices/in_1".to_string(),
            status,
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn not_found_detection() {
        let err = status(404, Some("resource_missing"), "No such invoice");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "/v1/invoices/in_1: HTTP 404: No such invoice");

        assert!(status(404, None, "No such invoice").is_not_found());
        assert!(!status(500, None, "internal error").is_not_found());
        assert!(!status(404, Some("url_invalid"), "No such invoice").is_not_found());
    }

    #[test]
    fn unknown_route_is_not_a_missing_object() {
        let err = status(404, None, "Unrecognized request URL (GET: /v1/invoice_payments)");
        assert!(!err.is_not_found());
    }

    /// Serve one canned HTTP response on a local port and hand back the raw request
    fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            concat!(
                "HTTP/1.1 {}\r\n",
                "Content-Type: application/json\r\n",
                "Content-Length: {}\r\n",
                "Connection: close\r\n\r\n{}",
            ),
            status_line,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (base, handle)
    }

    fn client(api_base: String) -> Client {
        Client::new(&Config {
            api_key: "sk_test_123".to_string(),
            api_base,
        })
    }

    #[test]
    fn requests_pin_the_api_version() {
        let (base, server) = serve_once("200 OK", r#"{"id":"cus_1","email":"jane@example.com"}"#);
        let customer = client(base).retrieve_customer("cus_1").unwrap();
        assert_eq!(customer.email.as_deref(), Some("jane@example.com"));

        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /v1/customers/cus_1 "));
        assert!(request.contains(&format!("stripe-version: {}", STRIPE_API_VERSION)));
        assert!(request.contains("authorization: bearer sk_test_123"));
    }

    #[test]
    fn error_body_is_decoded() {
        let body = r#"{"error":{"code":"resource_missing","message":"No such invoice: 'in_1'"}}"#;
        let (base, server) = serve_once("404 Not Found", body);
        let err = client(base).retrieve_invoice("in_1").unwrap_err();
        server.join().unwrap();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "/v1/invoices/in_1: HTTP 404: No such invoice: 'in_1'"
        );
    }
}
