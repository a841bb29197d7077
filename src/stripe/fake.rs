//! In-memory `StripeApi` for tests

use super::types::{BalanceTransaction, Charge, Customer, Invoice, InvoicePayment, Refund, TaxRate};
use super::{ApiError, Created, StripeApi};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeApi {
    pub balance_transactions: Vec<BalanceTransaction>,
    pub charges: Vec<Charge>,
    pub refunds: Vec<Refund>,
    pub customers: HashMap<String, Customer>,
    pub invoices: HashMap<String, Invoice>,
    pub tax_rates: HashMap<String, TaxRate>,
    /// payment intent id -> invoice id
    pub invoice_payments: HashMap<String, String>,
    /// Ids whose lookup fails with a server error
    pub failing: Vec<String>,
    pub fail_listing: bool,
    /// Answer invoice payment searches like an account without that endpoint
    pub invoice_payments_unrouted: bool,
    pub requests: RefCell<Vec<String>>,
}

impl FakeApi {
    fn record(&self, request: String) {
        self.requests.borrow_mut().push(request);
    }

    fn lookup<T>(&self, kind: &str, map: &HashMap<String, T>, id: &str) -> Result<T, ApiError>
    where
        T: Clone,
    {
        self.record(format!("{} {}", kind, id));
        let path = format!("/v1/{}/{}", kind, id);
        if self.failing.iter().any(|f| f == id) {
            return Err(ApiError::Status {
                path,
                status: 500,
                code: None,
                message: "internal error".to_string(),
            });
        }
        map.get(id).cloned().ok_or(ApiError::Status {
            path,
            status: 404,
            code: Some("resource_missing".to_string()),
            message: format!("No such object: '{}'", id),
        })
    }

    fn listing<T>(&self, kind: &str, items: &[T], created: Created) -> Result<Vec<T>, ApiError>
    where
        T: Clone,
    {
        self.record(format!("list {} {}..={}", kind, created.gte, created.lte));
        if self.fail_listing {
            return Err(ApiError::Transport {
                path: format!("/v1/{}", kind),
                message: "connection reset".to_string(),
            });
        }
        Ok(items.to_vec())
    }
}

impl StripeApi for FakeApi {
    fn list_balance_transactions(
        &self,
        created: Created,
    ) -> Result<Vec<BalanceTransaction>, ApiError> {
        let items: Vec<_> = self
            .balance_transactions
            .iter()
            .filter(|t| t.created >= created.gte && t.created <= created.lte)
            .cloned()
            .collect();
        self.listing("balance_transactions", &items, created)
    }

    fn list_charges(&self, created: Created) -> Result<Vec<Charge>, ApiError> {
        let items: Vec<_> = self
            .charges
            .iter()
            .filter(|c| c.created >= created.gte && c.created <= created.lte)
            .cloned()
            .collect();
        self.listing("charges", &items, created)
    }

    fn list_refunds(&self, created: Created) -> Result<Vec<Refund>, ApiError> {
        let items: Vec<_> = self
            .refunds
            .iter()
            .filter(|r| r.created >= created.gte && r.created <= created.lte)
            .cloned()
            .collect();
        self.listing("refunds", &items, created)
    }

    fn retrieve_balance_transaction(&self, id: &str) -> Result<BalanceTransaction, ApiError> {
        let by_id: HashMap<String, BalanceTransaction> = self
            .balance_transactions
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();
        self.lookup("balance_transactions", &by_id, id)
    }

    fn retrieve_customer(&self, id: &str) -> Result<Customer, ApiError> {
        self.lookup("customers", &self.customers, id)
    }

    fn retrieve_invoice(&self, id: &str) -> Result<Invoice, ApiError> {
        self.lookup("invoices", &self.invoices, id)
    }

    fn retrieve_tax_rate(&self, id: &str) -> Result<TaxRate, ApiError> {
        self.lookup("tax_rates", &self.tax_rates, id)
    }

    fn find_invoice_payment(
        &self,
        payment_intent: &str,
    ) -> Result<Option<InvoicePayment>, ApiError> {
        self.record(format!("invoice_payments {}", payment_intent));
        if self.invoice_payments_unrouted {
            return Err(ApiError::Status {
                path: "/v1/invoice_payments".to_string(),
                status: 404,
                code: None,
                message: "Unrecognized request URL (GET: /v1/invoice_payments)".to_string(),
            });
        }
        if self.failing.iter().any(|f| f == payment_intent) {
            return Err(ApiError::Transport {
                path: "/v1/invoice_payments".to_string(),
                message: "timed out".to_string(),
            });
        }
        Ok(self
            .invoice_payments
            .get(payment_intent)
            .map(|invoice| InvoicePayment {
                id: format!("inpay_{}", payment_intent),
                invoice: invoice.clone(),
            }))
    }
}
