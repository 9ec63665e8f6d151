//! # Customer Repository
//!
//! Collection operations for customer accounts, discount grids included.

use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::Collection;
use ricambi_core::{Customer, Money};

/// Repository for customer collection operations.
#[derive(Debug, Clone, Default)]
pub struct CustomerRepository {
    customers: Collection<Customer>,
}

impl CustomerRepository {
    pub fn new() -> Self {
        CustomerRepository {
            customers: Collection::new(),
        }
    }

    /// Inserts a new customer. Codes are unique.
    pub async fn insert(&self, customer: Customer) -> StoreResult<()> {
        let mut customers = self.customers.write().await;
        if customers.values().any(|c| c.code == customer.code) {
            return Err(StoreError::duplicate("code", &customer.code));
        }
        debug!(code = %customer.code, "inserting customer");
        customers.insert(customer.id, customer);
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Customer> {
        self.customers
            .get(id)
            .await
            .ok_or_else(|| StoreError::not_found("Customer", id))
    }

    pub async fn get_by_code(&self, code: &str) -> StoreResult<Customer> {
        let code = code.trim().to_uppercase();
        self.customers
            .find(|c| c.code == code)
            .await
            .ok_or_else(|| StoreError::not_found("Customer", code))
    }

    /// Replaces an existing customer.
    pub async fn update(&self, customer: Customer) -> StoreResult<()> {
        let mut customers = self.customers.write().await;
        if !customers.contains_key(&customer.id) {
            return Err(StoreError::not_found("Customer", customer.id));
        }
        debug!(code = %customer.code, "updating customer");
        customers.insert(customer.id, customer);
        Ok(())
    }

    /// Refreshes a customer's credit exposure from accounting figures,
    /// under the collection write lock.
    pub async fn update_exposure(
        &self,
        id: Uuid,
        unpaid_invoices: Money,
        open_orders: Money,
    ) -> StoreResult<Customer> {
        let mut customers = self.customers.write().await;
        let customer = customers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Customer", id))?;
        customer.update_exposure(unpaid_invoices, open_orders);
        debug!(
            code = %customer.code,
            exposure = %customer.credit.current_exposure,
            "exposure updated"
        );
        Ok(customer.clone())
    }

    pub async fn list_active(&self) -> Vec<Customer> {
        self.customers.filter(|c| c.is_active).await
    }

    /// Customers currently blocked from purchasing.
    pub async fn list_blocked(&self) -> Vec<Customer> {
        self.customers.filter(|c| c.credit.block_sales).await
    }
}
