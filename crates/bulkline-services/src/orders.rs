use std::sync::Arc;

use anyhow::Result;
use bulkline_db::Store;
use bulkline_types::models::{Order, OrderItem, OrderStatus};
use chrono::Utc;
use uuid::Uuid;

/// Orders book, local-store backed.
pub struct OrdersService {
    store: Arc<Store>,
}

impl OrdersService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn add(
        &self,
        customer_id: &str,
        customer_name: &str,
        customer_phone: &str,
        items: Vec<OrderItem>,
        notes: Option<String>,
    ) -> Result<Order> {
        let total = items.iter().map(|i| i.price * i.quantity as f64).sum();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            customer_name: customer_name.to_string(),
            customer_phone: customer_phone.to_string(),
            items,
            total,
            status: OrderStatus::Pending,
            order_date: Utc::now(),
            notes,
        };
        self.store.insert_order(&order)?;
        Ok(order)
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<Order>> {
        self.store.list_orders()
    }

    pub fn set_status(&self, id: &str, status: OrderStatus) -> Result<()> {
        self.store.set_order_status(id, status)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_order(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_derived_from_items() {
        let svc = OrdersService::new(Arc::new(Store::open_in_memory().unwrap()));
        let order = svc
            .add(
                "1",
                "Asha",
                "111",
                vec![
                    OrderItem { id: "i1".into(), name: "Beans".into(), quantity: 2, price: 450.0 },
                    OrderItem { id: "i2".into(), name: "Filter".into(), quantity: 1, price: 300.0 },
                ],
                None,
            )
            .unwrap();
        assert_eq!(order.total, 1200.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
