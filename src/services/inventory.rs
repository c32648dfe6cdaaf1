use crate::{
    db::DbPool,
    entities::inventory_record::{self, Entity as InventoryRecordEntity},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

/// Inventory ledger: per (branch, product) stock rows. Checkout deducts
/// through this service on the caller's transaction; restocking is an
/// external concern and has no endpoint here.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Looks up the stock row for a (branch, product) pair on the given
    /// connection, which may be a live transaction.
    pub async fn find_record<C: ConnectionTrait>(
        &self,
        conn: &C,
        branch_id: Uuid,
        product_id: Uuid,
    ) -> Result<inventory_record::Model, ServiceError> {
        InventoryRecordEntity::find()
            .filter(inventory_record::Column::BranchId.eq(branch_id))
            .filter(inventory_record::Column::ProductId.eq(product_id))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No inventory record for product {} at branch {}",
                    product_id, branch_id
                ))
            })
    }

    /// Current stock quantity for a (branch, product) pair.
    #[instrument(skip(self))]
    pub async fn get_stock(&self, branch_id: Uuid, product_id: Uuid) -> Result<i32, ServiceError> {
        let record = self
            .find_record(&*self.db_pool, branch_id, product_id)
            .await?;
        Ok(record.quantity_on_hand)
    }

    /// Deducts exactly `quantity` units from the pair's stock row.
    ///
    /// Must run on an open transaction so the decrement is discarded when the
    /// enclosing unit of work aborts. There is no clamping: a request that
    /// exceeds on-hand stock fails with `InsufficientStock` and the caller's
    /// transaction must roll back. Reads go through the same connection, so a
    /// caller deducting the same product twice sees its earlier deduction.
    ///
    /// Returns the remaining quantity after the deduction.
    pub async fn deduct<C: ConnectionTrait>(
        &self,
        conn: &C,
        branch_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<i32, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::InvalidInput(
                "Deduction quantity must be at least 1".to_string(),
            ));
        }

        let record = self.find_record(conn, branch_id, product_id).await?;

        if quantity > record.quantity_on_hand {
            return Err(ServiceError::InsufficientStock(format!(
                "Requested {} of product {} at branch {}, only {} on hand",
                quantity, product_id, branch_id, record.quantity_on_hand
            )));
        }

        let remaining = record.quantity_on_hand - quantity;
        let mut update: inventory_record::ActiveModel = record.into();
        update.quantity_on_hand = Set(remaining);
        update.update(conn).await.map_err(|e| {
            error!(error = %e, %branch_id, %product_id, "Failed to persist stock deduction");
            ServiceError::DatabaseError(e)
        })?;

        Ok(remaining)
    }

    /// Lists stock rows for a branch with pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_branch(
        &self,
        branch_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<inventory_record::Model>, u64), ServiceError> {
        let paginator = InventoryRecordEntity::find()
            .filter(inventory_record::Column::BranchId.eq(branch_id))
            .order_by_desc(inventory_record::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }
}
