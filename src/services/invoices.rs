use crate::{
    db::DbPool,
    entities::{
        invoice::{self, Entity as InvoiceEntity, PaymentStatus},
        invoice_pet,
        invoice_product_line::{self, Entity as InvoiceProductLineEntity},
        invoice_service_line::{self, Entity as InvoiceServiceLineEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::InventoryService,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Raw service line as submitted by the cashier client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineInput {
    pub service_id: Uuid,
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    #[serde(default)]
    pub pet_id: Option<Uuid>,
    /// Defaults to 1 when absent
    #[serde(default)]
    pub quantity: Option<i32>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
}

/// Raw product line. Quantity is required: there is no sensible default for
/// how many units left the shelf.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub branch_id: Uuid,
    /// `userId` accepted for older point-of-sale clients
    #[serde(alias = "userId")]
    pub customer_id: Uuid,
    pub staff_id: Uuid,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub pets: Vec<Uuid>,
    #[serde(default)]
    pub service_lines: Vec<ServiceLineInput>,
    #[serde(default)]
    pub product_lines: Vec<ProductLineInput>,
}

/// Normalized service line with its assigned 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftServiceLine {
    pub line_no: i32,
    pub service_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_amount: Decimal,
    pub discount_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftProductLine {
    pub line_no: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_amount: Decimal,
    pub discount_amount: Decimal,
}

/// Validated, normalized, not-yet-persisted invoice. Produced whole or not at
/// all: a failing input yields no partial draft.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub service_lines: Vec<DraftServiceLine>,
    pub product_lines: Vec<DraftProductLine>,
}

// Decimal arithmetic saturates nowhere: a quantity times a near-MAX unit
// price overflows, and a raw `*`/`+` would panic inside the request handler.
fn line_total(
    idx: usize,
    kind: &str,
    quantity: i32,
    unit_price: Decimal,
) -> Result<Decimal, ServiceError> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "{} line {}: amount out of range",
                kind,
                idx + 1
            ))
        })
}

fn accumulate(
    idx: usize,
    kind: &str,
    total: Decimal,
    amount: Decimal,
) -> Result<Decimal, ServiceError> {
    total.checked_add(amount).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "{} line {}: amount out of range",
            kind,
            idx + 1
        ))
    })
}

/// Validates and normalizes a raw invoice submission into a draft.
///
/// Pure computation: totals, per-type 1-based line numbering in submission
/// order, service-line quantity defaulting, and the discount bound
/// `total discount <= original amount`.
pub fn build_draft(request: &CreateInvoiceRequest) -> Result<InvoiceDraft, ServiceError> {
    if request.branch_id.is_nil()
        || request.customer_id.is_nil()
        || request.staff_id.is_nil()
        || request.payment_method.trim().is_empty()
    {
        return Err(ServiceError::ValidationError(
            "missing required fields".to_string(),
        ));
    }

    let header_discount = request.discount_amount.unwrap_or(Decimal::ZERO);
    if header_discount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "discount amount must not be negative".to_string(),
        ));
    }

    let mut original_amount = Decimal::ZERO;
    let mut total_discount = header_discount;

    let mut service_lines = Vec::with_capacity(request.service_lines.len());
    for (idx, line) in request.service_lines.iter().enumerate() {
        let quantity = line.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(ServiceError::ValidationError(format!(
                "service line {}: quantity must be at least 1",
                idx + 1
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "service line {}: unit price must not be negative",
                idx + 1
            )));
        }
        let discount = line.discount_amount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "service line {}: discount must not be negative",
                idx + 1
            )));
        }

        let line_amount = line_total(idx, "service", quantity, line.unit_price)?;
        original_amount = accumulate(idx, "service", original_amount, line_amount)?;
        total_discount = accumulate(idx, "service", total_discount, discount)?;

        service_lines.push(DraftServiceLine {
            line_no: (idx + 1) as i32,
            service_id: line.service_id,
            appointment_id: line.appointment_id,
            pet_id: line.pet_id,
            quantity,
            unit_price: line.unit_price,
            line_amount,
            discount_amount: discount,
        });
    }

    let mut product_lines = Vec::with_capacity(request.product_lines.len());
    for (idx, line) in request.product_lines.iter().enumerate() {
        if line.quantity < 1 {
            return Err(ServiceError::ValidationError(format!(
                "product line {}: quantity must be at least 1",
                idx + 1
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "product line {}: unit price must not be negative",
                idx + 1
            )));
        }
        let discount = line.discount_amount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "product line {}: discount must not be negative",
                idx + 1
            )));
        }

        let line_amount = line_total(idx, "product", line.quantity, line.unit_price)?;
        original_amount = accumulate(idx, "product", original_amount, line_amount)?;
        total_discount = accumulate(idx, "product", total_discount, discount)?;

        product_lines.push(DraftProductLine {
            line_no: (idx + 1) as i32,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_amount,
            discount_amount: discount,
        });
    }

    if total_discount > original_amount {
        return Err(ServiceError::ValidationError(
            "discount exceeds original amount".to_string(),
        ));
    }

    Ok(InvoiceDraft {
        original_amount,
        discount_amount: total_discount,
        final_amount: original_amount - total_discount,
        service_lines,
        product_lines,
    })
}

/// Fully loaded invoice, as returned by the read endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub customer_id: Uuid,
    pub staff_id: Uuid,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub pets: Vec<Uuid>,
    pub service_lines: Vec<invoice_service_line::Model>,
    pub product_lines: Vec<invoice_product_line::Model>,
}

/// Runs validated invoice drafts against persistence and the inventory
/// ledger inside one all-or-nothing transaction.
#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    inventory: Arc<InventoryService>,
    event_sender: Arc<EventSender>,
}

impl InvoiceService {
    pub fn new(
        db_pool: Arc<DbPool>,
        inventory: Arc<InventoryService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db_pool,
            inventory,
            event_sender,
        }
    }

    /// Creates an invoice with its lines, pet associations, and stock
    /// deductions as a single unit of work.
    ///
    /// Any failure (validation, unknown inventory pair, stock shortfall,
    /// storage error) rolls the whole transaction back; the caller observes
    /// one error and no partial invoice. Product lines are processed strictly
    /// in submission order so a later line for the same product sees the
    /// earlier line's deduction.
    #[instrument(skip(self, request), fields(branch_id = %request.branch_id, customer_id = %request.customer_id))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<Uuid, ServiceError> {
        let draft = build_draft(&request)?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let invoice_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for invoice creation");
            ServiceError::DatabaseError(e)
        })?;

        let header = invoice::ActiveModel {
            id: Set(invoice_id),
            branch_id: Set(request.branch_id),
            customer_id: Set(request.customer_id),
            staff_id: Set(request.staff_id),
            original_amount: Set(draft.original_amount),
            discount_amount: Set(draft.discount_amount),
            final_amount: Set(draft.final_amount),
            payment_method: Set(request.payment_method.clone()),
            payment_status: Set(request.payment_status),
            created_at: Set(now),
        };
        header.insert(&txn).await?;

        // Order-preserving, no dedup: a repeated pet id yields a repeated row
        for pet_id in &request.pets {
            let association = invoice_pet::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice_id),
                pet_id: Set(*pet_id),
                created_at: Set(now),
            };
            association.insert(&txn).await?;
        }

        for line in &draft.service_lines {
            let row = invoice_service_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice_id),
                line_no: Set(line.line_no),
                service_id: Set(line.service_id),
                appointment_id: Set(line.appointment_id),
                pet_id: Set(line.pet_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_amount: Set(line.line_amount),
                discount_amount: Set(line.discount_amount),
                created_at: Set(now),
            };
            row.insert(&txn).await?;
        }

        let mut deductions = Vec::with_capacity(draft.product_lines.len());
        for line in &draft.product_lines {
            // Check-and-decrement on the open transaction; a shortfall here
            // discards the header and every line already inserted above
            let remaining = self
                .inventory
                .deduct(&txn, request.branch_id, line.product_id, line.quantity)
                .await?;

            let row = invoice_product_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice_id),
                line_no: Set(line.line_no),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_amount: Set(line.line_amount),
                discount_amount: Set(line.discount_amount),
                created_at: Set(now),
            };
            row.insert(&txn).await?;

            deductions.push((line.product_id, line.quantity, remaining));
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, %invoice_id, "Failed to commit invoice transaction");
            ServiceError::DatabaseError(e)
        })?;

        // Events only after commit; they never gate the write
        for (product_id, quantity, remaining) in deductions {
            self.event_sender
                .send_or_log(Event::StockDeducted {
                    branch_id: request.branch_id,
                    product_id,
                    quantity,
                    remaining,
                })
                .await;
        }
        self.event_sender
            .send_or_log(Event::InvoiceCreated {
                invoice_id,
                branch_id: request.branch_id,
                final_amount: draft.final_amount,
            })
            .await;

        info!(%invoice_id, final_amount = %draft.final_amount, "Invoice created");
        Ok(invoice_id)
    }

    /// Loads an invoice with its pet list and lines, lines ordered by their
    /// per-type line number.
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<InvoiceDetails, ServiceError> {
        let db = &*self.db_pool;

        let header = InvoiceEntity::find_by_id(invoice_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", invoice_id)))?;

        let pets = invoice_pet::Entity::find()
            .filter(invoice_pet::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_pet::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.pet_id)
            .collect();

        let service_lines = InvoiceServiceLineEntity::find()
            .filter(invoice_service_line::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_service_line::Column::LineNo)
            .all(db)
            .await?;

        let product_lines = InvoiceProductLineEntity::find()
            .filter(invoice_product_line::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_product_line::Column::LineNo)
            .all(db)
            .await?;

        Ok(InvoiceDetails {
            id: header.id,
            branch_id: header.branch_id,
            customer_id: header.customer_id,
            staff_id: header.staff_id,
            original_amount: header.original_amount,
            discount_amount: header.discount_amount,
            final_amount: header.final_amount,
            payment_method: header.payment_method,
            payment_status: header.payment_status,
            created_at: header.created_at,
            pets,
            service_lines,
            product_lines,
        })
    }
}
