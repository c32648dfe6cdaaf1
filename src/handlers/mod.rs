use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        appointments::AppointmentService, customers::CustomerService, inventory::InventoryService,
        invoices::InvoiceService, pets::PetService,
    },
};
use std::sync::Arc;

pub mod appointments;
pub mod common;
pub mod customers;
pub mod inventory;
pub mod invoices;
pub mod pets;

pub use appointments::appointment_routes;
pub use customers::customer_routes;
pub use inventory::inventory_routes;
pub use invoices::invoice_routes;
pub use pets::pet_routes;

/// All domain services, wired once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub customers: CustomerService,
    pub pets: PetService,
    pub appointments: AppointmentService,
    pub inventory: Arc<InventoryService>,
    pub invoices: InvoiceService,
}

impl AppServices {
    /// Wires the service graph. Invoicing shares the inventory service so
    /// stock deductions run on the invoice transaction.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        appointment_slot_minutes: u32,
    ) -> Self {
        let inventory = Arc::new(InventoryService::new(db_pool.clone()));

        Self {
            customers: CustomerService::new(db_pool.clone(), event_sender.clone()),
            pets: PetService::new(db_pool.clone(), event_sender.clone()),
            appointments: AppointmentService::new(
                db_pool.clone(),
                event_sender.clone(),
                appointment_slot_minutes,
            ),
            invoices: InvoiceService::new(db_pool, inventory.clone(), event_sender),
            inventory,
        }
    }
}
