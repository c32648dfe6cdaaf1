pub mod appointment;
pub mod customer;
pub mod inventory_record;
pub mod invoice;
pub mod invoice_pet;
pub mod invoice_product_line;
pub mod invoice_service_line;
pub mod pet;

pub use appointment::Entity as Appointment;
pub use customer::Entity as Customer;
pub use inventory_record::Entity as InventoryRecord;
pub use invoice::Entity as Invoice;
pub use invoice_pet::Entity as InvoicePet;
pub use invoice_product_line::Entity as InvoiceProductLine;
pub use invoice_service_line::Entity as InvoiceServiceLine;
pub use pet::Entity as Pet;
