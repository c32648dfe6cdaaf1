pub mod appointments;
pub mod customers;
pub mod inventory;
pub mod invoices;
pub mod pets;
