pub mod categories;
pub mod customer;
pub mod orders;
pub mod products;
pub mod reports;
pub mod staff;
