//! One object per open window. Each view holds the shared store, reacts to
//! change notifications with an explicit policy and owns its reset timer.

pub mod customer;
pub mod staff;

pub use customer::{CustomerReaction, CustomerSnapshot, CustomerView};
pub use staff::{OrderBoard, ServiceState, SessionCheck, StaffDashboard, StaffReaction};
