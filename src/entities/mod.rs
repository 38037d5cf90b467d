//! Entity type definitions

pub mod customer;
pub mod functionality;
pub mod quote;
pub mod repair;

pub use customer::Customer;
pub use functionality::{FunctionalityTest, TestItem, TestResult};
pub use quote::{Quote, RepairPart};
pub use repair::{DeviceType, EvaluationEntry, Repair, RepairField, RepairStatus, NO_TECHNICIAN};
