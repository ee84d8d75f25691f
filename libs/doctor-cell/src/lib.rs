pub mod handlers;
pub mod router;
pub mod models;
pub mod services;
pub mod store;

pub use models::*;
pub use services::*;
pub use store::{DoctorStore, InMemoryDoctorStore, SupabaseDoctorStore};
pub use router::DoctorState;
