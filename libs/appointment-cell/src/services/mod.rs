pub mod availability;
pub mod booking;
pub mod dashboard;
pub mod lifecycle;
pub mod listing;
pub mod window;

pub use availability::AvailabilityService;
pub use booking::{AppointmentBookingService, BookingChannel};
pub use dashboard::DashboardService;
pub use listing::AppointmentListingService;
