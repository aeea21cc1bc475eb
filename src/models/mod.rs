pub mod booking;
pub mod guest;
pub mod payment;
pub mod review;

pub use booking::{Booking, BookingInput, BookingStatus, BookingWithGuest};
pub use guest::{Guest, GuestInput};
pub use payment::{Payment, PaymentInput, PaymentMethod};
pub use review::{Review, ReviewInput};
