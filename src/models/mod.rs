//! Data models for Circula

pub mod borrow;
pub mod copy;
pub mod enums;
pub mod fine;
pub mod reservation;
pub mod title;

// Re-export commonly used types
pub use borrow::{BorrowDetails, BorrowRequest};
pub use copy::Copy;
pub use enums::{BorrowStatus, CopyStatus, FineStatus, ReservationStatus};
pub use fine::Fine;
pub use reservation::Reservation;
pub use title::Title;
