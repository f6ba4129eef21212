pub mod artist;
pub mod availability;
pub mod error;
pub mod genre;
pub mod search;
pub mod show;
pub mod validation;
pub mod venue;
