//! PSP HTTP client and webhook signature verification (§4.4, §4.9).

pub mod client;
pub mod error;
pub mod signature;

pub use client::{InitializePaymentData, InitializePaymentRequest, InitializePaymentResponse, PaymentMetadata, PaystackClient};
pub use error::{PspError, PspResult};
