//! Uniqueness-constrained builders for common identifier kinds
//!
//! Each builder pairs a [`fabricate::UniqueBuilder`] with an exhaustion strategy for its value
//! kind:
//! - Email addresses escalate through separators and numeric suffixes and never run out
//! - Numeric codes sample a fixed `10^L` space and fail once it is spent
//! - Security numbers sample 10,000 serials per birth date and fail once a date is spent

pub mod email;
pub mod numeric_code;
pub mod security_number;
