//! Email addresses and the cleaning of free-text address fields

mod sanitizer;
mod serde;
mod types;

pub use self::{
    sanitizer::{AddressSanitizer, DEFAULT_DELIMITERS},
    types::{Address, AddressError},
};
