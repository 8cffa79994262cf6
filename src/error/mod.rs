mod pushwoosh_error;

pub use pushwoosh_error::{PushwooshError, PushwooshResult};
