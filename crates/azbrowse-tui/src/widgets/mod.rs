pub mod panels;
pub mod redact;
