//! User settings: the sanitized model, lenient JSON sanitization, and the import/export payload.

/// The [`Settings`](model::Settings) model and its conversions into engine parameters.
pub mod model;
/// Settings file envelope.
pub mod payload;
/// Lenient JSON to [`Settings`](model::Settings) conversion.
pub mod sanitize;
