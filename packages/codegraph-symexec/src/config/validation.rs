//! Configuration validation

use super::error::ConfigResult;

// ═══════════════════════════════════════════════════════════════════════════
// Validatable Trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for validatable configuration objects
///
/// ```rust,ignore
/// fn build_walker<C: Validatable>(config: C) -> Result<Walker, ConfigError> {
///     config.validate()?;
///     // ...
/// }
/// ```
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Range helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Inclusive range check producing a [`super::ConfigError::Range`]
pub(crate) fn check_range<T>(field: &str, value: T, min: T, max: T, hint: &str) -> ConfigResult<()>
where
    T: PartialOrd + ToString + Copy,
{
    if value < min || value > max {
        return Err(super::ConfigError::range_with_hint(field, value, min, max, hint));
    }
    Ok(())
}
