//! Session duration checks around sts:AssumeRole.
//!
//! The role's maximum session duration may cap the granted lifetime below the requested
//! one without an error, so the returned expiration is compared against the request.

pub const MIN_DURATION_SECONDS: i64 = 1;
pub const MAX_DURATION_SECONDS: i64 = 43200;
pub const DEFAULT_DURATION_SECONDS: i64 = 3600;

/// Allowed skew between the requested duration and the observed remaining lifetime.
pub const EXPIRATION_TOLERANCE_SECONDS: i64 = 5;

pub fn validate_duration(duration_seconds: i64) -> Result<(), crate::error::Error> {
    if !(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&duration_seconds) {
        return Err(crate::error::Error::ValidationError(format!(
            "--duration cannot be longer than 12 hours ({MAX_DURATION_SECONDS} seconds) or less than {MIN_DURATION_SECONDS} second (given {duration_seconds})"
        )));
    }
    Ok(())
}

pub fn verify_granted(
    requested_seconds: i64,
    credentials: &crate::client::Credentials,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), crate::error::Error> {
    let granted = credentials.remaining_seconds(now);
    if granted < requested_seconds - EXPIRATION_TOLERANCE_SECONDS {
        return Err(crate::error::Error::InsufficientSessionDuration {
            requested: requested_seconds,
            granted,
        });
    }
    Ok(())
}
