use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::FleetError;

/// Current wall-clock time. Centralized so staleness and ordering decisions
/// share one source.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Format a timestamp for the wire (RFC 3339).
pub fn format_rfc3339(ts: OffsetDateTime) -> Result<String, FleetError> {
    Ok(ts.format(&Rfc3339)?)
}

/// The current time, already formatted for the wire.
pub fn timestamp_now() -> Result<String, FleetError> {
    format_rfc3339(now())
}
