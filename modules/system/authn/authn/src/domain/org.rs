//! Resolution of the organization a request targets.

use authn_sdk::Request;

/// Query parameter that selects the target org explicitly.
pub const ORG_ID_TARGET_QUERY: &str = "targetOrgId";

/// Header that selects the target org.
pub const ORG_ID_HEADER_NAME: &str = "X-Grafana-Org-Id";

/// Org id targeted by `r`, or `0` when none is given.
///
/// A positive `targetOrgId` query parameter wins over the header. Values
/// that are missing, malformed or not positive are ignored.
#[must_use]
pub fn org_id_from_request(r: &Request) -> i64 {
    if r.http_request().is_none() {
        return 0;
    }

    if let Some(id) = r
        .query_param(ORG_ID_TARGET_QUERY)
        .and_then(|v| parse_positive(&v))
    {
        return id;
    }

    r.header(ORG_ID_HEADER_NAME)
        .and_then(parse_positive)
        .unwrap_or(0)
}

fn parse_positive(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
