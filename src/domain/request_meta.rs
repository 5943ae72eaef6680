use actix_web::{
    HttpRequest,
    http::header::{HeaderMap, ORIGIN, USER_AGENT},
};
use std::net::SocketAddr;

/// Where a submission came from. Every value is best effort and empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    pub user_agent: String,
    pub ip: String,
    pub origin: String,
}

const X_FORWARDED_FOR: &str = "x-forwarded-for";

impl RequestMeta {
    pub fn from_request(request: &HttpRequest) -> Self {
        Self::from_parts(request.headers(), request.peer_addr())
    }

    /// The client address is the first hop of `X-Forwarded-For` when a proxy set it,
    /// otherwise the peer of the raw connection.
    pub fn from_parts(headers: &HeaderMap, peer_addr: Option<SocketAddr>) -> Self {
        let ip = header_value(headers, X_FORWARDED_FOR)
            .and_then(|forwarded| {
                forwarded
                    .split(',')
                    .map(str::trim)
                    .find(|hop| !hop.is_empty())
                    .map(str::to_owned)
            })
            .or_else(|| peer_addr.map(|addr| addr.ip().to_string()))
            .unwrap_or_default();

        Self {
            user_agent: header_value(headers, USER_AGENT.as_str()).unwrap_or_default(),
            ip,
            origin: header_value(headers, ORIGIN.as_str()).unwrap_or_default(),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
