use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};

use webhook_domain::ClientKey;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// First `X-Forwarded-For` entry, else the socket peer address.
pub fn client_key(headers: &HeaderMap, extensions: &Extensions) -> ClientKey {
    let forwarded_for = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok());
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    ClientKey::resolve(forwarded_for, peer.as_deref())
}
