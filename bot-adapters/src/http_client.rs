use std::sync::Arc;
use std::time::Duration;

use hyper::body::{Bytes, to_bytes};
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Client, Request, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use serde::Serialize;
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{AdapterError, AdapterResult};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn build_https_client() -> AdapterResult<HyperClient> {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Ok(Client::builder().build::<_, Body>(connector))
}

/// Posts a JSON payload and returns the body of a successful response.
///
/// `provider` only labels error messages. Non-2xx statuses become
/// [`AdapterError::Response`]; an elapsed `deadline` becomes
/// [`AdapterError::Timeout`].
pub(crate) async fn post_json<T: Serialize>(
    client: &HyperClient,
    provider: &str,
    endpoint: &Uri,
    bearer: Option<&str>,
    payload: &T,
    deadline: Duration,
) -> AdapterResult<Bytes> {
    let body = serde_json::to_vec(payload).map_err(|err| {
        AdapterError::invalid_request(format!("failed to encode {provider} request: {err}"))
    })?;

    let mut builder = Request::post(endpoint.clone()).header(CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body)).map_err(|err| {
        AdapterError::transport(format!("failed to build {provider} request: {err}"))
    })?;

    let response = timeout(deadline, client.request(request))
        .await
        .map_err(|_| AdapterError::Timeout { after: deadline })?
        .map_err(|err| AdapterError::transport(format!("{provider} request failed: {err}")))?;

    let status = response.status();
    let bytes = to_bytes(response.into_body()).await.map_err(|err| {
        AdapterError::transport(format!("failed to read {provider} response: {err}"))
    })?;

    if !status.is_success() {
        let reason = String::from_utf8_lossy(&bytes).to_string();
        return Err(AdapterError::Response {
            reason: format!("{provider} returned {status}: {reason}"),
        });
    }

    Ok(bytes)
}

/// Normalises a provider base URL so endpoint paths can be appended.
pub(crate) fn sanitize_base_url(provider: &str, input: &str) -> AdapterResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(format!(
            "{provider} base URL must start with http:// or https://"
        )));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>().map_err(|err| {
        AdapterError::configuration(format!("invalid {provider} base URL: {err}"))
    })?;
    Ok(base)
}
