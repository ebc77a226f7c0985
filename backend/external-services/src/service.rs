use std::{str::FromStr, time::Duration};

use common_utils::request::{Method, Request, RequestContent};
use domain_types::{errors::ApiClientError, types::Proxy};
use error_stack::{report, ResultExt};
use interfaces::types::Response;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::field::Empty;

pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Applied to every outbound call when the proxy config does not set one
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Send a prepared request to the payment gateway and partition the response
/// by status code: `Ok(Ok)` for success-family responses, `Ok(Err)` for 4xx
/// and 5xx bodies the caller may still want to inspect.
pub async fn call_gateway_api(
    proxy: &Proxy,
    request: Request,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let span = tracing::info_span!(
        "sjtu_outgoing_call",
        url = Empty,
        method = Empty,
        status_code = Empty,
        latency = Empty,
    );
    let _enter = span.enter();
    let start = tokio::time::Instant::now();

    let url =
        reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;
    let should_bypass_proxy = proxy.bypass_proxy_urls.contains(&url.to_string());
    let client = create_client(proxy, should_bypass_proxy)?;
    let headers = request.headers.construct_header_map()?;
    let timeout = Duration::from_secs(
        proxy
            .request_timeout
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
    );

    tracing::Span::current().record("url", tracing::field::display(&url));
    tracing::Span::current().record("method", tracing::field::display(request.method));

    let request = {
        match request.method {
            Method::Get => client.get(url),
            Method::Post => {
                let client = client.post(url);
                match request.body {
                    Some(RequestContent::Json(ref payload)) => client.json(payload),
                    Some(RequestContent::FormUrlEncoded(ref payload)) => client.form(payload),
                    None => client,
                }
            }
        }
        .timeout(timeout)
        .add_headers(headers)
    };

    let response = request.send().await.map_err(|error| {
        let api_error = match error {
            error if error.is_timeout() => ApiClientError::RequestTimeoutReceived,
            _ => ApiClientError::RequestNotSent(error.to_string()),
        };
        warn_log(
            "REQUEST_FAILURE",
            &json!("Unable to send request to the gateway."),
        );
        report!(api_error)
    });

    let result = match response {
        Ok(response) => {
            tracing::Span::current().record("status_code", response.status().as_u16());
            handle_response(response).await
        }
        Err(err) => Err(err),
    };

    let elapsed = start.elapsed().as_millis();
    tracing::Span::current().record("latency", tracing::field::display(elapsed));
    tracing::info!(tag = ?Tag::OutgoingApi, log_type = "api", "Outgoing request completed");
    result
}

static NON_PROXIED_CLIENT: OnceCell<Client> = OnceCell::new();
static PROXIED_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared clients are initialized once and reused across calls, proxied and
/// non-proxied pools kept apart
pub fn create_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<Client, ApiClientError> {
    Ok(if should_bypass_proxy
        || (proxy_config.http_url.is_none() && proxy_config.https_url.is_none())
    {
        &NON_PROXIED_CLIENT
    } else {
        &PROXIED_CLIENT
    }
    .get_or_try_init(|| {
        get_client_builder(proxy_config, should_bypass_proxy)?
            .build()
            .change_context(ApiClientError::ClientConstructionFailed)
            .inspect_err(|err| {
                error_log(
                    "ERROR",
                    &json!(format!("Failed to construct base client. Error: {:?}", err)),
                );
            })
    })?
    .clone())
}

fn get_client_builder(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<reqwest::ClientBuilder, ApiClientError> {
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    if should_bypass_proxy {
        return Ok(client_builder);
    }

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    warn_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTPS proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .inspect_err(|err| {
                    warn_log(
                        "PROXY_ERROR",
                        &json!(format!("HTTP proxy configuration error. Error: {:?}", err)),
                    );
                })?,
        );
    }

    Ok(client_builder)
}

async fn handle_response(
    resp: reqwest::Response,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let status_code = resp.status().as_u16();
    let headers = Some(resp.headers().to_owned());
    match status_code {
        200..=202 | 302 | 204 => {
            let response = resp
                .bytes()
                .await
                .change_context(ApiClientError::ResponseDecodingFailed)?;
            Ok(Ok(Response {
                headers,
                response,
                status_code,
            }))
        }
        400..=599 => {
            let bytes = resp.bytes().await.map_err(|error| {
                report!(error).change_context(ApiClientError::ResponseDecodingFailed)
            })?;

            Ok(Err(Response {
                headers,
                response: bytes,
                status_code,
            }))
        }
        _ => {
            warn_log(
                "UNEXPECTED_RESPONSE",
                &json!("Unexpected response from server."),
            );
            Err(report!(ApiClientError::UnexpectedServerResponse))
        }
    }
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for common_utils::request::Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}

pub(super) trait RequestBuilderExt {
    fn add_headers(self, headers: reqwest::header::HeaderMap) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn add_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self = self.headers(headers);
        self
    }
}

#[derive(Debug, Default, serde::Deserialize, Clone, strum::EnumString)]
pub enum Tag {
    /// General.
    #[default]
    General,
    /// Api Outgoing Request
    OutgoingApi,
}

#[inline]
pub fn error_log(action: &str, message: &Value) {
    tracing::error!(tags = %action, json_value= %message);
}

#[inline]
pub fn warn_log(action: &str, message: &Value) {
    tracing::warn!(tags = %action, json_value= %message);
}
