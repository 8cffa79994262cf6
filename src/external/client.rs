use std::time::Duration;

/// User-Agent sent with every API request
pub const USER_AGENT: &str = concat!("pushwoosh-rs/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client used by `ReqwestTransport`
///
/// # Features
/// - **Timeouts**: request and connect timeouts from settings
/// - **Connection pooling**: reuses TCP connections across batches
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
///
/// # Example
/// ```ignore
/// let client = build_http_client(Duration::from_secs(30), Duration::from_secs(10))?;
/// let transport = ReqwestTransport::new(client);
/// ```
pub fn build_http_client(
    request_timeout: Duration,
    connect_timeout: Duration,
) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        // Timeouts
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .user_agent(USER_AGENT)
        .build()
}
