use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use indexmap::IndexMap;
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, InvalidApiKeySnafu,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{
            params::{construct_params, validate_request},
            response::AlpacaResponse,
        },
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key =
            SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key = SecretString::new(
            get_env_var("APCA_API_SECRET_KEY")
                .context(MissingEnvVarSnafu)?
                .into(),
        );
        Self::with_keys(api_key, secret_key)
    }

    pub fn with_keys(api_key: SecretString, secret_key: SecretString) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            // free plan allows 200 requests per minute
            limiter: RateLimiter::direct(Quota::per_minute(nonzero!(200u32))),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    /// Points the provider at a different bars endpoint (e.g. a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_page(
        &self,
        params: &BarsRequestParams,
        page_token: Option<&str>,
    ) -> Result<AlpacaResponse, ProviderError> {
        let mut query_params = construct_params(params);
        if let Some(token) = page_token {
            query_params.push(("page_token".to_string(), token.to_string()));
        }

        self.limiter.until_ready().await;
        let response = self
            .client
            .get(&self.base_url)
            .query(&query_params)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            warn!(%status, %message, "alpaca bars request rejected");
            return ApiSnafu {
                message: format!("{status}: {message}"),
            }
            .fail();
        }

        response.json::<AlpacaResponse>().await.context(ReqwestSnafu)
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        validate_request(&params)?;

        let mut all_bars: IndexMap<String, Vec<Bar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(&params, next_page_token.as_deref()).await?;
            pages += 1;

            for (symbol, bars) in page.bars {
                all_bars
                    .entry(symbol)
                    .or_default()
                    .extend(bars.into_iter().map(Bar::from));
            }

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }
        debug!(symbols = ?params.symbols, pages, "alpaca pagination complete");

        all_bars
            .into_iter()
            .map(|(symbol, mut bars)| {
                // `sort=desc` is honoured on the wire, but series are always ascending
                bars.sort_by_key(|b| b.timestamp);
                BarSeries::new(symbol, params.timeframe, bars).map_err(|e| {
                    InternalSnafu {
                        message: e.to_string(),
                    }
                    .build()
                })
            })
            .collect()
    }
}
