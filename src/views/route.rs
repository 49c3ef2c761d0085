use super::ViewError;
use std::fmt;
use url::Url;

/// Any absolute base works; only path and query are read.
const ROUTE_BASE: &str = "http://dashboard.local/";

/// Dashboard navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Portfolio,
    Rankings,
    /// Detail page, optionally preselecting a symbol.
    Insights { symbol: Option<String> },
}

impl Route {
    pub fn insights(symbol: &str) -> Self {
        Route::Insights {
            symbol: Some(symbol.to_string()),
        }
    }

    /// Parse `/portfolio`, `rankings`, `/insights?symbol=TCS`, `/` …
    pub fn parse(input: &str) -> Result<Self, ViewError> {
        let base = Url::parse(ROUTE_BASE).map_err(|source| ViewError::InvalidRoute {
            input: input.to_string(),
            source,
        })?;
        let url = base.join(input.trim()).map_err(|source| ViewError::InvalidRoute {
            input: input.to_string(),
            source,
        })?;

        match url.path().trim_end_matches('/') {
            "" => Ok(Route::Dashboard),
            "/portfolio" => Ok(Route::Portfolio),
            "/rankings" => Ok(Route::Rankings),
            "/insights" => {
                let symbol = url
                    .query_pairs()
                    .find(|(k, _)| k == "symbol")
                    .map(|(_, v)| v.trim().to_string())
                    .filter(|s| !s.is_empty());
                Ok(Route::Insights { symbol })
            }
            _ => Err(ViewError::UnknownRoute(input.to_string())),
        }
    }

    /// Path + query form, e.g. `/insights?symbol=M%26M`.
    pub fn href(&self) -> String {
        match self {
            Route::Dashboard => "/".into(),
            Route::Portfolio => "/portfolio".into(),
            Route::Rankings => "/rankings".into(),
            Route::Insights { symbol: None } => "/insights".into(),
            Route::Insights { symbol: Some(s) } => {
                let query: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("symbol", s)
                    .finish();
                format!("/insights?{}", query)
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}
