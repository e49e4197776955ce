//! Summary dashboards served under `/api/static_dashboards`.

use chrono::Utc;
use serde_json::Value;

use crate::error::ApiError;
use crate::reshape::reshape_factory;

// Bundled payloads for static-export builds, already in chart shape.
const FACTORY_MOCK: &str = include_str!("../mock/factory.json");
const CHURN_MOCK: &str = include_str!("../mock/churn.json");
const KGINSIGHTS_MOCK: &str = include_str!("../mock/kginsights.json");

/// A known summary dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Factory,
    Churn,
    KgInsights,
}

impl Dashboard {
    pub const ALL: [Dashboard; 3] = [Dashboard::Factory, Dashboard::Churn, Dashboard::KgInsights];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    /// Path segment used by both the proxy and the backend.
    pub fn slug(&self) -> &'static str {
        match self {
            Dashboard::Factory => "factory",
            Dashboard::Churn => "churn",
            Dashboard::KgInsights => "kginsights",
        }
    }

    /// Backend path of this dashboard.
    pub fn backend_path(&self) -> String {
        format!("/api/static_dashboards/{}", self.slug())
    }

    /// Bundled mock payload.
    pub fn mock(&self) -> Result<Value, ApiError> {
        let raw = match self {
            Dashboard::Factory => FACTORY_MOCK,
            Dashboard::Churn => CHURN_MOCK,
            Dashboard::KgInsights => KGINSIGHTS_MOCK,
        };
        Ok(serde_json::from_str(raw)?)
    }

    /// Adapt a successful backend payload for the charts.
    pub fn reshape(&self, payload: Value) -> Value {
        match self {
            Dashboard::Factory => {
                reshape_factory(payload, Utc::now().date_naive(), &mut rand::thread_rng())
            }
            Dashboard::Churn | Dashboard::KgInsights => payload,
        }
    }
}
