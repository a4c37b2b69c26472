//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use crate::models::Venue;
use crate::provider::RetryPolicy;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Venues scanned when `VENUES` is not set.
pub const DEFAULT_VENUES: [&str; 4] = ["lbank", "kraken", "poloniex", "uniswap"];
pub const DEFAULT_FEE_RATE: f64 = 0.002;
pub const DEFAULT_MIN_PROFIT_PCT: f64 = 1.0;
pub const DEFAULT_MAX_ASSETS: usize = 10;

/// Denominator used for `profit_percentage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfitBasis {
    /// `net_profit / total_fees_paid * 100`; falls back to `Investment` when
    /// the cycle pays no fees.
    #[default]
    Fees,
    /// `net_profit / capital_committed * 100`.
    Investment,
}

impl FromStr for ProfitBasis {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fees" => Ok(Self::Fees),
            "investment" => Ok(Self::Investment),
            other => Err(AppError::config(format!(
                "unknown profit basis '{other}' (expected 'fees' or 'investment')"
            ))),
        }
    }
}

/// Caps bounding the candidate space of a single scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanLimits {
    pub max_assets: Option<usize>,
    pub max_venues: Option<usize>,
    pub max_candidates: Option<usize>,
    pub max_scan_duration: Option<Duration>,
}

/// Everything the detection engine needs; injected at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub venues: Vec<Venue>,
    /// Fraction charged per trade leg, `0 <= fee_rate < 1`.
    pub fee_rate: f64,
    /// Minimum profit percentage an opportunity must reach.
    pub min_profit_pct: f64,
    pub profit_basis: ProfitBasis,
    pub limits: ScanLimits,
    /// Worker threads; `None` uses the available parallelism.
    pub workers: Option<usize>,
}

impl EngineConfig {
    pub fn new<I, V>(venues: I, fee_rate: f64) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Venue>,
    {
        Self {
            venues: venues.into_iter().map(Into::into).collect(),
            fee_rate,
            min_profit_pct: DEFAULT_MIN_PROFIT_PCT,
            profit_basis: ProfitBasis::default(),
            limits: ScanLimits::default(),
            workers: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.venues.is_empty() {
            return Err(AppError::config("at least one venue must be configured"));
        }
        let mut seen = HashSet::new();
        for venue in &self.venues {
            if venue.trim().is_empty() {
                return Err(AppError::config("venue identifiers must not be empty"));
            }
            if !seen.insert(venue.as_str()) {
                return Err(AppError::config(format!("duplicate venue '{venue}'")));
            }
        }
        if !self.fee_rate.is_finite() || !(0.0..1.0).contains(&self.fee_rate) {
            return Err(AppError::config(format!(
                "fee rate must be within [0, 1), got {}",
                self.fee_rate
            )));
        }
        if !self.min_profit_pct.is_finite() || self.min_profit_pct < 0.0 {
            return Err(AppError::config(format!(
                "profit threshold must be a non-negative percentage, got {}",
                self.min_profit_pct
            )));
        }
        let caps = [
            ("max_assets", self.limits.max_assets),
            ("max_venues", self.limits.max_venues),
            ("max_candidates", self.limits.max_candidates),
            ("workers", self.workers),
        ];
        for (name, cap) in caps {
            if cap == Some(0) {
                return Err(AppError::config(format!("{name} must be positive")));
            }
        }
        if self.limits.max_scan_duration == Some(Duration::ZERO) {
            return Err(AppError::config("max_scan_duration must be positive"));
        }
        Ok(())
    }
}

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub retry: RetryPolicy,
    /// JSON price snapshot read by the bundled feeds.
    pub snapshot_path: PathBuf,
    pub scan_interval: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let venues = match lookup("VENUES") {
            Some(raw) => raw
                .split(',')
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect(),
            None => DEFAULT_VENUES.iter().map(|v| v.to_string()).collect(),
        };

        let limits = ScanLimits {
            max_assets: Some(parse_or(&lookup, "MAX_ASSETS", DEFAULT_MAX_ASSETS)?),
            max_venues: parse_opt(&lookup, "MAX_VENUES")?,
            max_candidates: parse_opt(&lookup, "MAX_CANDIDATES")?,
            max_scan_duration: parse_opt::<u64>(&lookup, "SCAN_BUDGET_MS")?
                .map(Duration::from_millis),
        };

        let engine = EngineConfig {
            venues,
            fee_rate: parse_or(&lookup, "FEE_RATE", DEFAULT_FEE_RATE)?,
            min_profit_pct: parse_or(&lookup, "MIN_PROFIT_PCT", DEFAULT_MIN_PROFIT_PCT)?,
            profit_basis: parse_or(&lookup, "PROFIT_BASIS", ProfitBasis::default())?,
            limits,
            workers: parse_opt(&lookup, "SCAN_WORKERS")?,
        };
        engine.validate()?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "RETRY_MAX_ATTEMPTS", defaults.max_attempts)?,
            base_delay: parse_opt::<u64>(&lookup, "RETRY_BASE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: parse_opt::<u64>(&lookup, "RETRY_MAX_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
            multiplier: parse_or(&lookup, "RETRY_MULTIPLIER", defaults.multiplier)?,
            jitter_factor: parse_or(&lookup, "RETRY_JITTER", defaults.jitter_factor)?,
        };
        retry.validate()?;

        let snapshot_path = lookup("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("prices.json"));
        let scan_interval = Duration::from_secs(parse_or(&lookup, "SCAN_INTERVAL_SECS", 30u64)?);
        if scan_interval.is_zero() {
            return Err(AppError::config("SCAN_INTERVAL_SECS must be positive"));
        }

        Ok(Self {
            engine,
            retry,
            snapshot_path,
            scan_interval,
        })
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::config(format!("{key}='{raw}': {e}"))),
        _ => Ok(None),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = AppConfig::from_lookup(|_| None).expect("defaults are valid");
        assert_eq!(cfg.engine.venues, DEFAULT_VENUES.to_vec());
        assert_eq!(cfg.engine.fee_rate, DEFAULT_FEE_RATE);
        assert_eq!(cfg.engine.min_profit_pct, 1.0);
        assert_eq!(cfg.engine.profit_basis, ProfitBasis::Fees);
        assert_eq!(cfg.engine.limits.max_assets, Some(10));
        assert_eq!(cfg.engine.limits.max_candidates, None);
        assert_eq!(cfg.snapshot_path, PathBuf::from("prices.json"));
        assert_eq!(cfg.scan_interval, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("VENUES", " Kraken, lbank ,,"),
            ("FEE_RATE", "0.001"),
            ("MIN_PROFIT_PCT", "2.5"),
            ("PROFIT_BASIS", "investment"),
            ("MAX_CANDIDATES", "5000"),
            ("SCAN_BUDGET_MS", "250"),
            ("SCAN_WORKERS", "2"),
            ("RETRY_MAX_ATTEMPTS", "3"),
        ]))
        .expect("valid overrides");
        assert_eq!(cfg.engine.venues, vec!["kraken", "lbank"]);
        assert_eq!(cfg.engine.fee_rate, 0.001);
        assert_eq!(cfg.engine.profit_basis, ProfitBasis::Investment);
        assert_eq!(cfg.engine.limits.max_candidates, Some(5000));
        assert_eq!(
            cfg.engine.limits.max_scan_duration,
            Some(Duration::from_millis(250))
        );
        assert_eq!(cfg.engine.workers, Some(2));
        assert_eq!(cfg.retry.max_attempts, 3);
    }

    #[test]
    fn unparseable_values_are_configuration_errors() {
        let err = AppConfig::from_lookup(lookup_from(&[("FEE_RATE", "cheap")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("PROFIT_BASIS", "vibes")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn validate_rejects_bad_engine_settings() {
        let ok = EngineConfig::new(["x", "y"], 0.002);
        assert!(ok.validate().is_ok());

        let mut cfg = ok.clone();
        cfg.fee_rate = 1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ok.clone();
        cfg.fee_rate = -0.1;
        assert!(cfg.validate().is_err());

        let mut cfg = ok.clone();
        cfg.fee_rate = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = ok.clone();
        cfg.min_profit_pct = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ok.clone();
        cfg.limits.max_candidates = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = ok.clone();
        cfg.limits.max_scan_duration = Some(Duration::ZERO);
        assert!(cfg.validate().is_err());

        let mut cfg = ok.clone();
        cfg.workers = Some(0);
        assert!(cfg.validate().is_err());

        assert!(EngineConfig::new(Vec::<String>::new(), 0.0).validate().is_err());
        assert!(EngineConfig::new(["x", "x"], 0.0).validate().is_err());
        assert!(EngineConfig::new(["x", " "], 0.0).validate().is_err());
    }
}
