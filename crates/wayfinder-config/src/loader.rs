use std::collections::HashSet;
use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, variable expansion
    /// fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error when provider entries collide or the combined
    /// provider budgets cannot fit inside the router's total budget
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_budgets()?;
        self.validate_thresholds()?;
        self.validate_limits()?;
        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for provider in &self.llm.providers {
            if provider.id.is_empty() {
                anyhow::bail!("llm provider id must not be empty");
            }
            if !seen.insert(provider.id.as_str()) {
                anyhow::bail!("duplicate llm provider id '{}'", provider.id);
            }
            if provider.timeout_ms == 0 {
                anyhow::bail!("llm provider '{}' timeout_ms must be greater than 0", provider.id);
            }
        }
        Ok(())
    }

    /// The gateway's worst case walks every provider to its full budget,
    /// so the sum must fit strictly inside the router's total budget
    fn validate_budgets(&self) -> anyhow::Result<()> {
        let provider_total: u64 = self.llm.providers.iter().map(|p| p.timeout_ms).sum();
        if !self.llm.providers.is_empty() && provider_total >= self.router.total_timeout_ms {
            anyhow::bail!(
                "combined provider budgets ({provider_total}ms) must be less than \
                 router.total_timeout_ms ({}ms)",
                self.router.total_timeout_ms
            );
        }
        Ok(())
    }

    fn validate_thresholds(&self) -> anyhow::Result<()> {
        let unit_bounded = [
            ("classifier.confidence_threshold", self.classifier.confidence_threshold),
            ("rag.similarity_threshold", self.rag.similarity_threshold),
        ];
        for (name, value) in unit_bounded {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{name} must be within [0, 1] (got {value})");
            }
        }
        Ok(())
    }

    fn validate_limits(&self) -> anyhow::Result<()> {
        if self.rag.top_k == 0 {
            anyhow::bail!("rag.top_k must be at least 1");
        }
        if self.router.max_in_flight == 0 {
            anyhow::bail!("router.max_in_flight must be at least 1");
        }
        if self.observability.window_size == 0 {
            anyhow::bail!("observability.window_size must be at least 1");
        }
        if self.data.default_limit == 0 {
            anyhow::bail!("data.default_limit must be at least 1");
        }
        Ok(())
    }
}
