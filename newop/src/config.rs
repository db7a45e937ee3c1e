use riscv_decode::Isa;
use serde::Deserialize;

use crate::Error;

/// Analysis configuration
///
/// ```toml
/// isa = "32IMCV"
/// max_inputs = 2
/// arithmetic_only = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisConfig {
    /// Extensions the profiled program was built for
    #[serde(default = "AnalysisConfig::default_isa")]
    pub isa: Isa,

    /// Register inputs a fused instruction may read
    #[serde(default = "AnalysisConfig::default_max_inputs")]
    pub max_inputs: usize,

    /// Only look for candidates in arithmetic sub-blocks
    #[serde(default = "AnalysisConfig::default_arithmetic_only")]
    pub arithmetic_only: bool,
}

impl AnalysisConfig {
    fn default_isa() -> Isa {
        Isa::rv32imc()
    }

    fn default_max_inputs() -> usize {
        2
    }

    fn default_arithmetic_only() -> bool {
        true
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: AnalysisConfig = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            isa: Self::default_isa(),
            max_inputs: Self::default_max_inputs(),
            arithmetic_only: Self::default_arithmetic_only(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = AnalysisConfig::from_toml_str("isa = \"rv32icvm\"").unwrap();
        assert_eq!(config.isa, Isa::new().with_m().with_c().with_v());
        assert_eq!(config.max_inputs, 2);
        assert!(config.arithmetic_only);
        assert_eq!(AnalysisConfig::from_toml_str("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_bad_isa_is_rejected() {
        assert!(matches!(AnalysisConfig::from_toml_str("isa = \"64G\""), Err(Error::Config(_))));
        assert!(AnalysisConfig::from_toml_str("max_inputs = -1").is_err());
    }
}
