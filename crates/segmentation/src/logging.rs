use crate::config::PredictorConfig;

pub fn setup_logging(config: &PredictorConfig) -> anyhow::Result<()> {
    common::setup_logging(config.environment)
}
