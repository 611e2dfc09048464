use crate::state::InterruptMode;

/// Per-instance processor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ProcessorConfig {
    /// Enables trace event dispatch to the sink passed to
    /// [`crate::Processor::step_traced`].
    pub tracing_enabled: bool,
    /// Interrupt mode selected by power-on and by every reset.
    pub reset_interrupt_mode: InterruptMode,
}

#[cfg(test)]
mod tests {
    use super::ProcessorConfig;
    use crate::state::InterruptMode;

    #[test]
    fn default_config_is_untraced_mode_zero() {
        let config = ProcessorConfig::default();
        assert!(!config.tracing_enabled);
        assert_eq!(config.reset_interrupt_mode, InterruptMode::Mode0);
    }
}
