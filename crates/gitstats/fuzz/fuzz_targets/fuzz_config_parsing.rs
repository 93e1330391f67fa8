#![no_main]

//! Fuzz target for configuration parsing
//!
//! Arbitrary documents must either parse or return a `ConfigError`, and a
//! parsed configuration must always resolve the built-in formatters or
//! reject their options cleanly.

use libfuzzer_sys::fuzz_target;

use gitstats::config::Configuration;
use gitstats::format::FormatterRegistry;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(config) = Configuration::parse(s, "fuzz") {
        assert!(!config.tasks.contains("commit"));
        assert!(!config.tasks.contains("date"));

        let registry = FormatterRegistry::with_builtins();
        for name in registry.names() {
            let _ = registry.resolve(name, &config);
        }

        let filter: Vec<&str> = config.tasks.names().take(2).collect();
        let effective = config.effective_tasks(&filter);
        assert!(effective.len() <= config.tasks.len());
    }
});
