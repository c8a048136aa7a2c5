//! Actor identity resolution for CLI commands.
//!
//! The resolution chain: `--agent` flag > `WARD_AGENT` env > `AGENT` env >
//! `USER` env (TTY only). Mutating commands require an identity for audit
//! stamps; read-only commands work without one.

use std::env;

/// Error from actor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResolutionError {
    pub message: String,
    pub code: &'static str,
}

impl std::fmt::Display for AgentResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AgentResolutionError {}

trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
    fn is_tty(&self) -> bool;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

fn resolve_agent_with(cli_flag: Option<&str>, env: &dyn EnvReader) -> Option<String> {
    if let Some(agent) = cli_flag {
        if !agent.is_empty() {
            return Some(agent.to_string());
        }
    }
    if let Some(val) = env.get("WARD_AGENT") {
        return Some(val);
    }
    if let Some(val) = env.get("AGENT") {
        return Some(val);
    }
    if env.is_tty() {
        if let Some(val) = env.get("USER") {
            return Some(val);
        }
    }
    None
}

/// Resolve the actor identity, or `None` when nothing is configured.
#[must_use]
pub fn resolve_agent(cli_flag: Option<&str>) -> Option<String> {
    resolve_agent_with(cli_flag, &RealEnv)
}

/// Resolve the actor identity, erroring for mutating commands.
///
/// # Errors
///
/// Returns `missing_agent` when no identity could be resolved.
pub fn require_agent(cli_flag: Option<&str>) -> Result<String, AgentResolutionError> {
    resolve_agent(cli_flag).ok_or_else(|| AgentResolutionError {
        message: "Actor identity required for this command. \
                  Set --agent, WARD_AGENT, or AGENT environment variable."
            .to_string(),
        code: "missing_agent",
    })
}

#[cfg(test)]
mod tests {
    use super::{EnvReader, resolve_agent_with};
    use std::collections::HashMap;

    struct MockEnv {
        vars: HashMap<String, String>,
        tty: bool,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
                tty: false,
            }
        }

        fn var(mut self, key: &str, val: &str) -> Self {
            self.vars.insert(key.to_string(), val.to_string());
            self
        }

        const fn tty(mut self, tty: bool) -> Self {
            self.tty = tty;
            self
        }
    }

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned().filter(|v| !v.is_empty())
        }

        fn is_tty(&self) -> bool {
            self.tty
        }
    }

    #[test]
    fn flag_wins_over_everything() {
        let env = MockEnv::new().var("WARD_AGENT", "env-agent");
        assert_eq!(
            resolve_agent_with(Some("flag-agent"), &env),
            Some("flag-agent".to_string())
        );
    }

    #[test]
    fn ward_agent_beats_agent() {
        let env = MockEnv::new()
            .var("WARD_AGENT", "ward")
            .var("AGENT", "generic");
        assert_eq!(resolve_agent_with(None, &env), Some("ward".to_string()));
    }

    #[test]
    fn user_only_applies_on_a_tty() {
        let env = MockEnv::new().var("USER", "jane");
        assert_eq!(resolve_agent_with(None, &env), None);

        let env = MockEnv::new().var("USER", "jane").tty(true);
        assert_eq!(resolve_agent_with(None, &env), Some("jane".to_string()));
    }

    #[test]
    fn empty_values_are_skipped() {
        let env = MockEnv::new().var("WARD_AGENT", "").var("AGENT", "fallback");
        assert_eq!(resolve_agent_with(None, &env), Some("fallback".to_string()));
    }
}
