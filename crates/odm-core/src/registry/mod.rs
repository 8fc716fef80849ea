//! Host list resolution.

use odm_model::NodeAddress;

/// Environment variable holding the host list.
pub const HOSTS_ENV: &str = "ODM_HOST";

pub const DEFAULT_HOST: &str = "http://localhost:3000";

/// Split `raw` on commas and whitespace, dropping empty tokens.
///
/// An absent or blank value yields `[default]`; `default` itself may list several hosts.
/// A blank `default` falls back to [`DEFAULT_HOST`], so the result is never empty.
pub fn resolve(raw: Option<&str>, default: &str) -> Vec<NodeAddress> {
    let parsed = split(raw.unwrap_or_default());
    if !parsed.is_empty() {
        return parsed;
    }
    let defaults = split(default);
    if defaults.is_empty() {
        return vec![NodeAddress::new(DEFAULT_HOST)];
    }
    defaults
}

/// [`resolve`] on the value of the environment variable `var`.
pub fn resolve_from_env(var: &str, default: &str) -> Vec<NodeAddress> {
    let raw = std::env::var(var).ok();
    let hosts = resolve(raw.as_deref(), default);
    tracing::debug!(target: "odm.core.registry", var, count = hosts.len(), "resolved node hosts");
    hosts
}

fn split(raw: &str) -> Vec<NodeAddress> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(NodeAddress::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(hosts: &[NodeAddress]) -> Vec<&str> {
        hosts.iter().map(NodeAddress::as_str).collect()
    }

    #[test]
    fn separators_are_equivalent() {
        let comma = resolve(Some("a:3000,b:3000"), DEFAULT_HOST);
        let space = resolve(Some("a:3000 b:3000"), DEFAULT_HOST);
        let newline = resolve(Some("a:3000\nb:3000"), DEFAULT_HOST);
        let mixed = resolve(Some(" a:3000 ,\n\t b:3000 ,, "), DEFAULT_HOST);

        assert_eq!(strs(&comma), vec!["a:3000", "b:3000"]);
        assert_eq!(comma, space);
        assert_eq!(comma, newline);
        assert_eq!(comma, mixed);
    }

    #[test]
    fn blank_or_absent_falls_back_to_default() {
        assert_eq!(strs(&resolve(None, DEFAULT_HOST)), vec![DEFAULT_HOST]);
        assert_eq!(strs(&resolve(Some(""), DEFAULT_HOST)), vec![DEFAULT_HOST]);
        assert_eq!(strs(&resolve(Some(" , \n"), DEFAULT_HOST)), vec![DEFAULT_HOST]);
    }

    #[test]
    fn blank_default_still_yields_an_address() {
        assert_eq!(strs(&resolve(None, "")), vec![DEFAULT_HOST]);
        assert_eq!(strs(&resolve(Some("  ,\n"), "   ")), vec![DEFAULT_HOST]);
    }

    #[test]
    fn default_may_list_several_hosts() {
        let hosts = resolve(None, "n1:3000, n2:3000");
        assert_eq!(strs(&hosts), vec!["n1:3000", "n2:3000"]);
    }

    #[test]
    fn reads_environment_variable() {
        let var = "ODM_CORE_REGISTRY_TEST_HOSTS";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "http://x:3000,http://y:3001") };
        let hosts = resolve_from_env(var, DEFAULT_HOST);
        unsafe { std::env::remove_var(var) };

        assert_eq!(strs(&hosts), vec!["http://x:3000", "http://y:3001"]);
        assert_eq!(
            strs(&resolve_from_env("ODM_CORE_REGISTRY_TEST_UNSET", DEFAULT_HOST)),
            vec![DEFAULT_HOST]
        );
    }
}
