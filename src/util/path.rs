/// Expand `~`, `$VAR` and `${VAR}`; the input is returned unchanged if a
/// variable cannot be resolved.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
