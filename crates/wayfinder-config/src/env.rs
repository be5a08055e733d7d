use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in raw TOML before deserialization
///
/// Operating on the text keeps the config structs plain `String` and
/// `SecretString`. TOML comment lines pass through untouched so a
/// commented-out secret does not require the variable to exist.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn placeholder() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("must be valid regex")
        })
    }

    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;
        for captures in placeholder().captures_iter(line) {
            let overall = captures.get(0).expect("match exists");
            let var_name = captures.get(1).expect("group exists").as_str();

            output.push_str(&line[last_end..overall.start()]);

            match std::env::var(var_name) {
                Ok(value) => output.push_str(&value),
                Err(_) => return Err(format!("environment variable not found: `{var_name}`")),
            }

            last_end = overall.end();
        }
        output.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_placeholders() {
        let input = "total_timeout_ms = 6000";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_api_key() {
        temp_env::with_var("WF_PRIMARY_KEY", Some("sk-test"), || {
            let result = expand_env("api_key = \"{{ env.WF_PRIMARY_KEY }}\"").unwrap();
            assert_eq!(result, "api_key = \"sk-test\"");
        });
    }

    #[test]
    fn missing_variable_errors_by_name() {
        temp_env::with_var_unset("WF_ABSENT", || {
            let err = expand_env("api_key = \"{{ env.WF_ABSENT }}\"").unwrap_err();
            assert!(err.contains("WF_ABSENT"));
        });
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("WF_ABSENT", || {
            let input = "  # api_key = \"{{ env.WF_ABSENT }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn multiple_placeholders_on_one_line() {
        temp_env::with_vars([("WF_A", Some("a")), ("WF_B", Some("b"))], || {
            let result = expand_env("x = \"{{ env.WF_A }}:{{ env.WF_B }}\"").unwrap();
            assert_eq!(result, "x = \"a:b\"");
        });
    }
}
