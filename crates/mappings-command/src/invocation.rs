//! Argument parsing for mapping commands.
//!
//! Grammar: `[name] [version] [-v|--version <value>]`. `name` may be omitted
//! only when the flag is present.

use crate::error::{CommandError, Result};

/// Parsed arguments of a single invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Name or intermediate id to look up
    pub name: Option<String>,
    /// Explicit version, overriding the guild default
    pub version: Option<String>,
    /// Value of `-v/--version`: new guild default, or `latest` to clear it
    pub default_version: Option<String>,
}

impl Invocation {
    pub fn lookup(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            version,
            default_version: None,
        }
    }

    pub fn set_default(value: impl Into<String>) -> Self {
        Self {
            default_version: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn parse(args: &str) -> Result<Self> {
        let mut invocation = Self::default();
        let mut positionals = Vec::new();
        let mut tokens = args.split_whitespace();

        while let Some(token) = tokens.next() {
            match token {
                "-v" | "--version" => {
                    let value = tokens.next().ok_or_else(|| {
                        CommandError::Usage(format!("flag `{}` requires a value", token))
                    })?;
                    invocation.default_version = Some(value.to_string());
                }
                _ if token.starts_with("--version=") => {
                    let value = &token["--version=".len()..];
                    if value.is_empty() {
                        return Err(CommandError::Usage("flag `--version` requires a value".into()));
                    }
                    invocation.default_version = Some(value.to_string());
                }
                _ if token.len() > 1 && token.starts_with('-') => {
                    return Err(CommandError::Usage(format!("unknown flag `{}`", token)));
                }
                _ => positionals.push(token.to_string()),
            }
        }

        if positionals.len() > 2 {
            return Err(CommandError::Usage(format!(
                "unexpected argument `{}`",
                positionals[2]
            )));
        }
        let mut positionals = positionals.into_iter();
        invocation.name = positionals.next();
        invocation.version = positionals.next();

        if invocation.name.is_none() && invocation.default_version.is_none() {
            return Err(CommandError::MissingArgument("name"));
        }
        Ok(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only() {
        assert_eq!(
            Invocation::parse("getBlockState").unwrap(),
            Invocation::lookup("getBlockState", None)
        );
    }

    #[test]
    fn test_name_and_version() {
        let inv = Invocation::parse("  func_1234_a   1.12.2 ").unwrap();
        assert_eq!(inv.name.as_deref(), Some("func_1234_a"));
        assert_eq!(inv.version.as_deref(), Some("1.12.2"));
        assert!(inv.default_version.is_none());
    }

    #[test]
    fn test_short_flag_without_name() {
        assert_eq!(Invocation::parse("-v 1.12.2").unwrap(), Invocation::set_default("1.12.2"));
    }

    #[test]
    fn test_long_flag_forms() {
        assert_eq!(Invocation::parse("--version latest").unwrap(), Invocation::set_default("latest"));
        assert_eq!(Invocation::parse("--version=1.13").unwrap(), Invocation::set_default("1.13"));
    }

    #[test]
    fn test_flag_missing_value() {
        assert!(matches!(Invocation::parse("-v"), Err(CommandError::Usage(_))));
        assert!(matches!(Invocation::parse("--version="), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_unknown_flag() {
        let err = Invocation::parse("foo -x").unwrap_err();
        assert_eq!(err.to_string(), "Usage error: unknown flag `-x`");
    }

    #[test]
    fn test_too_many_positionals() {
        assert!(matches!(Invocation::parse("a b c"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_name_required_without_flag() {
        assert!(matches!(Invocation::parse(""), Err(CommandError::MissingArgument("name"))));
    }
}
