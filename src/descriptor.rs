//! Option descriptors supplied by the flag-definition layer.

/// One configurable option: its canonical name plus the alternate keys a
/// config file may use for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionDescriptor {
    /// Primary key; the lookup key in the merged result.
    pub canonical: String,
    /// Alternate keys, in declared order. When several are present in one
    /// file, the last one in this list wins.
    pub aliases: Vec<String>,
    /// Environment variables consulted by [`crate::overlay::Overlay`], first set wins.
    pub env: Vec<String>,
    /// Built-in default, the lowest-precedence tier of the overlay.
    pub default: Option<String>,
}

impl OptionDescriptor {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env.push(var.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// All names this option answers to: canonical first, then aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Parse a command-line option spec of the form
    /// `canonical[=alias1,alias2,...]`.
    pub fn parse_spec(spec: &str) -> Result<Self, String> {
        let (canonical, aliases) = match spec.split_once('=') {
            Some((canonical, aliases)) => (canonical.trim(), Some(aliases)),
            None => (spec.trim(), None),
        };
        if canonical.is_empty() {
            return Err(format!("option spec '{}' has an empty canonical name", spec));
        }
        if canonical == crate::include::INCLUDE_KEY {
            return Err(format!(
                "'{}' is reserved and cannot be an option name",
                crate::include::INCLUDE_KEY
            ));
        }

        let mut descriptor = Self::new(canonical);
        if let Some(aliases) = aliases {
            for alias in aliases.split(',').map(str::trim) {
                if alias.is_empty() {
                    return Err(format!("option spec '{}' contains an empty alias", spec));
                }
                descriptor = descriptor.alias(alias);
            }
        }
        Ok(descriptor)
    }
}

/// Source of option descriptors.
///
/// Any flag framework can adapt to this by listing its flags' names.
pub trait OptionRegistry {
    fn descriptors(&self) -> &[OptionDescriptor];

    /// Find the descriptor whose canonical name is `name`.
    fn find(&self, name: &str) -> Option<&OptionDescriptor> {
        self.descriptors().iter().find(|d| d.canonical == name)
    }
}

impl OptionRegistry for [OptionDescriptor] {
    fn descriptors(&self) -> &[OptionDescriptor] {
        self
    }
}

impl OptionRegistry for Vec<OptionDescriptor> {
    fn descriptors(&self) -> &[OptionDescriptor] {
        self
    }
}

impl<const N: usize> OptionRegistry for [OptionDescriptor; N] {
    fn descriptors(&self) -> &[OptionDescriptor] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let d = OptionDescriptor::new("listen-http")
            .alias("listen_http")
            .alias("L")
            .env("APP_LISTEN_HTTP")
            .default_value(":80");
        assert_eq!(d.canonical, "listen-http");
        assert_eq!(d.aliases, vec!["listen_http", "L"]);
        assert_eq!(d.env, vec!["APP_LISTEN_HTTP"]);
        assert_eq!(d.default.as_deref(), Some(":80"));
        assert_eq!(d.names().collect::<Vec<_>>(), vec!["listen-http", "listen_http", "L"]);
    }

    #[test]
    fn test_parse_spec_with_aliases() {
        let d = OptionDescriptor::parse_spec("key-file=key_file, K").unwrap();
        assert_eq!(d.canonical, "key-file");
        assert_eq!(d.aliases, vec!["key_file", "K"]);
    }

    #[test]
    fn test_parse_spec_canonical_only() {
        let d = OptionDescriptor::parse_spec("base-url").unwrap();
        assert_eq!(d.canonical, "base-url");
        assert!(d.aliases.is_empty());
    }

    #[test]
    fn test_parse_spec_rejects_bad_input() {
        assert!(OptionDescriptor::parse_spec("=a").is_err());
        assert!(OptionDescriptor::parse_spec("x=a,,b").is_err());
        assert!(OptionDescriptor::parse_spec("include").is_err());
    }

    #[test]
    fn test_registry_find() {
        let registry = vec![
            OptionDescriptor::new("a").alias("x"),
            OptionDescriptor::new("b"),
        ];
        assert_eq!(registry.find("b").map(|d| d.canonical.as_str()), Some("b"));
        assert!(registry.find("x").is_none());
    }
}
