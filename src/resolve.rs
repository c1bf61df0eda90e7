use std::collections::BTreeMap;

/// Expands `$NAME` path segments of a custom directive value against an
/// environment snapshot.
pub struct Resolver<'a> {
    pub env: &'a BTreeMap<String, String>,
}

impl<'a> Resolver<'a> {
    pub fn new(env: &'a BTreeMap<String, String>) -> Self {
        Self { env }
    }

    /// Substitution is per `/`-separated segment: a segment is replaced only
    /// when it is exactly `$NAME`. `a$b` or `$A$B` stay as written.
    pub fn resolve(&self, input: &str) -> String {
        // Fast path
        if !input.contains('$') {
            return input.to_string();
        }

        input
            .split('/')
            .map(|seg| self.segment_value(seg))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn segment_value<'s>(&'s self, seg: &'s str) -> &'s str {
        let Some(name) = seg.strip_prefix('$') else {
            return seg;
        };
        if !is_env_name(name) {
            return seg;
        }

        match self.env.get(name) {
            Some(v) => v.as_str(),
            None => {
                tracing::warn!("${name} is not set; leaving segment unexpanded");
                seg
            }
        }
    }
}

fn is_env_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
