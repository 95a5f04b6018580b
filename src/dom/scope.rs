use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static LENS_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LensId(pub u64);

impl LensId {
    pub fn next() -> Self {
        Self(LENS_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

/// One segment of an isolation path.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Scope {
    Named(String),
    Lens(LensId),
}

impl Scope {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Named(name) => f.write_str(name),
            Scope::Lens(id) => write!(f, "lens#{}", id.0),
        }
    }
}

/// Structured isolation path, root first. Comparing paths segment by segment
/// keeps `a` and `ab` (or `1` and `10`) apart.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Namespace(Vec<Scope>);

impl Namespace {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, scope: Scope) -> Self {
        let mut segments = self.0.clone();
        segments.push(scope);
        Self(segments)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Scope] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &Namespace) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<Vec<Scope>> for Namespace {
    fn from(segments: Vec<Scope>) -> Self {
        Self(segments)
    }
}

impl<const N: usize> From<[&str; N]> for Namespace {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.into_iter().map(Scope::named).collect())
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for scope in &self.0 {
            write!(f, "/{scope}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_is_per_segment() {
        let short = Namespace::from(["profile", "a"]);
        let long = Namespace::from(["profile", "ab"]);
        assert!(!long.starts_with(&short));
        assert!(long.starts_with(&Namespace::from(["profile"])));
        assert!(long.starts_with(&Namespace::root()));
    }

    #[test]
    fn display_joins_segments() {
        let namespace = Namespace::from(["profile"]).child(Scope::Lens(LensId(4)));
        assert_eq!(namespace.to_string(), "/profile/lens#4");
        assert_eq!(Namespace::root().to_string(), "/");
    }
}
