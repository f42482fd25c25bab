//! Context types for rule execution.

use crate::model::{ApiModel, ElementPath};
use crate::types::{Location, Snapshot};

/// Context provided to structural rules.
///
/// Structural rules see one snapshot at a time; the analyzer runs them on
/// the newer dump and, when a baseline is given, on the baseline as well.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotContext<'a> {
    /// The snapshot being checked.
    pub model: &'a ApiModel,
    /// Which dump the model came from.
    pub snapshot: Snapshot,
}

impl<'a> SnapshotContext<'a> {
    /// Creates a new snapshot context.
    #[must_use]
    pub fn new(model: &'a ApiModel, snapshot: Snapshot) -> Self {
        Self { model, snapshot }
    }

    /// Declaration position of `path` in this snapshot.
    #[must_use]
    pub fn location(&self, path: &ElementPath) -> Option<Location> {
        self.model
            .line_of(path)
            .map(|line| Location::new(self.snapshot, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::parse_str;

    #[test]
    fn test_location_lookup() {
        let model = parse_str(
            "api.txt",
            "package p {\n  public class A {\n    field public int x;\n  }\n}\n",
        )
        .unwrap();
        let ctx = SnapshotContext::new(&model, Snapshot::After);

        let class = ElementPath::class("p", "p.A");
        assert_eq!(ctx.location(&class), Some(Location::new(Snapshot::After, 2)));
        assert_eq!(
            ctx.location(&class.member("x")).map(|l| l.to_string()),
            Some("after:3".to_string())
        );
        assert_eq!(ctx.location(&class.member("missing")), None);
    }
}
