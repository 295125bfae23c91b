//! Query transforms.
//!
//! Transforms rewrite an [`EntityQuery`] before it is rendered. They run in
//! order and each receives the output of the previous one.

mod bind;

pub use bind::BindVariables;

use crate::error::TransformError;
use crate::ir::EntityQuery;

/// A rewrite step applied to a query before rendering
pub trait QueryTransform: Send + Sync {
    /// Unique name for this transform
    fn name(&self) -> &'static str;

    fn transform(&self, query: EntityQuery) -> Result<EntityQuery, TransformError>;
}

/// Apply `transforms` in order
pub fn apply_all(
    transforms: &[&dyn QueryTransform],
    query: EntityQuery,
) -> Result<EntityQuery, TransformError> {
    transforms.iter().try_fold(query, |query, transform| {
        tracing::trace!(transform = transform.name(), "applying query transform");
        transform.transform(query)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LimitTransform(u64);

    impl QueryTransform for LimitTransform {
        fn name(&self) -> &'static str {
            "limit"
        }

        fn transform(&self, query: EntityQuery) -> Result<EntityQuery, TransformError> {
            Ok(query.limit(self.0))
        }
    }

    #[test]
    fn test_transforms_apply_in_order() {
        let query = apply_all(
            &[&LimitTransform(10), &LimitTransform(5)],
            EntityQuery::new("acme.Person"),
        )
        .unwrap();

        assert_eq!(query.max_results, Some(5));
    }

    #[test]
    fn test_no_transforms_is_identity() {
        let query = EntityQuery::new("acme.Person").offset(3);
        assert_eq!(apply_all(&[], query.clone()).unwrap(), query);
    }
}
