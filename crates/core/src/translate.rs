use async_trait::async_trait;
use codenav_api::{Position, PositionTranslator, Range, RepositoryId, Result};

/// Translator for deployments where every upload is at the requested commit
/// or drift between commits is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl PositionTranslator for IdentityTranslator {
    async fn translate_position(
        &self,
        _repository_id: RepositoryId,
        _from_commit: &str,
        _to_commit: &str,
        _path: &str,
        position: Position,
    ) -> Result<Option<Position>> {
        Ok(Some(position))
    }

    async fn translate_range(
        &self,
        _repository_id: RepositoryId,
        _from_commit: &str,
        _to_commit: &str,
        _path: &str,
        range: Range,
    ) -> Result<Option<Range>> {
        Ok(Some(range))
    }
}
