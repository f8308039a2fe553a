// src/application/commands/posts/delete.rs
use super::PostCommandService;
use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::post::{BlogKey, PostId},
};

impl PostCommandService {
    /// Drafts are removed, anything that was ever published is soft-deleted.
    /// Deleting a missing post succeeds, so repeated submissions are harmless.
    pub async fn delete_post(
        &self,
        blog_key: Option<&str>,
        id: &str,
        acting_user: &str,
    ) -> ApplicationResult<()> {
        let acting_user = acting_user.trim();
        if acting_user.is_empty() {
            return Err(ApplicationError::validation(
                "deleting a post requires the acting user",
            ));
        }
        if id.trim().is_empty() {
            tracing::debug!("delete requested without a post id; nothing to do");
            return Ok(());
        }

        let blog_key = BlogKey::or_default(blog_key, &self.options.blog_key);
        let id = PostId::new(id)?;
        self.write_repo.delete(&blog_key, &id, acting_user).await?;

        tracing::info!(
            blog_key = %blog_key,
            post_id = %id,
            deleted_by = acting_user,
            "post delete processed"
        );
        Ok(())
    }
}
