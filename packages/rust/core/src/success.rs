//! Success hook: make sure the installed tool ends up cached.

use tracing::{debug, info, instrument, warn};

use oaspages_shared::Result;

use crate::context::BuildContext;
use crate::host::BuildUtils;

/// Save the tool cache unless it already holds the entry.
///
/// Returns whether anything was saved. A missing install directory leaves
/// the cache empty and returns `false`. Safe to call any number of times.
#[instrument(skip_all, fields(key = ctx.tool_cache_key()))]
pub async fn on_success(ctx: &BuildContext, utils: BuildUtils<'_>) -> Result<bool> {
    let key = ctx.tool_cache_key();
    if utils.cache.has(key).await? {
        debug!("tool already cached");
        return Ok(false);
    }

    let saved = utils.cache.save(key).await?;
    if saved {
        info!("saved tool cache after successful build");
    } else {
        warn!("nothing to save, tool is not installed");
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use oaspages_shared::AppConfig;

    use super::*;
    use oaspages_cache::FsCache;

    use crate::testing::{CacheCall, MemoryCache, RecordingRunner, utils};

    #[tokio::test]
    async fn saves_once_then_noops() {
        let ctx = BuildContext::new("/site", AppConfig::default());
        let runner = RecordingRunner::default();
        let cache = MemoryCache::default();

        assert!(on_success(&ctx, utils(&runner, &cache)).await.unwrap());
        assert!(!on_success(&ctx, utils(&runner, &cache)).await.unwrap());

        assert_eq!(cache.saves(), 1);
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn missing_install_dir_reports_nothing_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(tmp.path().join("work"), AppConfig::default());
        let runner = RecordingRunner::default();
        let cache = FsCache::open(&tmp.path().join("cache"), &ctx.workdir)
            .await
            .unwrap();
        let utils = BuildUtils {
            run: &runner,
            cache: &cache,
        };

        assert!(!on_success(&ctx, utils).await.unwrap());
        assert!(cache.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn already_cached_issues_no_save() {
        let ctx = BuildContext::new("/site", AppConfig::default());
        let runner = RecordingRunner::default();
        let cache = MemoryCache::with_key("redoc");

        assert!(!on_success(&ctx, utils(&runner, &cache)).await.unwrap());
        assert_eq!(cache.calls(), vec![CacheCall::Has("redoc".into())]);
    }
}
