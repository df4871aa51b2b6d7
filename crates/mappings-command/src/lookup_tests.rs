#[cfg(test)]
mod tests {
    use tokio::time::Duration;

    use crate::downloader::LookupRequest;
    use crate::error::CommandError;
    use crate::lookup::{resolve, BUILDING_NOTICE};
    use crate::mapping::{MappingEntry, MappingType};
    use crate::mock::{ContextEvent, MockContext, MockDownloader};

    fn entries(n: usize) -> Vec<MappingEntry> {
        (0..n)
            .map(|i| MappingEntry::new(MappingType::Method, format!("method{}", i), format!("func_{}_a", i)))
            .collect()
    }

    fn request(version: &str) -> LookupRequest {
        LookupRequest {
            name: "method0".to_string(),
            version: version.to_string(),
            kind: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_lookup_has_no_side_effects() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12")
            .with_version("1.12", entries(3))
            .with_delay(Duration::from_millis(100));

        let found = resolve(&ctx, &downloader, request("1.12")).await.unwrap();

        assert_eq!(found.len(), 3);
        assert!(ctx.is_silent(), "fast path must not touch the channel: {:?}", ctx.events());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_posts_and_retracts_notice() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12")
            .with_version("1.12", entries(7))
            .with_delay(Duration::from_millis(2000));

        let found = resolve(&ctx, &downloader, request("1.12")).await.unwrap();

        assert_eq!(found.len(), 7);
        let events = ctx.events();
        assert_eq!(events[0], ContextEvent::TypingStarted);
        assert_eq!(events[1], ContextEvent::Reply(BUILDING_NOTICE.to_string()));
        assert_eq!(events[2], ContextEvent::Deleted(1));
        assert_eq!(events[3], ContextEvent::TypingStopped);
        assert_eq!(events.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_dispatches_once() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12")
            .with_version("1.12", entries(1))
            .with_delay(Duration::from_secs(5));

        resolve(&ctx, &downloader, request("1.12")).await.unwrap();

        assert_eq!(downloader.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_such_version() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12").with_version("1.12", entries(1));

        let err = resolve(&ctx, &downloader, request("99w99a")).await.unwrap_err();

        match err {
            CommandError::UnknownVersion(v) => assert_eq!(v, "99w99a"),
            other => panic!("expected UnknownVersion, got {:?}", other),
        }
        assert!(ctx.is_silent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_result_is_not_an_error() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12").with_version("1.12", vec![]);

        let found = resolve(&ctx, &downloader, request("1.12")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_failure_is_lookup_failure() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12").failing("database corrupt");

        let err = resolve(&ctx, &downloader, request("1.12")).await.unwrap_err();

        assert!(matches!(err, CommandError::LookupFailure(_)));
        assert!(err.to_string().contains("database corrupt"));
        assert!(ctx.is_silent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_failure_retracts_notice() {
        let ctx = MockContext::in_guild(1);
        let downloader = MockDownloader::new("1.12")
            .with_delay(Duration::from_millis(1500))
            .failing("download interrupted");

        let err = resolve(&ctx, &downloader, request("1.12")).await.unwrap_err();

        assert!(matches!(err, CommandError::LookupFailure(_)));
        assert_eq!(ctx.replies(), vec![BUILDING_NOTICE.to_string()]);
        assert_eq!(ctx.deleted(), vec![1]);
        assert!(ctx.typing_released());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_send_failure_is_reply_error() {
        let ctx = MockContext::in_guild(1).failing_sends();
        let downloader = MockDownloader::new("1.12")
            .with_version("1.12", entries(1))
            .with_delay(Duration::from_secs(1));

        let err = resolve(&ctx, &downloader, request("1.12")).await.unwrap_err();

        assert!(matches!(err, CommandError::Reply(_)));
        assert!(ctx.typing_released());
    }
}
