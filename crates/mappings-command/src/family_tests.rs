#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use crate::family::CommandFamily;
    use crate::mapping::MappingType;
    use crate::mock::MockDownloader;
    use crate::store::{GuildVersions, MemFiles};

    fn family() -> Arc<CommandFamily> {
        CommandFamily::new("MCP", "MCP", 0x2ecc71, Arc::new(MockDownloader::new("1.12.2")))
    }

    #[test]
    fn test_root_children_cover_types_in_order() {
        let root = family().root();
        let kinds: Vec<_> = root.children().iter().map(|c| c.kind()).collect();
        let expected: Vec<_> = MappingType::ALL.iter().copied().map(Some).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_typed_variant_has_no_children() {
        let root = family().root();
        for child in root.children() {
            assert!(child.children().is_empty());
            assert!(!child.is_root());
        }
    }

    #[test]
    fn test_names() {
        let root = family().root();
        let names: Vec<String> = root.with_children().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["mcp", "mcpc", "mcpm", "mcpf", "mcpp"]);
    }

    #[test]
    fn test_describe() {
        let root = family().root();
        assert_eq!(root.describe(), "Looks up MCP info.");
        let method = &root.children()[1];
        assert_eq!(method.describe(), "Looks up MCP info for a given method.");
    }

    #[test]
    fn test_children_share_family() {
        let root = family().root();
        for child in root.children() {
            assert!(Arc::ptr_eq(child.family(), root.family()));
        }
    }

    #[test]
    fn test_initialize_from_child_attaches_once() {
        let files = MemFiles::new();
        let mut stored = GuildVersions::new();
        stored.insert(5, "1.12".to_string());
        files.insert("data/mcp.json", stored);

        let root = family().root();
        let children = root.children();
        assert!(root.family().storage().is_none());

        children[2].initialize(&files, Path::new("data")).unwrap();
        root.initialize(&files, Path::new("data")).unwrap();
        children[0].initialize(&files, Path::new("data")).unwrap();

        assert_eq!(files.load_count(), 1);
        let from_root = root.family().storage().unwrap();
        for child in &children {
            assert!(Arc::ptr_eq(child.family().storage().unwrap(), from_root));
        }
    }

    #[tokio::test]
    async fn test_initialize_loads_stored_defaults() {
        let files = MemFiles::new();
        let mut stored = GuildVersions::new();
        stored.insert(5, "1.12".to_string());
        files.insert("data/mcp.json", stored);

        let root = family().root();
        root.initialize(&files, Path::new("data")).unwrap();

        let storage = root.family().storage().unwrap();
        assert_eq!(storage.get(5).await.as_deref(), Some("1.12"));
    }

    #[tokio::test]
    async fn test_persist_from_child_saves_shared_storage() {
        let files = MemFiles::new();
        let root = family().root();
        let child = root.children().remove(3);
        child.initialize(&files, Path::new("data")).unwrap();

        root.family().storage().unwrap().put(9, Some("1.13".to_string())).await;
        child.persist(&files, Path::new("data")).await.unwrap();
        child.persist(&files, Path::new("data")).await.unwrap();

        let saved = files.get("data/mcp.json").unwrap();
        assert_eq!(saved.get(&9).map(String::as_str), Some("1.13"));
        assert_eq!(files.save_count(), 2);
    }

    #[tokio::test]
    async fn test_persist_without_storage_is_noop() {
        let files = MemFiles::new();
        family().root().persist(&files, Path::new("data")).await.unwrap();
        assert_eq!(files.save_count(), 0);
    }
}
