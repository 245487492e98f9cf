//! # File System Helper Unit Tests / 文件系统辅助单元测试
//!
//! Produced-artifact naming and unique report paths.
//!
//! 产物命名与唯一报告路径。

use std::path::Path;

use media_regress::infra::fs::{MAX_PRODUCED_NAME, produced_path, sanitize_component, unique_path};
use media_regress::models::TestEntry;

#[cfg(test)]
mod produced_path_tests {
    use super::*;

    #[test]
    fn test_name_is_index_plus_sanitized_reference() {
        let entry = TestEntry::new("clips/a b.ts", "", "refs/a b.json");
        let path = produced_path(Path::new("/scratch"), 7, &entry);
        assert_eq!(path, Path::new("/scratch/0007_refs_a_b.json"));
    }

    #[test]
    fn test_same_reference_gets_distinct_names() {
        let entry = TestEntry::new("x.ts", "", "out.json");
        let first = produced_path(Path::new("/s"), 0, &entry);
        let second = produced_path(Path::new("/s"), 1, &entry);
        assert_ne!(first, second);
    }

    /// Deep reference paths are cut from the front so the extension survives.
    /// 过深的参考路径从前部截断，以保留扩展名。
    #[test]
    fn test_long_reference_path_is_truncated() {
        let deep = format!("{}/result.json", vec!["directory"; 60].join("/"));
        let entry = TestEntry::new("x.ts", "", deep);
        let path = produced_path(Path::new("/s"), 3, &entry);

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.len() <= MAX_PRODUCED_NAME + 5, "{}", name.len());
        assert!(name.starts_with("0003_"), "{name}");
        assert!(name.ends_with("_result.json"), "{name}");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("a/b\\c:d é.json"), "a_b_c_d__.json");
        assert_eq!(sanitize_component("ok-name_1.txt"), "ok-name_1.txt");
    }
}

#[cfg(test)]
mod unique_path_tests {
    use super::*;

    #[test]
    fn test_existing_names_get_a_numeric_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_path(dir.path(), "report_x.txt");
        assert_eq!(first, dir.path().join("report_x.txt"));

        std::fs::write(&first, "").unwrap();
        let second = unique_path(dir.path(), "report_x.txt");
        assert_eq!(second, dir.path().join("report_x_1.txt"));

        std::fs::write(&second, "").unwrap();
        assert_eq!(
            unique_path(dir.path(), "report_x.txt"),
            dir.path().join("report_x_2.txt")
        );
    }
}
