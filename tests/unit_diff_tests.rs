//! # Diff Engine Unit Tests / 差异引擎单元测试
//!
//! The in-process line diff, its reduced form and the structured engine.
//!
//! 进程内行差异、其精简形式以及结构化引擎。

use media_regress::compare::line_diff::{DiffLine, diff_lines, reduce, render_text};
use media_regress::compare::structured::{LINE_ENDINGS_ONLY, NOT_VISIBLE_AS_TEXT};
use media_regress::compare::{DiffBody, DiffEngine, DiffOutcome, StructuredDiffEngine};
use media_regress::core::error::ComparisonError;

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[cfg(test)]
mod line_diff_tests {
    use super::*;

    #[test]
    fn test_identical_inputs_are_all_same() {
        let a = lines("one\ntwo\nthree");
        let diff = diff_lines(&a, &a);
        assert_eq!(diff.len(), 3);
        assert!(diff.iter().all(|l| !l.is_change()));
    }

    #[test]
    fn test_single_changed_line() {
        let reference = lines("a\nb\nc");
        let produced = lines("a\nB\nc");
        let diff = diff_lines(&reference, &produced);
        assert_eq!(
            diff,
            vec![
                DiffLine::Same { old: 1, new: 1, text: "a".into() },
                DiffLine::Removed { old: 2, text: "b".into() },
                DiffLine::Added { new: 2, text: "B".into() },
                DiffLine::Same { old: 3, new: 3, text: "c".into() },
            ]
        );
    }

    #[test]
    fn test_insertion_keeps_line_numbers_aligned() {
        let reference = lines("a\nb\nc\nd");
        let produced = lines("a\nb\nnew\nc\nd");
        let diff = diff_lines(&reference, &produced);
        let changes: Vec<&DiffLine> = diff.iter().filter(|l| l.is_change()).collect();
        assert_eq!(changes, vec![&DiffLine::Added { new: 3, text: "new".into() }]);
        assert_eq!(
            diff.last(),
            Some(&DiffLine::Same { old: 4, new: 5, text: "d".into() })
        );
    }

    #[test]
    fn test_empty_sides() {
        let produced = lines("x\ny");
        let diff = diff_lines(&[], &produced);
        assert_eq!(diff.len(), 2);
        assert!(diff.iter().all(|l| matches!(l, DiffLine::Added { .. })));

        let diff = diff_lines(&produced, &[]);
        assert!(diff.iter().all(|l| matches!(l, DiffLine::Removed { .. })));
    }

    #[test]
    fn test_reduce_keeps_context_and_summarizes_gaps() {
        let reference: Vec<String> = (1..=20).map(|i| format!("line {i}")).collect();
        let mut produced = reference.clone();
        produced[9] = "changed".to_string();
        let reference: Vec<&str> = reference.iter().map(String::as_str).collect();
        let produced: Vec<&str> = produced.iter().map(String::as_str).collect();

        let reduced = reduce(diff_lines(&reference, &produced), 3);
        assert_eq!(reduced.first(), Some(&DiffLine::Skipped(6)));
        assert_eq!(reduced.last(), Some(&DiffLine::Skipped(7)));
        // 3 context + removed + added + 3 context, plus two markers
        assert_eq!(reduced.len(), 10);
    }

    #[test]
    fn test_reduce_without_changes_is_one_marker() {
        let a = lines("a\nb");
        assert_eq!(reduce(diff_lines(&a, &a), 3), vec![DiffLine::Skipped(2)]);
    }

    /// Large inputs are aligned line by line, not as one replaced block.
    /// 大输入逐行对齐，而不是作为一个整体替换块。
    #[test]
    fn test_large_inputs_keep_fine_alignment() {
        let reference: Vec<String> = (0..3000).map(|i| format!("row {i}")).collect();
        let mut produced = reference.clone();
        produced[1000] = "moved".to_string();
        produced.remove(2000);
        let reference: Vec<&str> = reference.iter().map(String::as_str).collect();
        let produced: Vec<&str> = produced.iter().map(String::as_str).collect();

        let diff = diff_lines(&reference, &produced);
        let changes: Vec<&DiffLine> = diff.iter().filter(|l| l.is_change()).collect();
        assert_eq!(
            changes,
            vec![
                &DiffLine::Removed { old: 1001, text: "row 1000".into() },
                &DiffLine::Added { new: 1001, text: "moved".into() },
                &DiffLine::Removed { old: 2001, text: "row 2000".into() },
            ]
        );
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&[
            DiffLine::Same { old: 1, new: 1, text: "keep".into() },
            DiffLine::Removed { old: 2, text: "old".into() },
            DiffLine::Added { new: 2, text: "new".into() },
            DiffLine::Skipped(4),
        ]);
        assert_eq!(text, "  keep\n- [2] old\n+ [2] new\n@@ 4 unchanged line(s) @@\n");
    }
}

#[cfg(test)]
mod structured_engine_tests {
    use super::*;

    #[test]
    fn test_identical_bytes() {
        let engine = StructuredDiffEngine::full();
        assert_eq!(engine.diff_bytes(b"same\n", b"same\n"), DiffOutcome::Identical);
    }

    #[test]
    fn test_line_ending_only_difference_is_not_identical() {
        let engine = StructuredDiffEngine::full();
        let outcome = engine.diff_bytes(b"a\r\nb\r\n", b"a\nb\n");
        assert_eq!(
            outcome,
            DiffOutcome::Different(DiffBody::Text(LINE_ENDINGS_ONLY.to_string()))
        );
    }

    #[test]
    fn test_full_engine_keeps_every_line() {
        let produced = "1\n2\n3\n4\n5\n6\n7\n8\n9\nX\n";
        let reference = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";
        let DiffOutcome::Different(DiffBody::Lines(full)) =
            StructuredDiffEngine::full().diff_bytes(produced.as_bytes(), reference.as_bytes())
        else {
            panic!("expected a line diff");
        };
        assert_eq!(full.len(), 11);

        let DiffOutcome::Different(DiffBody::Lines(reduced)) =
            StructuredDiffEngine::reduced().diff_bytes(produced.as_bytes(), reference.as_bytes())
        else {
            panic!("expected a line diff");
        };
        assert_eq!(reduced[0], DiffLine::Skipped(6));
        assert_eq!(reduced.iter().filter(|l| l.is_change()).count(), 2);
    }

    /// Changes at both ends of a long file reduce to two hunks around one gap.
    /// 长文件两端的变化会精简为两个块，中间是一个省略标记。
    #[test]
    fn test_reduced_engine_on_long_file_with_changes_at_both_ends() {
        let reference: Vec<String> = (1..=2100).map(|i| format!("line {i}")).collect();
        let mut produced = reference.clone();
        produced[0] = "first changed".to_string();
        produced[2099] = "last changed".to_string();
        let reference = reference.join("\n") + "\n";
        let produced = produced.join("\n") + "\n";

        let DiffOutcome::Different(DiffBody::Lines(lines)) = StructuredDiffEngine::reduced()
            .diff_bytes(produced.as_bytes(), reference.as_bytes())
        else {
            panic!("expected a line diff");
        };
        assert_eq!(lines.iter().filter(|l| l.is_change()).count(), 4);
        let skipped: Vec<&DiffLine> = lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Skipped(_)))
            .collect();
        assert_eq!(skipped, vec![&DiffLine::Skipped(2092)]);
        assert_eq!(lines.len(), 11);
    }

    /// Lines that differ only in undecodable bytes are not passed off as a
    /// line-ending difference.
    /// 仅在无法解码的字节上不同的行不会被误报为换行符差异。
    #[test]
    fn test_non_utf8_difference_is_not_called_line_endings() {
        let outcome = StructuredDiffEngine::full().diff_bytes(b"caf\xe9\n", b"caf\xe8\n");
        assert_eq!(
            outcome,
            DiffOutcome::Different(DiffBody::Text(NOT_VISIBLE_AS_TEXT.to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_produced_file_is_a_comparison_error() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.txt");
        std::fs::write(&reference, "x").unwrap();

        let err = StructuredDiffEngine::full()
            .diff(&dir.path().join("missing.txt"), &reference)
            .await
            .unwrap_err();
        assert!(matches!(err, ComparisonError::Unreadable { role: "produced", .. }));
    }
}
