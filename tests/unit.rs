use codecondense::chunker::{self, LoadedFile};
use codecondense::ignore_file::{self, IgnoreRule, Polarity};
use codecondense::output::OutputNaming;
use codecondense::reader::{self, Encoding, ReadOutcome};
use codecondense::tree::{self, TreeNode};
use codecondense::{
    BinaryDetection, CondenseError, ExclusionConfig, ExclusionConfigBuilder, ExclusionReason,
    IncludedFile, PatternMatcher, normalize_extension,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn matcher(config: &ExclusionConfig) -> PatternMatcher {
    PatternMatcher::new(config, ignore_file::IgnoreRules::new()).unwrap()
}

fn loaded(name: &str, text: &str) -> LoadedFile {
    LoadedFile {
        file: IncludedFile {
            relative_path: name.to_string(),
            path: PathBuf::from(name),
            size: text.len() as u64,
        },
        text: text.to_string(),
    }
}

#[test]
fn test_dir_name_matches_any_segment() {
    let config = ExclusionConfigBuilder::empty().exclude_dir("node_modules").build();
    let m = matcher(&config);
    assert!(m.matches("node_modules", true));
    assert!(m.matches("web/node_modules", true));
    assert!(m.matches("web/node_modules/pkg/index.js", false));
    assert!(!m.matches("web/Node_Modules", true));
    // a file that merely shares the name is not a directory segment
    assert!(!m.matches("node_modules", false));
}

#[test]
fn test_file_name_exact_and_glob() {
    let config = ExclusionConfigBuilder::empty()
        .exclude_file("yarn.lock")
        .exclude_file("*.pyc")
        .exclude_file("test_?.py")
        .build();
    let m = matcher(&config);
    assert!(m.matches("yarn.lock", false));
    assert!(m.matches("pkg/yarn.lock", false));
    assert!(m.matches("deep/mod.pyc", false));
    assert!(m.matches("test_a.py", false));
    assert!(!m.matches("test_ab.py", false));
    assert!(!m.matches("main.py", false));
    assert_eq!(m.explain("x.pyc", false), Some(ExclusionReason::FileName));
}

#[test]
fn test_extension_case_insensitive() {
    let config = ExclusionConfigBuilder::empty()
        .exclude_extensions([".PNG", "log"])
        .build();
    let m = matcher(&config);
    assert!(m.matches("img/logo.png", false));
    assert!(m.matches("img/LOGO.Png", false));
    assert!(m.matches("run.LOG", false));
    assert!(m.matches("archive.tar.log", false));
    assert!(!m.matches("png", false));
    assert!(!m.matches("notes.png.txt", false));
    assert_eq!(m.explain("a.png", false), Some(ExclusionReason::Extension));
}

#[test]
fn test_files_without_extension_never_match_extension_rules() {
    let config = ExclusionConfigBuilder::empty()
        .exclude_extensions(["bashrc", "makefile"])
        .build();
    let m = matcher(&config);
    assert!(!m.matches(".bashrc", false));
    assert!(!m.matches("Makefile", false));
    assert!(!m.matches("trailing.", false));
}

#[test]
fn test_custom_patterns_match_relative_path() {
    let config = ExclusionConfigBuilder::empty()
        .ignore_pattern("docs/generated/*")
        .ignore_pattern("*.snap")
        .build();
    let m = matcher(&config);
    assert!(m.matches("docs/generated/api.md", false));
    assert!(m.matches("tests/snapshots/a.snap", false));
    assert!(!m.matches("docs/guide.md", false));
    assert_eq!(
        m.explain("x/y.snap", false),
        Some(ExclusionReason::CustomPattern)
    );
}

#[test]
fn test_custom_pattern_with_trailing_slash_is_directory_only() {
    let config = ExclusionConfigBuilder::empty().ignore_pattern("gen/").build();
    let m = matcher(&config);
    assert_eq!(m.explain("gen", true), Some(ExclusionReason::CustomPattern));
    assert_eq!(
        m.explain("gen/x.rs", false),
        Some(ExclusionReason::CustomPattern)
    );
    assert!(m.matches("gen/deep/y.rs", false));
    assert!(!m.matches("gen", false));
    assert!(!m.matches("src/generated.rs", false));
}

#[test]
fn test_slash_only_custom_pattern_is_rejected() {
    let config = ExclusionConfigBuilder::empty().ignore_pattern("/").build();
    let err = PatternMatcher::new(&config, ignore_file::IgnoreRules::new()).unwrap_err();
    assert!(matches!(err, CondenseError::Pattern { .. }));
}

#[test]
fn test_invalid_custom_pattern_is_config_error() {
    let config = ExclusionConfigBuilder::empty().ignore_pattern("src/[abc").build();
    let err = PatternMatcher::new(&config, ignore_file::IgnoreRules::new()).unwrap_err();
    assert!(matches!(err, CondenseError::Pattern { .. }));
}

#[test]
fn test_ignore_negation_cannot_override_simple_rule() {
    let config = ExclusionConfigBuilder::empty().exclude_extension("log").build();
    let rules = ignore_file::parse("!keep.log\n", "").unwrap();
    let m = PatternMatcher::new(&config, rules).unwrap();
    assert!(m.matches("keep.log", false));
}

#[test]
fn test_ignore_parse_skips_comments_and_blanks() {
    let rules = ignore_file::parse("# comment\n\n   \n*.tmp\n\\#literal\n", "").unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.rules()[0].pattern, "*.tmp");
    assert_eq!(rules.rules()[1].pattern, "#literal");
}

#[test]
fn test_ignore_rule_markers() {
    let rule = IgnoreRule::parse("!/build/", "").unwrap().unwrap();
    assert_eq!(rule.polarity, Polarity::Include);
    assert!(rule.dir_only);
    assert!(rule.anchored);
    assert_eq!(rule.pattern, "build");

    let rule = IgnoreRule::parse("*.o", "").unwrap().unwrap();
    assert_eq!(rule.polarity, Polarity::Exclude);
    assert!(!rule.dir_only);
    assert!(!rule.anchored);

    assert!(IgnoreRule::parse("!", "").unwrap().is_none());
    assert!(IgnoreRule::parse("/", "").unwrap().is_none());
}

#[test]
fn test_ignore_last_match_wins() {
    let rules = ignore_file::parse("*.log\n!keep.log\n", "").unwrap();
    assert!(rules.is_excluded("debug.log", false));
    assert!(rules.is_excluded("logs/debug.log", false));
    assert!(!rules.is_excluded("keep.log", false));
    assert!(!rules.is_excluded("logs/keep.log", false));
    assert_eq!(rules.decide("main.rs", false), None);

    let rules = ignore_file::parse("!keep.log\n*.log\n", "").unwrap();
    assert!(rules.is_excluded("keep.log", false));
}

#[test]
fn test_ignore_dir_only_rule() {
    let rules = ignore_file::parse("cache/\n", "").unwrap();
    assert!(rules.is_excluded("cache", true));
    assert!(rules.is_excluded("src/cache", true));
    assert!(rules.is_excluded("cache/data.json", false));
    assert!(!rules.is_excluded("cache", false));
}

#[test]
fn test_ignore_anchored_rule() {
    let rules = ignore_file::parse("/build\ndocs/*.pdf\n", "").unwrap();
    assert!(rules.is_excluded("build", true));
    assert!(rules.is_excluded("build/out.txt", false));
    assert!(!rules.is_excluded("src/build", true));
    assert!(rules.is_excluded("docs/manual.pdf", false));
    assert!(!rules.is_excluded("manual.pdf", false));
}

#[test]
fn test_ignore_rules_relative_to_base() {
    let rules = ignore_file::parse("/gen\n*.tmp\n", "pkg").unwrap();
    assert!(rules.is_excluded("pkg/gen", true));
    assert!(rules.is_excluded("pkg/a/b.tmp", false));
    assert!(!rules.is_excluded("gen", true));
    assert!(!rules.is_excluded("other/b.tmp", false));
}

#[test]
fn test_ignore_load_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let (rules, warnings) = ignore_file::load(&dir.path().join(".gitignore"), "");
    assert!(rules.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn test_ignore_load_skips_bad_lines_with_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".gitignore");
    fs::write(&path, "*.tmp\n[broken\ntarget/\n").unwrap();
    let (rules, warnings) = ignore_file::load(&path, "");
    assert_eq!(rules.len(), 2);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].reason.contains("line 2"));
}

#[test]
fn test_decode_utf8_and_latin1_fallback() {
    let decoded = reader::decode("héllo\n".as_bytes().to_vec());
    assert_eq!(decoded.encoding, Encoding::Utf8);
    assert_eq!(decoded.text, "héllo\n");

    let decoded = reader::decode(vec![b'f', 0xff, b'\n']);
    assert_eq!(decoded.encoding, Encoding::Latin1);
    assert_eq!(decoded.text, "fÿ\n");
}

#[test]
fn test_read_file_reports_fallback_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.txt");
    fs::write(&path, [b'c', b'a', b'f', 0xe9]).unwrap();
    match reader::read_file(&path, BinaryDetection::None).unwrap() {
        ReadOutcome::Text { text, warning } => {
            assert_eq!(text, "café");
            assert!(warning.is_some());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_read_file_missing_is_io_error() {
    let dir = tempdir().unwrap();
    let err = reader::read_file(&dir.path().join("nope.txt"), BinaryDetection::None).unwrap_err();
    assert!(matches!(err, CondenseError::Io { .. }));
}

#[test]
fn test_read_file_binary_detection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blob.dat");
    fs::write(&path, [0u8, 1, 2, 3]).unwrap();
    assert_eq!(
        reader::read_file(&path, BinaryDetection::Simple).unwrap(),
        ReadOutcome::Binary
    );
    assert!(matches!(
        reader::read_file(&path, BinaryDetection::None).unwrap(),
        ReadOutcome::Text { .. }
    ));
}

#[test]
fn test_section_format_and_line_count() {
    let section = chunker::render_section("src/a.rs", "fn a() {}\n");
    assert_eq!(
        section,
        ">>>File: src/a.rs\n\nfn a() {}\n\n\n========================================\n"
    );
    assert_eq!(chunker::section_lines("fn a() {}\n"), 6);
    assert_eq!(section.lines().count(), 6);
    assert_eq!(chunker::section_lines(""), 5);
}

#[test]
fn test_plan_splits_at_file_boundaries() {
    // 35 newlines + 5 lines of framing = 40 rendered lines each
    let body = "x\n".repeat(35);
    let files = vec![
        loaded("one.txt", &body),
        loaded("two.txt", &body),
        loaded("three.txt", &body),
    ];
    assert_eq!(files[0].rendered_lines(), 40);
    let plan = chunker::plan(&files, Some(100), None);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.chunks[0].files, vec![0, 1]);
    assert_eq!(plan.chunks[0].lines, 80);
    assert_eq!(plan.chunks[1].files, vec![2]);
}

#[test]
fn test_plan_oversized_file_gets_own_chunk() {
    let small = "x\n".repeat(5);
    let huge = "y\n".repeat(500);
    let files = vec![
        loaded("a.txt", &small),
        loaded("big.txt", &huge),
        loaded("c.txt", &small),
    ];
    let plan = chunker::plan(&files, Some(100), None);
    let groups: Vec<Vec<usize>> = plan.chunks.iter().map(|c| c.files.clone()).collect();
    assert_eq!(groups, vec![vec![0], vec![1], vec![2]]);
    assert!(plan.chunks[1].lines > 100);
}

#[test]
fn test_plan_without_budget_is_single_chunk() {
    let body = "x\n".repeat(1000);
    let files = vec![loaded("a.txt", &body), loaded("b.txt", &body)];
    assert_eq!(chunker::plan(&files, None, None).len(), 1);
    assert_eq!(chunker::plan(&files, Some(0), None).len(), 1);
    assert!(chunker::plan(&[], None, None).is_empty());
}

#[test]
fn test_plan_counts_structure_in_first_chunk() {
    let structure = "Directory Structure:\n====================\n📄 a\n📄 b\n\n";
    let body = "x\n".repeat(35);
    let files = vec![loaded("a", &body), loaded("b", &body)];
    let plan = chunker::plan(&files, Some(80), Some(structure));
    assert_eq!(plan.len(), 2);
    assert!(plan.chunks[0].has_structure);
    assert_eq!(plan.chunks[0].lines, 45);
    assert!(!plan.chunks[1].has_structure);

    let docs = chunker::render(&plan, &files, Some(structure));
    assert!(docs[0].starts_with(structure));
    assert!(docs[1].starts_with(">>>File: b\n"));
    for (doc, chunk) in docs.iter().zip(&plan.chunks) {
        assert_eq!(doc.lines().count(), chunk.lines);
    }
}

#[test]
fn test_render_structure_format() {
    let root = PathBuf::from("/p");
    let mut sub = TreeNode::dir("sub", "sub", root.join("sub"));
    sub.children
        .push(TreeNode::file("b.py", "sub/b.py", root.join("sub/b.py"), false));
    let mut top = TreeNode::dir("p", "", root.clone());
    top.children
        .push(TreeNode::file("a.py", "a.py", root.join("a.py"), false));
    top.children
        .push(TreeNode::file("a.pyc", "a.pyc", root.join("a.pyc"), true));
    top.children.push(sub);

    assert_eq!(
        tree::render_structure(&top),
        "Directory Structure:\n====================\n📄 a.py\n📁 sub\n  📄 b.py\n\n"
    );
    assert_eq!(top.file_count(), 2);
}

#[test]
fn test_output_naming() {
    let naming = OutputNaming::new(Path::new("out/context.md"));
    assert_eq!(naming.single(), PathBuf::from("out/context.md"));
    assert_eq!(naming.structure(), PathBuf::from("out/context-structure.md"));
    assert_eq!(
        naming.paths(2, false),
        vec![
            PathBuf::from("out/context_part1.md"),
            PathBuf::from("out/context_part2.md")
        ]
    );
    assert!(naming.paths(0, false).is_empty());

    let bare = OutputNaming::new(Path::new("condensed"));
    assert_eq!(bare.single(), PathBuf::from("condensed.txt"));
}

#[test]
fn test_output_naming_recognizes_artifacts() {
    let naming = OutputNaming::new(Path::new("/work/out.txt"));
    assert!(naming.is_artifact(Path::new("/work/out.txt")));
    assert!(naming.is_artifact(Path::new("/work/out_part12.txt")));
    assert!(naming.is_artifact(Path::new("/work/out-structure.txt")));
    assert!(!naming.is_artifact(Path::new("/work/out_partx.txt")));
    assert!(!naming.is_artifact(Path::new("/work/outline.txt")));
    assert!(!naming.is_artifact(Path::new("/work/sub/out.txt")));
    assert!(!naming.is_artifact(Path::new("/work/out.md")));
}

#[test]
fn test_normalize_extension() {
    assert_eq!(normalize_extension(".PNG"), Some("png".to_string()));
    assert_eq!(normalize_extension(" rs "), Some("rs".to_string()));
    assert_eq!(normalize_extension("."), None);
    assert_eq!(normalize_extension(""), None);
}

#[test]
fn test_config_from_json_fills_defaults() {
    let config = ExclusionConfig::from_json(r#"{"extensions": [".MD"], "use_ignore_file": false}"#)
        .unwrap();
    assert!(config.extensions.contains("md"));
    assert!(!config.use_ignore_file);
    assert!(config.dirs.contains(".git"));
    assert!(ExclusionConfig::from_json("{not json").is_err());
}
