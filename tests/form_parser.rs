use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use formlens::batch::{FileSummary, collect_form_files, parse_many, parse_many_with};
use formlens::parser::{ContentSource, FormParser};
use std::collections::HashMap;
use std::fs;

struct MemSource {
    files: HashMap<String, String>,
}

impl ContentSource for MemSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        self.files
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("not found: {}", path))
    }
}

const SIMPLE: &str = r#"<form>
  <action name="a"><classes><class><param name="groovy">A</param></class></classes></action>
  <grid name="g"><events><postQuery actionRef="a"/></events></grid>
</form>"#;

#[test]
fn parse_form_file_from_memory() {
    let mut files = HashMap::new();
    files.insert("mem://forms/simple.xml".to_string(), SIMPLE.to_string());
    let mut parser = FormParser::new(MemSource { files });

    let doc = parser
        .parse_form_file("mem://forms/simple.xml")
        .expect("parse form");
    assert_eq!(doc.grids.len(), 1);
    assert_eq!(doc.grids[0].events[0].actions.resolved_actions.len(), 1);
}

#[test]
fn missing_file_and_bad_xml_report_context() {
    let mut files = HashMap::new();
    files.insert("mem://bad.xml".to_string(), "<form><grid></form>".to_string());
    let mut parser = FormParser::new(MemSource { files });

    let err = parser.parse_form_file("mem://nope.xml").expect_err("missing");
    assert!(err.to_string().contains("not found"));

    let err = parser.parse_form_file("mem://bad.xml").expect_err("malformed");
    let msg = format!("{:#}", err);
    assert!(msg.contains("Failed to parse XML mem://bad.xml"), "{msg}");
    assert!(msg.contains("malformed form XML"), "{msg}");
}

#[test]
fn batch_collects_and_parses_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("b.xml"), SIMPLE).unwrap();
    fs::write(root.join("sub/a.XML"), "<form/>").unwrap();
    fs::write(root.join("sub/broken.xml"), "<form>").unwrap();
    fs::write(root.join("notes.txt"), "<form/>").unwrap();

    let files = collect_form_files(&root, "xml").unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.strip_prefix(&root).unwrap().as_str().to_string())
        .collect();
    assert_eq!(names, vec!["b.xml", "sub/a.XML", "sub/broken.xml"]);

    let results = parse_many(&files);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, files[0]);
    assert_eq!(results[0].1.as_ref().unwrap().grids.len(), 1);
    assert!(results[1].1.is_ok());
    assert!(results[2].1.is_err());

    let summaries: Vec<_> = results
        .iter()
        .map(|(p, r)| FileSummary::new(p, r))
        .collect();
    assert!(summaries[0].ok);
    assert_eq!(summaries[0].grids, 1);
    assert!(!summaries[2].ok);
    assert!(summaries[2].error.as_deref().unwrap().contains("broken.xml"));
}

#[test]
fn batch_with_memory_sources_preserves_order() {
    let paths: Vec<Utf8PathBuf> = (0..16)
        .map(|i| Utf8PathBuf::from(format!("mem://f{i}.xml")))
        .collect();
    let files: HashMap<String, String> = paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let xml = format!("<form>{}</form>", "<grid/>".repeat(i));
            (p.as_str().to_string(), xml)
        })
        .collect();

    let results = parse_many_with(&paths, || MemSource {
        files: files.clone(),
    });
    for (i, (path, res)) in results.iter().enumerate() {
        assert_eq!(path, &paths[i]);
        assert_eq!(res.as_ref().unwrap().grids.len(), i);
    }
}
