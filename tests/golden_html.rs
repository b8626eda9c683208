use std::fs;
use std::path::PathBuf;

use paperexport::{create_html_export, theme, DefaultStyles, ExportConfig};
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

#[test]
fn golden_html_export_matches_fixture() {
    let page = fs::read_to_string("tests/goldens/pages/paper1.html").expect("read fixture");
    let nord = theme::find_theme("nord").unwrap();
    let html = create_html_export(&page, "jetbrains-mono", &nord, true, &DefaultStyles, &ExportConfig::default());

    // Content-addressed golden: only the digest is stored
    let digest = hex::encode(Sha256::digest(html.as_bytes()));

    let expected_path = golden_path("paper1.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, &digest).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path)
        .expect("missing golden; run with UPDATE_GOLDENS=1 to create it");
    assert_eq!(digest, exp.trim(), "HTML export template changed");
}
