//! PO -> MO -> runtime lookups, plus checks on the shipped catalogs

use std::fs;
use std::path::Path;

use pdf_converter::catalog::{self, mo, Extractor, PoFile};
use pdf_converter::i18n::{self, Locales};
use tempfile::TempDir;

const VI_PO: &str = r#"# Vietnamese
msgid ""
msgstr ""
"Language: vi\n"
"Content-Type: text/plain; charset=UTF-8\n"

#: main.rs:10
msgid "Convert"
msgstr "Chuyển đổi"

msgid "Saved to {path}"
msgstr "Đã lưu vào {path}"

#, fuzzy
msgid "Processing..."
msgstr "Đang xử lý..."

msgid "Conversion complete"
msgstr ""

msgctxt "menu"
msgid "File"
msgstr "Tệp"

msgid "Long "
"message"
msgstr "Thông "
"điệp dài"
"#;

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_compiled_catalog_drives_lookups() {
    let temp_dir = TempDir::new().unwrap();
    let locales_dir = temp_dir.path().join("locales");
    let po_path = catalog::catalog_path(&locales_dir, "vi", "po");
    fs::create_dir_all(po_path.parent().unwrap()).unwrap();
    fs::write(&po_path, VI_PO).unwrap();

    let mo_path = catalog::catalog_path(&locales_dir, "vi", "mo");
    let count = catalog::compile_po_file(&po_path, &mo_path).unwrap();
    // header, Convert, Saved to, File (menu), Long message
    assert_eq!(count, 5);

    let locales = Locales::new(&locales_dir);
    assert_eq!(locales.available(), vec!["en", "vi"]);

    let vi = locales.try_load("vi").unwrap();
    assert_eq!(vi.language(), Some("vi"));
    assert_eq!(vi.gettext("Convert"), "Chuyển đổi");
    assert_eq!(vi.gettext("Long message"), "Thông điệp dài");
    assert_eq!(vi.pgettext("menu", "File"), "Tệp");
    assert_eq!(vi.gettext("File"), "File");
    // fuzzy and untranslated entries fall back to the msgid
    assert_eq!(vi.gettext("Processing..."), "Processing...");
    assert_eq!(vi.gettext("Conversion complete"), "Conversion complete");

    i18n::init(&locales, "vi");
    assert_eq!(pdf_converter::tr("Convert"), "Chuyển đổi");
    assert_eq!(
        i18n::current().gettext("Saved to {path}"),
        "Đã lưu vào {path}"
    );
    assert_eq!(
        i18n::format_named(i18n::current().gettext("Saved to {path}"), &[("path", &"out.txt")]),
        "Đã lưu vào out.txt"
    );

    i18n::init(&locales, "en");
    assert_eq!(pdf_converter::tr("Convert"), "Convert");
}

#[test]
fn test_build_regenerates_template() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    let locales_dir = temp_dir.path().join("locales");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::create_dir_all(locales_dir.join("vi/LC_MESSAGES")).unwrap();

    fs::write(
        src.join("main.rs"),
        "fn main() {\n    println!(\"{}\", tr(\"Convert\"));\n}\n",
    )
    .unwrap();
    fs::write(
        src.join("nested/jobs.rs"),
        "let s = tr_fmt(\n    \"Saved to {path}\",\n    &[(\"path\", &p)],\n);\n",
    )
    .unwrap();
    fs::write(catalog::catalog_path(&locales_dir, "vi", "po"), VI_PO).unwrap();

    let report = catalog::build_locales(&locales_dir, &src).unwrap();
    assert_eq!(report.extracted, 2);
    assert_eq!(report.compiled, vec![("vi".to_string(), 5)]);

    let template = fs::read_to_string(&report.template).unwrap();
    assert!(template.contains("#: main.rs:2\nmsgid \"Convert\""));
    assert!(template.contains("msgid \"Saved to {path}\""));

    let template = PoFile::parse(&template).unwrap();
    assert!(template.header().is_some());
    assert_eq!(template.entries.len(), 3);
}

#[test]
fn test_shipped_catalog_translates_every_message() {
    let root = manifest_dir();
    let messages = Extractor::new().extract_dir(&root.join("src")).unwrap();
    assert!(!messages.is_empty());

    let po_path = catalog::catalog_path(&root.join("locales"), "vi", "po");
    let po = PoFile::parse(&fs::read_to_string(&po_path).unwrap()).unwrap();
    let translated = po.messages();

    let missing: Vec<&str> = messages
        .iter()
        .map(|m| m.msgid.as_str())
        .filter(|msgid| !translated.contains_key(*msgid))
        .collect();
    assert!(missing.is_empty(), "untranslated messages: {:?}", missing);
}

#[test]
fn test_shipped_mo_matches_po() {
    let root = manifest_dir().join("locales");
    let po = PoFile::parse(
        &fs::read_to_string(catalog::catalog_path(&root, "vi", "po")).unwrap(),
    )
    .unwrap();
    let compiled = mo::decode(&fs::read(catalog::catalog_path(&root, "vi", "mo")).unwrap()).unwrap();

    assert_eq!(compiled, po.messages());
}
