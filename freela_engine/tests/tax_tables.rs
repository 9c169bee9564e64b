use freela_engine::config::Settings;
use freela_engine::tax::load_tax_tables_from_dir;
use freela_engine::{PricingEngine, PricingError, PricingInput, TaxRegime, TaxTable};
use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};

fn shipped_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tax_tables")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("freela_engine_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn shipped_table_matches_builtin() {
    let tables = load_tax_tables_from_dir(&shipped_dir()).unwrap();
    assert_eq!(tables.years(), vec![2025]);
    assert_eq!(tables.get(2025).unwrap(), &TaxTable::brazil_2025());
}

#[test]
fn settings_load_from_directory() {
    let settings = Settings {
        tax_table_dir: Some(shipped_dir()),
        tax_year: Some(2025),
    };
    let engine = settings.build_engine().unwrap();
    let input = PricingInput::baseline(dec!(3000), TaxRegime::Autonomo);
    assert_eq!(engine.calculate(&input).unwrap().monthly_taxes, dec!(372.16));
}

#[test]
fn newer_year_is_picked_by_default() {
    let dir = scratch_dir("multi_year");
    let mut next = TaxTable::brazil_2025();
    next.year = 2026;
    next.mei_das = dec!(86.05);
    std::fs::write(dir.join("br_2025.json"), serde_json::to_string(&TaxTable::brazil_2025()).unwrap())
        .unwrap();
    std::fs::write(dir.join("br_2026.json"), serde_json::to_string(&next).unwrap()).unwrap();
    // non-json files are ignored
    std::fs::write(dir.join("README.txt"), "notes").unwrap();

    let tables = load_tax_tables_from_dir(&dir).unwrap();
    let engine = PricingEngine::for_year(&tables, None).unwrap();
    assert_eq!(engine.monthly_taxes(dec!(1000), TaxRegime::Mei).unwrap(), dec!(86.05));

    let older = PricingEngine::for_year(&tables, Some(2025)).unwrap();
    assert_eq!(older.monthly_taxes(dec!(1000), TaxRegime::Mei).unwrap(), dec!(81.90));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn malformed_table_is_fatal() {
    let dir = scratch_dir("malformed");
    std::fs::write(dir.join("broken.json"), "{ \"year\": 2025, \"mei_das\": ").unwrap();
    let err = load_tax_tables_from_dir(&dir).unwrap_err();
    assert!(matches!(err, PricingError::Configuration(_)));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn table_with_unsorted_brackets_is_fatal() {
    let dir = scratch_dir("unsorted");
    let mut table = TaxTable::brazil_2025();
    table.ir_brackets.swap(0, 1);
    std::fs::write(dir.join("bad.json"), serde_json::to_string(&table).unwrap()).unwrap();
    let err = load_tax_tables_from_dir(&dir).unwrap_err();
    assert!(err.to_string().contains("ascending"), "{}", err);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_directory_is_fatal() {
    let dir = scratch_dir("empty");
    assert!(matches!(
        load_tax_tables_from_dir(&dir),
        Err(PricingError::Configuration(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}
