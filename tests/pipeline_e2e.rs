use std::fs;
use std::path::Path;

use company_unify::ToolError;
use company_unify::config::PipelineConfig;
use company_unify::consolidate::Priority;
use company_unify::distribution::CsvDistributionRenderer;
use company_unify::io::read_table;
use company_unify::model::{COMMON_SCHEMA, Table};
use company_unify::pipeline::{run_tables, run_with};
use tempfile::tempdir;

const FACEBOOK: &str = "\
name,domain,categories,phone,country_name,region_name,city
Acme Inc,acme.com,Tools,+1 (555) 123-4567,United States,California,San Jose
Broken,row.com,x,1,2,3,4,5,6
Beta LLC,beta.io,Software,,Canada,,
";

const GOOGLE: &str = "\
name,domain,category,phone,country_name,region_name,city
ACME,acme.com,Hardware,,United States,,
Beta,beta.io,IT Services,+1 416 555 0100,Canada,Ontario,Toronto
";

const WEBSITE: &str = "\
site_name;root_domain;s_category;phone;main_country;main_region;main_city
Acme;acme.com;Retail;;USA;CA;
Solo Bakery;solo.io;Bakery;+49 151 12345;Germany;Bavaria;Munich
";

fn write_inputs(dir: &Path, facebook: &str, google: &str, website: &str) {
    fs::write(dir.join("facebook_dataset.csv"), facebook).expect("facebook written");
    fs::write(dir.join("google_dataset.csv"), google).expect("google written");
    fs::write(dir.join("website_dataset.csv"), website).expect("website written");
}

fn row_for(table: &Table, domain: &str) -> Vec<usize> {
    (0..table.len())
        .filter(|&row| table.value(row, "domain_name") == Some(domain))
        .collect()
}

#[test]
fn full_run_writes_unified_dataset_and_reports() {
    let dir = tempdir().expect("temporary directory");
    write_inputs(dir.path(), FACEBOOK, GOOGLE, WEBSITE);
    let config = PipelineConfig::default().with_base_dir(dir.path());
    let mut preview: Vec<u8> = Vec::new();

    let summary =
        run_with(&config, &mut preview, &CsvDistributionRenderer).expect("pipeline succeeds");

    assert_eq!(summary.merged_rows, 3);
    assert_eq!(summary.sources[0].rows_read, 2);
    assert_eq!(summary.sources[0].rows_skipped, 1);
    assert!(summary.distributions.is_empty());

    let preview = String::from_utf8(preview).expect("preview is UTF-8");
    assert!(preview.contains("Facebook dataset"));
    assert!(preview.contains("Google dataset"));
    assert!(preview.contains("Website dataset"));

    for name in ["facebook", "google", "website"] {
        for report in ["description", "missing_values", "empty_values"] {
            let path = dir.path().join(format!("{name}_{report}.csv"));
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    let (unified, _) = read_table(&dir.path().join("merged_companies_dataset.csv"), b',')
        .expect("unified dataset read");
    assert_eq!(unified.columns, COMMON_SCHEMA.to_vec());

    let acme = row_for(&unified, "acme.com");
    assert_eq!(acme.len(), 1);
    assert_eq!(unified.value(acme[0], "phone_number"), Some("15551234567"));
    assert_eq!(unified.value(acme[0], "category"), Some("Tools"));
    assert_eq!(unified.value(acme[0], "company_name"), Some("acme inc"));
    assert_eq!(unified.value(acme[0], "city"), Some("San Jose"));

    let beta = row_for(&unified, "beta.io");
    assert_eq!(unified.value(beta[0], "phone_number"), Some("14165550100"));
    assert_eq!(unified.value(beta[0], "region"), Some("Ontario"));
    assert_eq!(unified.value(beta[0], "category"), Some("Software"));

    let solo = row_for(&unified, "solo.io");
    assert_eq!(solo.len(), 1);
    assert_eq!(unified.value(solo[0], "company_name"), Some("solo bakery"));
    assert_eq!(unified.value(solo[0], "phone_number"), Some("4915112345"));
    assert_eq!(unified.value(solo[0], "city"), Some("Munich"));
}

#[test]
fn google_report_counts_cleaned_empty_values() {
    let dir = tempdir().expect("temporary directory");
    write_inputs(dir.path(), FACEBOOK, GOOGLE, WEBSITE);
    let config = PipelineConfig::default().with_base_dir(dir.path());

    run_with(&config, &mut std::io::sink(), &CsvDistributionRenderer)
        .expect("pipeline succeeds");

    let empty = fs::read_to_string(dir.path().join("google_empty_values.csv"))
        .expect("empty report read");
    let lines: Vec<&str> = empty.lines().collect();
    assert!(lines.contains(&"phone_number,1"));
    assert!(lines.contains(&"region,1"));
    assert!(lines.contains(&"city,1"));

    let missing = fs::read_to_string(dir.path().join("google_missing_values.csv"))
        .expect("missing report read");
    assert!(missing.lines().skip(1).all(|line| line.ends_with(",0")));
}

#[test]
fn distributions_are_written_when_enabled() {
    let dir = tempdir().expect("temporary directory");
    write_inputs(dir.path(), FACEBOOK, GOOGLE, WEBSITE);
    let mut config = PipelineConfig::default().with_base_dir(dir.path());
    config.render_distributions = true;

    let summary = run_with(&config, &mut std::io::sink(), &CsvDistributionRenderer)
        .expect("pipeline succeeds");

    assert_eq!(
        summary.distributions,
        vec![
            dir.path().join("category_distribution.csv"),
            dir.path().join("phone_number_distribution.csv"),
        ]
    );
    let category = fs::read_to_string(dir.path().join("category_distribution.csv"))
        .expect("distribution read");
    assert_eq!(category.lines().next(), Some("category,count"));
}

#[test]
fn missing_phone_column_halts_before_any_output() {
    let dir = tempdir().expect("temporary directory");
    let website = "site_name;root_domain\nAcme;acme.com\n";
    write_inputs(dir.path(), FACEBOOK, GOOGLE, website);
    let config = PipelineConfig::default().with_base_dir(dir.path());

    let error = run_with(&config, &mut std::io::sink(), &CsvDistributionRenderer)
        .expect_err("website lacks phone numbers");

    assert!(matches!(
        error,
        ToolError::MissingColumn { ref column, .. } if column == "phone_number"
    ));
    assert!(!dir.path().join("merged_companies_dataset.csv").exists());
}

#[test]
fn reports_survive_a_failing_merge() {
    let dir = tempdir().expect("temporary directory");
    let website = "site_name;phone\nAcme;+1 555 0100\n";
    write_inputs(dir.path(), FACEBOOK, GOOGLE, website);
    let config = PipelineConfig::default().with_base_dir(dir.path());

    let error = run_with(&config, &mut std::io::sink(), &CsvDistributionRenderer)
        .expect_err("website lacks domains");

    assert_eq!(
        error.to_string(),
        "column 'domain_name' not found while merging sources"
    );
    for name in ["facebook", "google", "website"] {
        for report in ["description", "missing_values", "empty_values"] {
            let path = dir.path().join(format!("{name}_{report}.csv"));
            assert!(path.exists(), "{} missing", path.display());
        }
    }
    assert!(!dir.path().join("merged_companies_dataset.csv").exists());
}

#[test]
fn missing_input_file_is_reported() {
    let dir = tempdir().expect("temporary directory");
    let config = PipelineConfig::default().with_base_dir(dir.path());

    let error = run_with(&config, &mut std::io::sink(), &CsvDistributionRenderer)
        .expect_err("no inputs present");

    assert!(matches!(
        error,
        ToolError::MissingInput(path) if path.ends_with("facebook_dataset.csv")
    ));
}

#[test]
fn single_shared_domain_keeps_the_only_phone_number() {
    let mut facebook = Table::new(["name", "domain", "phone"]);
    facebook.push_row(vec![
        Some("Shop".to_string()),
        Some("shop.com".to_string()),
        Some("+1 (555) 123-4567".to_string()),
    ]);
    let mut google = Table::new(["name", "domain", "phone"]);
    google.push_row(vec![Some("Shop".to_string()), Some("shop.com".to_string()), None]);
    let mut website = Table::new(["site_name", "root_domain", "phone"]);
    website.push_row(vec![Some("Shop".to_string()), Some("shop.com".to_string()), None]);

    let unified =
        run_tables(facebook, google, website, &Priority::default()).expect("pipeline succeeds");

    assert_eq!(unified.len(), 1);
    assert_eq!(unified.value(0, "phone_number"), Some("15551234567"));
}
