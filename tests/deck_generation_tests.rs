mod common;

use common::{cab, sample_rows, temp_path, write_csv, write_template};
use predicates::prelude::*;
use std::fs::File;
use std::io::Read;
use zip::ZipArchive;

fn read_part(path: &str, part: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(part).unwrap();
    let mut out = String::new();
    entry.read_to_string(&mut out).unwrap();
    out
}

fn part_names(path: &str) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(String::from).collect()
}

#[test]
fn generates_timeline_and_detail_slides() {
    let template = write_template("gen_basic");
    let data = write_csv("gen_basic", &sample_rows());
    let out = temp_path("gen_basic_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK]"));

    // S+1 timeline on the template's first slide, then one detail slide
    // per S+1 change (CHG0001, CHG0002)
    let names = part_names(&out);
    assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));
    assert!(names.contains(&"ppt/slides/slide3.xml".to_string()));
    assert!(!names.contains(&"ppt/slides/slide4.xml".to_string()));

    let timeline = read_part(&out, "ppt/slides/slide1.xml");
    assert!(timeline.contains("Changements S+1 (15/09/2025"));
    assert!(timeline.contains("CHG0001"));
    assert!(timeline.contains("CHG0002"));
    assert!(!timeline.contains("CHG0003"));
    // Normal is blue, Urgent is orange
    assert!(timeline.contains(r#"val="0066CC""#));
    assert!(timeline.contains(r#"val="FF8C00""#));
    assert!(timeline.contains("Lundi 15/09"));
    assert!(timeline.contains("Dimanche 21/09"));
}

#[test]
fn narrow_boxes_trade_summary_for_config_item() {
    let template = write_template("gen_narrow");
    // a 2-hour change stays at minimum width, a 3-day one does not
    let data = write_csv(
        "gen_narrow",
        &[
            "CHG0010;Normal;Planifié;15/09/2025 09:00;15/09/2025 11:00;Reboot planifié;srv-mail-03;;;Alice Martin;Bob Durand;Redémarrage mensuel",
            "CHG0011;Normal;Planifié;16/09/2025 08:00;19/09/2025 18:00;Campagne de patchs;parc-windows;;;Paul Leroy;Bob Durand;Patchs de septembre",
        ],
    );
    let out = temp_path("gen_narrow_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
        ])
        .assert()
        .success();

    let timeline = read_part(&out, "ppt/slides/slide1.xml");
    // the narrow box keeps the identifier and the configuration item
    assert!(timeline.contains("srv-mail-03"));
    assert!(!timeline.contains("Reboot planifié"));
    // the wide box keeps the summary and skips the configuration item
    assert!(timeline.contains("Campagne de patchs"));
    assert!(!timeline.contains("parc-windows"));
}

#[test]
fn splus1_layout_index_adds_a_slide_instead() {
    let template = write_template("gen_layout_idx");
    let data = write_csv("gen_layout_idx", &sample_rows());
    let out = temp_path("gen_layout_idx_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
            "--splus1-layout-index", "1",
        ])
        .assert()
        .success();

    // first slide untouched, timeline on the added slide2
    let first = read_part(&out, "ppt/slides/slide1.xml");
    assert!(!first.contains("Changements S+1"));
    let timeline = read_part(&out, "ppt/slides/slide2.xml");
    assert!(timeline.contains("Changements S+1"));
    let rels = read_part(&out, "ppt/slides/_rels/slide2.xml.rels");
    assert!(rels.contains("../slideLayouts/slideLayout2.xml"));
}

#[test]
fn detail_slides_are_ordered_and_linked() {
    let template = write_template("gen_details");
    let data = write_csv("gen_details", &sample_rows());
    let out = temp_path("gen_details_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
        ])
        .assert()
        .success();

    // CHG0001 starts first, so it gets the first detail slide
    let first = read_part(&out, "ppt/slides/slide2.xml");
    assert!(first.contains("CHG0001"));
    assert!(first.contains("Migration DNS"));
    assert!(first.contains("Bascule des zones internes"));

    let rels = read_part(&out, "ppt/slides/_rels/slide2.xml.rels");
    assert!(rels.contains("https://outils.change.fr/change=chg0001"));
    assert!(rels.contains(r#"TargetMode="External""#));

    let second = read_part(&out, "ppt/slides/slide3.xml");
    assert!(second.contains("CHG0002"));
}

#[test]
fn optional_sections_add_their_slides() {
    let template = write_template("gen_optional");
    let data = write_csv("gen_optional", &sample_rows());
    let out = temp_path("gen_optional_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
            "--current-week",
            "--sminus1-pie",
        ])
        .assert()
        .success();

    // slide1 timeline + 2 details + 3 stats slides + current week last
    let names = part_names(&out);
    assert!(names.contains(&"ppt/slides/slide7.xml".to_string()));
    assert!(!names.contains(&"ppt/slides/slide8.xml".to_string()));

    let pie = read_part(&out, "ppt/slides/slide4.xml");
    assert!(pie.contains("Bilan des changements S-1 (01/09/2025"));
    assert!(pie.contains(r#"prst="pie""#));
    assert!(pie.contains("Succès : 1 (50%)"));
    assert!(pie.contains("Échec avec retour arrière : 1 (50%)"));

    let flagged = read_part(&out, "ppt/slides/slide5.xml");
    assert!(flagged.contains("CHG0005"));
    assert!(!flagged.contains("CHG0004"));
    assert!(flagged.contains("Incident en recette"));

    let current = read_part(&out, "ppt/slides/slide7.xml");
    assert!(current.contains("Changements cette semaine (08/09/2025"));
    assert!(current.contains("CHG0003"));

    let assignees = read_part(&out, "ppt/slides/slide6.xml");
    assert!(assignees.contains("Chloé Petit"));
    assert!(assignees.contains("non affecté"));
}

#[test]
fn package_bookkeeping_stays_consistent() {
    let template = write_template("gen_pkg");
    let data = write_csv("gen_pkg", &sample_rows());
    let out = temp_path("gen_pkg_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
        ])
        .assert()
        .success();

    let content_types = read_part(&out, "[Content_Types].xml");
    for n in 2..=3 {
        assert!(content_types.contains(&format!("/ppt/slides/slide{n}.xml")));
    }

    // template slide + two detail slides in the slide list
    let presentation = read_part(&out, "ppt/presentation.xml");
    assert_eq!(presentation.matches("<p:sldId ").count(), 3);

    // each added slide is wired to a layout
    let rels = read_part(&out, "ppt/slides/_rels/slide3.xml.rels");
    assert!(rels.contains("../slideLayouts/"));
}

#[test]
fn include_tags_without_tags_column_warns_and_keeps_rows() {
    let template = write_template("gen_tags");
    let data = write_csv("gen_tags", &sample_rows());
    let out = temp_path("gen_tags_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
            "--include-tags", "reseau",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("tags column not found"));

    let timeline = read_part(&out, "ppt/slides/slide1.xml");
    assert!(timeline.contains("CHG0001"));
}

#[test]
fn empty_week_still_produces_the_timeline() {
    let template = write_template("gen_empty");
    // only the S-1 closed change, nothing in S+1
    let data = write_csv("gen_empty", &sample_rows()[3..4].to_vec());
    let out = temp_path("gen_empty_out", "pptx");

    cab()
        .args([
            "--data", &data,
            "--template", &template,
            "--out", &out,
            "--ref-date", "2025-09-09",
        ])
        .assert()
        .success();

    let names = part_names(&out);
    assert!(!names.contains(&"ppt/slides/slide2.xml".to_string()));

    let timeline = read_part(&out, "ppt/slides/slide1.xml");
    assert!(timeline.contains("Changements S+1"));
    assert!(timeline.contains("Lundi 15/09"));
}
