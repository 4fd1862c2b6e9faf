//! End-to-end generation against temporary output directories.

use std::fs;
use std::path::{Path, PathBuf};

use dimgen_codegen::{generate, ArtifactKind, EmitError, GenerationReport, TemplateError, TemplateSet};
use dimgen_spec::{aggregate, loader, AllDimensions};

const FUNDAMENTALS: &str = include_str!("../../metadata/FundamentalUnits.json");
const DERIVEDS: &str = include_str!("../../metadata/DerivedUnits.json");

fn load(documents: &[(&str, &str)]) -> AllDimensions {
    let mut records = Vec::new();
    for (name, text) in documents {
        records.extend(loader::read_records(name, text).unwrap());
    }
    let report = loader::parse_records(records);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    aggregate(report.dimensions)
}

fn sample() -> AllDimensions {
    load(&[("FundamentalUnits.json", FUNDAMENTALS), ("DerivedUnits.json", DERIVEDS)])
}

fn run(all: &AllDimensions, out: &Path) -> GenerationReport {
    let templates = TemplateSet::builtin().unwrap();
    generate(all, &templates, out)
}

fn read(out: &Path, rel: &str) -> String {
    fs::read_to_string(out.join(rel)).unwrap()
}

fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let bytes = fs::read(&path).unwrap();
                files.push((path.strip_prefix(root).unwrap().to_path_buf(), bytes));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn sample_specification_generates_every_artifact() {
    let all = sample();
    let out = tempfile::tempdir().unwrap();
    let report = run(&all, out.path());

    assert!(report.all_succeeded(), "{:?}", report.failures().collect::<Vec<_>>());
    let expected = 2 * all.fundamentals().len() + 2 * all.deriveds().len() + 1;
    assert_eq!(report.success_count(), expected);

    let length = read(out.path(), "Dimension/Dimension_Impl/FundamentalDimensions/length_dimension_Impl.h");
    assert!(length.starts_with("#ifndef STATIC_DIMENSION_LENGTH_IMPL_H"));
    assert!(length.contains("struct LengthType {};"));
    assert!(!length.contains("LengthExtras.h"));

    let angle = read(out.path(), "Dimension/Dimension_Impl/FundamentalDimensions/angle_dimension_Impl.h");
    assert!(angle.contains("#include \"AngleExtras.h\""));

    let length_units = read(out.path(), "Dimension/dimensions/fundamental/length_dimension.h");
    assert!(length_units.contains(
        "#include \"../../Dimension_Impl/FundamentalDimensions/length_dimension_Impl.h\""
    ));
    assert!(length_units.contains("struct feet : public LengthUnit<feet, \"feet\", \"ft\"> {};"));
    assert!(length_units.contains(
        "template<> struct Conversion<feet, meters> { static constexpr PrecisionType slope = 0.3048; };"
    ));
    assert!(length_units.contains(
        "template<> struct Conversion<meters, feet> { static constexpr PrecisionType slope = (1250.0 / 381.0); };"
    ));
    assert!(length_units.contains("ALL_SI_PREFIXES(meters, \"m\", LengthUnit);"));
    assert!(!length_units.contains("ALL_SI_PREFIXES(feet"));
}

#[test]
fn derived_headers_carry_numbered_parameters() {
    let all = sample();
    let out = tempfile::tempdir().unwrap();
    run(&all, out.path());

    let accel = read(out.path(), "Dimension/Dimension_Impl/DerivedDimensions/acceleration_dimension_Impl.h");
    assert!(accel.contains("template<typename Length1, typename Time1, typename Time2>"));
    assert!(accel.contains("std::is_same_v<typename Time2::Dim, TimeType>"));
    assert!(accel.contains("#include \"../../dimensions/fundamental/length_dimension.h\""));
    assert!(accel.contains("UnitExponent<PrimaryTime, -2, 1>"));

    let force = read(out.path(), "Dimension/Dimension_Impl/DerivedDimensions/force_dimension_Impl.h");
    assert!(force.contains("#include \"../../dimensions/derived/acceleration_dimension.h\""));
    assert!(force.contains("UnitExponent<PrimaryMass, 1, 1>"));
    assert!(force.contains("UnitExponent<PrimaryLength, 1, 1>"));

    let energy = read(out.path(), "Dimension/Dimension_Impl/DerivedDimensions/energy_dimension_Impl.h");
    assert!(energy.contains("UnitExponent<PrimaryLength, 2, 1>"));

    let detectivity = read(
        out.path(),
        "Dimension/Dimension_Impl/DerivedDimensions/specific_detectivity_dimension_Impl.h",
    );
    assert!(detectivity.contains("template<typename Length1, typename Time1, typename Mass1>"));
    assert!(detectivity.contains("UnitExponent<PrimaryTime, 1, 2>"));

    let speed_units = read(out.path(), "Dimension/dimensions/derived/speed_dimension.h");
    assert!(speed_units.contains("struct nautical_miles : public LengthUnit<nautical_miles"));
    assert!(speed_units.contains("struct knots"));
    assert!(speed_units.contains("UnitExponent<hours, -1, 1>"));
    assert!(speed_units.contains(
        "template<> struct Conversion<nautical_miles, meters> { static constexpr PrecisionType slope = 1852.0; };"
    ));
}

#[test]
fn umbrella_includes_every_unit_header_in_order() {
    let all = sample();
    let out = tempfile::tempdir().unwrap();
    run(&all, out.path());

    let umbrella = read(out.path(), "Dimension/dimensions/dimensions.h");
    let includes: Vec<&str> = umbrella
        .lines()
        .filter_map(|l| l.strip_prefix("#include \""))
        .map(|l| l.trim_end_matches('"'))
        .collect();
    assert_eq!(includes.len(), all.len());
    assert_eq!(includes[0], "fundamental/length_dimension.h");
    assert_eq!(includes[4], "derived/speed_dimension.h");
    assert!(includes.contains(&"derived/angular_speed_dimension.h"));
}

#[test]
fn rerunning_is_byte_identical() {
    let all = sample();
    let out = tempfile::tempdir().unwrap();
    run(&all, out.path());
    let first = snapshot(out.path());
    run(&all, out.path());
    let second = snapshot(out.path());
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn unresolved_reference_fails_only_that_dimension() {
    let broken = r#"[
        { "Dimension": "Current", "Definition": [
            { "Dimension": "Charge", "Exponent": 1 },
            { "Dimension": "Time", "Exponent": -1 } ] }
    ]"#;
    let all = load(&[
        ("FundamentalUnits.json", FUNDAMENTALS),
        ("DerivedUnits.json", DERIVEDS),
        ("Broken.json", broken),
    ]);
    let out = tempfile::tempdir().unwrap();
    let report = run(&all, out.path());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].dimension.as_deref(), Some("Current"));
    assert!(matches!(
        &failures[0].error,
        Some(EmitError::UnresolvedReference { reference, .. }) if reference == "Charge"
    ));
    assert!(!out
        .path()
        .join("Dimension/dimensions/derived/current_dimension.h")
        .exists());
    assert!(report.wrote("Speed", ArtifactKind::DerivedDimension));

    let umbrella = read(out.path(), "Dimension/dimensions/dimensions.h");
    assert!(!umbrella.contains("current_dimension.h"));
    assert!(umbrella.contains("speed_dimension.h"));
}

#[test]
fn write_failure_is_isolated_per_file() {
    let all = sample();
    let out = tempfile::tempdir().unwrap();
    let blocked = out.path().join("Dimension/dimensions/derived");
    fs::create_dir_all(blocked.parent().unwrap()).unwrap();
    fs::write(&blocked, "not a directory").unwrap();

    let report = run(&all, out.path());

    assert_eq!(report.failure_count(), all.deriveds().len());
    for failure in report.failures() {
        assert_eq!(failure.artifact, ArtifactKind::DerivedUnit);
        assert!(matches!(failure.error, Some(EmitError::Write { .. })));
    }
    assert!(report.wrote("Speed", ArtifactKind::DerivedDimension));
    assert!(report.wrote("Length", ArtifactKind::FundamentalUnit));

    let umbrella = read(out.path(), "Dimension/dimensions/dimensions.h");
    assert!(umbrella.contains("fundamental/length_dimension.h"));
    assert!(!umbrella.contains("derived/"));
}

#[test]
fn missing_template_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateSet::from_dir(&dir.path().join("templates")).unwrap_err();
    assert!(matches!(err, TemplateError::Missing { .. }));
}

#[test]
fn custom_templates_are_used_when_given() {
    let dir = tempfile::tempdir().unwrap();
    for kind in ArtifactKind::ALL {
        fs::write(dir.path().join(kind.template_file()), "// {{guard}}\n").unwrap();
    }
    let templates = TemplateSet::from_dir(dir.path()).unwrap();
    let all = sample();
    let out = tempfile::tempdir().unwrap();
    let report = generate(&all, &templates, out.path());
    assert!(report.all_succeeded());
    assert_eq!(
        read(out.path(), "Dimension/dimensions/dimensions.h"),
        "// STATIC_DIMENSION_DIMENSIONS_H\n"
    );
}

#[test]
fn empty_specification_still_writes_umbrella() {
    let all = aggregate(Vec::new());
    let out = tempfile::tempdir().unwrap();
    let report = run(&all, out.path());
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.all_succeeded());
    assert!(out.path().join("Dimension/dimensions/dimensions.h").is_file());
}

#[test]
fn exponent_overflow_fails_only_that_dimension() {
    let nested = r#"[
        { "Dimension": "Root", "Definition": [ { "Dimension": "Length", "Exponent": [1, 65536] } ] },
        { "Dimension": "RootOfRoot", "Definition": [ { "Dimension": "Root", "Exponent": [1, 65536] } ] },
        { "Dimension": "Huge", "Definition": [ { "Dimension": "Length", "Exponent": 2000000000 } ] },
        { "Dimension": "RootSquared", "Definition": [ { "Dimension": "Root", "Exponent": 2 } ] }
    ]"#;
    let all = load(&[
        ("FundamentalUnits.json", FUNDAMENTALS),
        ("DerivedUnits.json", DERIVEDS),
        ("Nested.json", nested),
    ]);
    let out = tempfile::tempdir().unwrap();
    let report = run(&all, out.path());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 2, "{failures:?}");
    assert_eq!(failures[0].dimension.as_deref(), Some("RootOfRoot"));
    assert!(matches!(
        &failures[0].error,
        Some(EmitError::ExponentOverflow { reference, .. }) if reference == "RootOfRoot"
    ));
    assert_eq!(failures[1].dimension.as_deref(), Some("Huge"));
    assert!(matches!(
        &failures[1].error,
        Some(EmitError::ExponentTooLarge { reference, .. }) if reference == "Length"
    ));

    assert!(report.wrote("Root", ArtifactKind::DerivedUnit));
    assert!(report.wrote("RootSquared", ArtifactKind::DerivedUnit));
    assert!(report.wrote("Speed", ArtifactKind::DerivedUnit));
    let squared = read(out.path(), "Dimension/Dimension_Impl/DerivedDimensions/root_squared_dimension_Impl.h");
    assert!(squared.contains("UnitExponent<PrimaryLength, 1, 32768>"));

    let umbrella = read(out.path(), "Dimension/dimensions/dimensions.h");
    assert!(!umbrella.contains("root_of_root_dimension.h"));
    assert!(!umbrella.contains("huge_dimension.h"));
}

#[test]
fn render_failure_is_local_to_its_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let builtin = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"));
    for kind in ArtifactKind::ALL {
        fs::copy(builtin.join(kind.template_file()), dir.path().join(kind.template_file())).unwrap();
    }
    // Strict mode fails for deriveds that declare no named units.
    fs::write(dir.path().join("DerivedUnit.hbs"), "// {{units.[0].name}}\n").unwrap();
    let templates = TemplateSet::from_dir(dir.path()).unwrap();

    let all = sample();
    let out = tempfile::tempdir().unwrap();
    let report = generate(&all, &templates, out.path());

    let unnamed: Vec<&str> = all
        .deriveds()
        .iter()
        .filter(|(_, d)| d.units.is_empty())
        .map(|(name, _)| name.as_str())
        .collect();
    assert!(!unnamed.is_empty());
    assert!(!unnamed.contains(&"Speed"));

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), unnamed.len());
    for failure in &failures {
        assert_eq!(failure.artifact, ArtifactKind::DerivedUnit);
        assert!(matches!(
            failure.error,
            Some(EmitError::Render { template, .. }) if template == "DerivedUnit.hbs"
        ));
        assert!(unnamed.contains(&failure.dimension.as_deref().unwrap()));
    }
    assert_eq!(
        report.success_count(),
        2 * all.fundamentals().len() + 2 * all.deriveds().len() + 1 - unnamed.len()
    );
    for name in all.deriveds().keys() {
        assert!(report.wrote(name, ArtifactKind::DerivedDimension));
    }
    assert_eq!(read(out.path(), "Dimension/dimensions/derived/speed_dimension.h"), "// knots\n");

    let umbrella = read(out.path(), "Dimension/dimensions/dimensions.h");
    let includes = umbrella.lines().filter(|l| l.starts_with("#include")).count();
    assert_eq!(includes, all.fundamentals().len() + 1);
    assert!(umbrella.contains("derived/speed_dimension.h"));
}

#[test]
fn colliding_file_names_keep_the_first_dimension() {
    let clash = r#"[
        { "Dimension": "MassFlowRate", "Definition": [
            { "Dimension": "Mass", "Exponent": 1 }, { "Dimension": "Time", "Exponent": -1 } ] },
        { "Dimension": "mass_flow_rate", "Definition": [
            { "Dimension": "Length", "Exponent": 3 }, { "Dimension": "Time", "Exponent": -1 } ] }
    ]"#;
    let all = load(&[("FundamentalUnits.json", FUNDAMENTALS), ("Clash.json", clash)]);
    let out = tempfile::tempdir().unwrap();
    let report = run(&all, out.path());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].dimension.as_deref(), Some("mass_flow_rate"));
    assert!(matches!(
        &failures[0].error,
        Some(EmitError::PathCollision { existing, .. }) if existing == "MassFlowRate"
    ));
    assert!(report.wrote("MassFlowRate", ArtifactKind::DerivedUnit));

    let header = read(out.path(), "Dimension/Dimension_Impl/DerivedDimensions/mass_flow_rate_dimension_Impl.h");
    assert!(header.contains("UnitExponent<PrimaryMass, 1, 1>"));
    assert!(!header.contains("PrimaryLength"));

    let umbrella = read(out.path(), "Dimension/dimensions/dimensions.h");
    assert_eq!(umbrella.matches("derived/mass_flow_rate_dimension.h").count(), 1);
}
