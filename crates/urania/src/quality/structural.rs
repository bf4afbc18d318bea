use crate::chart::NatalChart;
use crate::houses::cusps_are_sequential;
use crate::provenance::CoordinateSource;
use crate::quality::report::{codes, QualityReport};
use serde_json::Value;

pub fn validate_longitudes<'a>(items: impl IntoIterator<Item = (&'a str, f64)>, report: &mut QualityReport) {
    for (name, value) in items {
        if !(0.0..360.0).contains(&value) {
            report.add_error_with(codes::LONGITUDE_RANGE, format!("{name}: {value}"));
        }
    }
}

pub fn validate_speeds<'a>(items: impl IntoIterator<Item = (&'a str, f64)>, report: &mut QualityReport) {
    for (name, value) in items {
        if !value.is_finite() {
            report.add_error_with(codes::NON_FINITE_SPEED, name.to_string());
        }
    }
}

/// Cusps must be absent without a birth time, and twelve sequential cusps
/// with one.
pub fn validate_houses(cusps: Option<&[f64]>, birth_time_present: bool, report: &mut QualityReport) {
    if !birth_time_present {
        if cusps.is_some() {
            report.add_error(codes::HOUSES_SHOULD_BE_NONE);
        } else {
            report.add_warning(codes::HOUSES_NOT_COMPUTED_NO_BIRTHTIME);
        }
        return;
    }
    let Some(cusps) = cusps else {
        report.add_error(codes::HOUSES_MISSING);
        return;
    };
    if cusps.len() != 12 {
        report.add_error_with(codes::HOUSES_COUNT_INVALID, format!("{} cusps", cusps.len()));
    } else if !cusps_are_sequential(cusps) {
        report.add_error(codes::HOUSE_ORDERING);
    }
}

pub fn validate_house_assignment<'a>(
    items: impl IntoIterator<Item = (&'a str, bool)>,
    birth_time_present: bool,
    report: &mut QualityReport,
) {
    if birth_time_present {
        return;
    }
    for (name, has_house) in items {
        if has_house {
            report.add_error_with(codes::HOUSE_ASSIGNED_WITHOUT_BIRTHTIME, name.to_string());
        }
    }
}

/// Coordinates in range; geocoded coordinates name their provider.
pub fn validate_geodata(
    lat: Option<f64>,
    lon: Option<f64>,
    source: Option<CoordinateSource>,
    geocoder_provider: Option<&str>,
    report: &mut QualityReport,
) {
    let lat_ok = lat.map_or(false, |v| (-90.0..=90.0).contains(&v));
    let lon_ok = lon.map_or(false, |v| (-180.0..=180.0).contains(&v));
    if !lat_ok || !lon_ok {
        report.add_error(codes::COORD_RANGE);
    }
    if source == Some(CoordinateSource::Geocoder)
        && geocoder_provider.map_or(true, |p| p.trim().is_empty())
    {
        report.add_error(codes::GEOCODER_METADATA_MISSING);
    }
}

/// Structural checks on a computed chart.
pub fn validate_chart(chart: &NatalChart, birth_time_present: bool) -> QualityReport {
    let mut report = QualityReport::new();
    let named = |f: fn(&crate::positions::BodyPosition) -> f64| {
        chart
            .positions
            .iter()
            .map(move |p| (p.body.as_str(), f(p)))
    };
    validate_longitudes(named(|p| p.longitude), &mut report);
    validate_speeds(named(|p| p.speed), &mut report);
    for p in &chart.positions {
        if p.retrograde != (p.speed < 0.0) {
            report.add_error_with(codes::RETROGRADE_MISMATCH, p.body.as_str().to_string());
        }
    }

    let cusps = chart.houses.as_ref().map(|h| h.longitudes());
    validate_houses(cusps.as_deref(), birth_time_present, &mut report);
    if chart.houses.as_ref().map_or(false, |h| h.fallback) {
        report.add_warning(codes::HOUSES_WHOLE_SIGN_FALLBACK);
    }
    validate_house_assignment(
        chart
            .positions
            .iter()
            .map(|p| (p.body.as_str(), p.house.is_some())),
        birth_time_present,
        &mut report,
    );

    match &chart.provenance.location {
        Some(location) => validate_geodata(
            Some(location.coords.lat),
            Some(location.coords.lon),
            Some(location.coords_source),
            location.geocoder.as_ref().map(|g| g.provider.as_str()),
            &mut report,
        ),
        None => report.add_error(codes::COORD_RANGE),
    }
    report
}

/// Structural checks on computed facts in their JSON form.
///
/// Reads `positions`, `houses` (null, a cusp list, or an object with
/// `cusps` and `fallback`) and `provenance.location`. JSON has no NaN, so a
/// null speed counts as non-finite.
pub fn validate(computed: &Value, birth_time_present: bool) -> QualityReport {
    let mut report = QualityReport::new();

    let positions = computed
        .get("positions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let name_of = |p: &Value| -> String {
        p.get("body")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string()
    };
    let names: Vec<String> = positions.iter().map(name_of).collect();

    validate_longitudes(
        positions.iter().zip(&names).map(|(p, name)| {
            (
                name.as_str(),
                p.get("longitude").and_then(Value::as_f64).unwrap_or(f64::NAN),
            )
        }),
        &mut report,
    );
    validate_speeds(
        positions
            .iter()
            .zip(&names)
            .filter(|(p, _)| p.get("speed").is_some())
            .map(|(p, name)| {
                (
                    name.as_str(),
                    p.get("speed").and_then(Value::as_f64).unwrap_or(f64::NAN),
                )
            }),
        &mut report,
    );
    for (p, name) in positions.iter().zip(&names) {
        if let (Some(retro), Some(speed)) = (
            p.get("retrograde").and_then(Value::as_bool),
            p.get("speed").and_then(Value::as_f64),
        ) {
            if retro != (speed < 0.0) {
                report.add_error_with(codes::RETROGRADE_MISMATCH, name.clone());
            }
        }
    }

    let houses = computed.get("houses").filter(|h| !h.is_null());
    let cusp_list = houses.and_then(|h| match h {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("cusps").and_then(Value::as_array),
        _ => None,
    });
    let cusps: Option<Vec<f64>> = match (houses, cusp_list) {
        (None, _) => None,
        (Some(_), Some(items)) => Some(items.iter().map(cusp_longitude).collect()),
        (Some(_), None) => Some(Vec::new()),
    };
    validate_houses(cusps.as_deref(), birth_time_present, &mut report);
    if houses
        .and_then(|h| h.get("fallback"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        report.add_warning(codes::HOUSES_WHOLE_SIGN_FALLBACK);
    }
    validate_house_assignment(
        positions
            .iter()
            .zip(&names)
            .map(|(p, name)| (name.as_str(), p.get("house").map_or(false, |h| !h.is_null()))),
        birth_time_present,
        &mut report,
    );

    if let Some(location) = computed.pointer("/provenance/location").filter(|l| !l.is_null()) {
        let source = location
            .get("coords_source")
            .and_then(|s| serde_json::from_value::<CoordinateSource>(s.clone()).ok());
        validate_geodata(
            location.pointer("/coords/lat").and_then(Value::as_f64),
            location.pointer("/coords/lon").and_then(Value::as_f64),
            source,
            location.pointer("/geocoder/provider").and_then(Value::as_str),
            &mut report,
        );
    }

    report
}

fn cusp_longitude(cusp: &Value) -> f64 {
    cusp.as_f64()
        .or_else(|| cusp.get("longitude").and_then(Value::as_f64))
        .unwrap_or(f64::NAN)
}
